//! Crypto-family packets.
//!
//! The key-exchange conversation that precedes every session. Only the wire
//! shapes live here; the actual key agreement belongs to the encryption
//! layer upstream. The interior length words are constants because the
//! client always ships 16-byte Diffie-Hellman parameters.

use crate::bits::{BitReader, BitWriter, Endian};
use crate::codec::{self, Decode, Encode};
use crate::error::Result;

/// Crypto-family opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CryptoOpcode {
    ClientChallengeXchg = 0x01,
    ServerChallengeXchg = 0x02,
    ClientFinished = 0x03,
    ServerFinished = 0x04,
}

impl CryptoOpcode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::ClientChallengeXchg),
            0x02 => Some(Self::ServerChallengeXchg),
            0x03 => Some(Self::ClientFinished),
            0x04 => Some(Self::ServerFinished),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Client's opening challenge with its Diffie-Hellman modulus and base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientChallengeXchg {
    pub time: u32,
    pub challenge: [u8; 12],
    pub p: [u8; 16],
    pub g: [u8; 16],
}

impl Decode for ClientChallengeXchg {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        codec::read_constant(reader, 8, Endian::Little, 2)?;
        codec::read_constant(reader, 8, Endian::Little, 1)?;
        let time = u32::decode(reader)?;
        let challenge = <[u8; 12]>::decode(reader)?;
        codec::read_constant(reader, 16, Endian::Little, 1)?;
        codec::read_constant(reader, 16, Endian::Little, 16)?;
        let p = <[u8; 16]>::decode(reader)?;
        codec::read_constant(reader, 16, Endian::Little, 16)?;
        let g = <[u8; 16]>::decode(reader)?;
        Ok(Self {
            time,
            challenge,
            p,
            g,
        })
    }
}

impl Encode for ClientChallengeXchg {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        codec::write_constant(writer, 8, Endian::Little, 2)?;
        codec::write_constant(writer, 8, Endian::Little, 1)?;
        self.time.encode(writer)?;
        self.challenge.encode(writer)?;
        codec::write_constant(writer, 16, Endian::Little, 1)?;
        codec::write_constant(writer, 16, Endian::Little, 16)?;
        self.p.encode(writer)?;
        codec::write_constant(writer, 16, Endian::Little, 16)?;
        self.g.encode(writer)
    }
}

/// Server's counter-challenge carrying its public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerChallengeXchg {
    pub time: u32,
    pub challenge: [u8; 12],
    pub pub_key: [u8; 16],
}

impl Decode for ServerChallengeXchg {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        codec::read_constant(reader, 8, Endian::Little, 2)?;
        codec::read_constant(reader, 8, Endian::Little, 6)?;
        let time = u32::decode(reader)?;
        let challenge = <[u8; 12]>::decode(reader)?;
        codec::read_constant(reader, 8, Endian::Little, 1)?;
        codec::read_constant(reader, 16, Endian::Little, 16)?;
        let pub_key = <[u8; 16]>::decode(reader)?;
        Ok(Self {
            time,
            challenge,
            pub_key,
        })
    }
}

impl Encode for ServerChallengeXchg {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        codec::write_constant(writer, 8, Endian::Little, 2)?;
        codec::write_constant(writer, 8, Endian::Little, 6)?;
        self.time.encode(writer)?;
        self.challenge.encode(writer)?;
        codec::write_constant(writer, 8, Endian::Little, 1)?;
        codec::write_constant(writer, 16, Endian::Little, 16)?;
        self.pub_key.encode(writer)
    }
}

/// Client's half of the challenge proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientFinished {
    pub pub_key: [u8; 16],
    pub challenge_result: [u8; 12],
}

impl Decode for ClientFinished {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        codec::read_constant(reader, 16, Endian::Little, 16)?;
        let pub_key = <[u8; 16]>::decode(reader)?;
        codec::read_constant(reader, 16, Endian::Little, 0x0114)?;
        let challenge_result = <[u8; 12]>::decode(reader)?;
        Ok(Self {
            pub_key,
            challenge_result,
        })
    }
}

impl Encode for ClientFinished {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        codec::write_constant(writer, 16, Endian::Little, 16)?;
        self.pub_key.encode(writer)?;
        codec::write_constant(writer, 16, Endian::Little, 0x0114)?;
        self.challenge_result.encode(writer)
    }
}

/// Server's half of the challenge proof; completes the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerFinished {
    pub challenge_result: [u8; 12],
}

impl Decode for ServerFinished {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        codec::read_constant(reader, 16, Endian::Little, 0x0114)?;
        Ok(Self {
            challenge_result: <[u8; 12]>::decode(reader)?,
        })
    }
}

impl Encode for ServerFinished {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        codec::write_constant(writer, 16, Endian::Little, 0x0114)?;
        self.challenge_result.encode(writer)
    }
}

/// A decoded crypto-family packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoPacket {
    ClientChallengeXchg(ClientChallengeXchg),
    ServerChallengeXchg(ServerChallengeXchg),
    ClientFinished(ClientFinished),
    ServerFinished(ServerFinished),
}

impl CryptoPacket {
    /// Opcode identifying this packet within the crypto family.
    pub fn opcode(&self) -> CryptoOpcode {
        match self {
            Self::ClientChallengeXchg(_) => CryptoOpcode::ClientChallengeXchg,
            Self::ServerChallengeXchg(_) => CryptoOpcode::ServerChallengeXchg,
            Self::ClientFinished(_) => CryptoOpcode::ClientFinished,
            Self::ServerFinished(_) => CryptoOpcode::ServerFinished,
        }
    }
}

impl Encode for CryptoPacket {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        writer.write_uint(self.opcode().as_u8() as u32, 8, Endian::Little)?;
        match self {
            Self::ClientChallengeXchg(msg) => msg.encode(writer),
            Self::ServerChallengeXchg(msg) => msg.encode(writer),
            Self::ClientFinished(msg) => msg.encode(writer),
            Self::ServerFinished(msg) => msg.encode(writer),
        }
    }
}
