//! Control-family packets.
//!
//! Control packets manage the transport conversation itself: session nonces,
//! clock sync, nested aggregates, teardown. On the wire they are marked by a
//! leading 0x00 opcode byte, followed by the control opcode proper.

use bytes::Bytes;

use crate::bits::{BitReader, BitWriter, Endian};
use crate::codec::{self, Decode, Encode};
use crate::error::{CodecError, Result};

/// Control-family opcodes, read after the 0x00 family marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ControlOpcode {
    ClientStart = 0x01,
    ServerStart = 0x02,
    MultiPacket = 0x03,
    ControlSync = 0x07,
    ControlSyncResp = 0x08,
    ConnectionClose = 0x0D,
    TeardownConnection = 0x0E,
}

impl ControlOpcode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::ClientStart),
            0x02 => Some(Self::ServerStart),
            0x03 => Some(Self::MultiPacket),
            0x07 => Some(Self::ControlSync),
            0x08 => Some(Self::ControlSyncResp),
            0x0D => Some(Self::ConnectionClose),
            0x0E => Some(Self::TeardownConnection),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Opens a fresh connection. The leading u32 is always 2 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientStart {
    pub client_nonce: u32,
}

impl Decode for ClientStart {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        codec::read_constant(reader, 32, Endian::Little, 2)?;
        Ok(Self {
            client_nonce: u32::decode(reader)?,
        })
    }
}

impl Encode for ClientStart {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        codec::write_constant(writer, 32, Endian::Little, 2)?;
        self.client_nonce.encode(writer)
    }
}

/// Server's answer to [`ClientStart`], echoing the client nonce. The tail
/// u32 has only ever been observed as 0x1D3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerStart {
    pub client_nonce: u32,
    pub server_nonce: u32,
}

impl ServerStart {
    const TAIL: u32 = 0x1D3;
}

impl Decode for ServerStart {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        let client_nonce = u32::decode(reader)?;
        let server_nonce = u32::decode(reader)?;
        codec::read_constant(reader, 32, Endian::Little, Self::TAIL)?;
        Ok(Self {
            client_nonce,
            server_nonce,
        })
    }
}

impl Encode for ServerStart {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        self.client_nonce.encode(writer)?;
        self.server_nonce.encode(writer)?;
        codec::write_constant(writer, 32, Endian::Little, Self::TAIL)
    }
}

/// Several packets aggregated into one frame, each prefixed with its byte
/// length. Sub-buffers are opaque here; the session layer feeds them back
/// through `decode_packet`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiPacket {
    pub packets: Vec<Bytes>,
}

impl Decode for MultiPacket {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        let mut packets = Vec::new();
        while reader.remaining() >= 8 {
            let len = reader.read_uint(8, Endian::Little)? as usize;
            packets.push(Bytes::from(reader.read_bytes(len)?));
        }
        Ok(Self { packets })
    }
}

impl Encode for MultiPacket {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        for packet in &self.packets {
            if packet.len() > 0xFF {
                return Err(CodecError::ValueOutOfRange {
                    offset: writer.bit_len(),
                    value: packet.len() as u32,
                    width: 8,
                });
            }
            writer.write_uint(packet.len() as u32, 8, Endian::Little)?;
            writer.write_bytes(packet);
        }
        Ok(())
    }
}

/// Client clock report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Decode, Encode)]
pub struct ControlSync {
    pub time_diff: u16,
    pub unk: u32,
    pub field1: u32,
    pub field2: u32,
    pub field3: u32,
    pub field4: u32,
}

/// Server's answer to [`ControlSync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Decode, Encode)]
pub struct ControlSyncResp {
    pub time_diff: u16,
    pub server_tick: u32,
    pub field1: u32,
    pub field2: u32,
    pub field3: u32,
    pub field4: u32,
}

/// Immediate connection shutdown; no body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Decode, Encode)]
pub struct ConnectionClose {}

/// Orderly teardown of the session named by `nonce`. The trailing u16 is a
/// reserved constant 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownConnection {
    pub nonce: u32,
}

impl Decode for TeardownConnection {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        let nonce = u32::decode(reader)?;
        codec::read_constant(reader, 16, Endian::Little, 6)?;
        Ok(Self { nonce })
    }
}

impl Encode for TeardownConnection {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        self.nonce.encode(writer)?;
        codec::write_constant(writer, 16, Endian::Little, 6)
    }
}

/// A decoded control-family packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlPacket {
    ClientStart(ClientStart),
    ServerStart(ServerStart),
    MultiPacket(MultiPacket),
    ControlSync(ControlSync),
    ControlSyncResp(ControlSyncResp),
    ConnectionClose(ConnectionClose),
    TeardownConnection(TeardownConnection),
}

impl ControlPacket {
    /// Opcode identifying this packet within the control family.
    pub fn opcode(&self) -> ControlOpcode {
        match self {
            Self::ClientStart(_) => ControlOpcode::ClientStart,
            Self::ServerStart(_) => ControlOpcode::ServerStart,
            Self::MultiPacket(_) => ControlOpcode::MultiPacket,
            Self::ControlSync(_) => ControlOpcode::ControlSync,
            Self::ControlSyncResp(_) => ControlOpcode::ControlSyncResp,
            Self::ConnectionClose(_) => ControlOpcode::ConnectionClose,
            Self::TeardownConnection(_) => ControlOpcode::TeardownConnection,
        }
    }
}

impl Encode for ControlPacket {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        // Family marker, then the control opcode.
        writer.write_uint(super::CONTROL_MARKER as u32, 8, Endian::Little)?;
        writer.write_uint(self.opcode().as_u8() as u32, 8, Endian::Little)?;
        match self {
            Self::ClientStart(msg) => msg.encode(writer),
            Self::ServerStart(msg) => msg.encode(writer),
            Self::MultiPacket(msg) => msg.encode(writer),
            Self::ControlSync(msg) => msg.encode(writer),
            Self::ControlSyncResp(msg) => msg.encode(writer),
            Self::ConnectionClose(msg) => msg.encode(writer),
            Self::TeardownConnection(msg) => msg.encode(writer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: Decode + Encode + PartialEq + std::fmt::Debug>(value: &T) {
        let mut writer = BitWriter::new();
        value.encode(&mut writer).unwrap();
        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(&T::decode(&mut reader).unwrap(), value);
    }

    #[test]
    fn test_client_start_golden_bytes() {
        let msg = ClientStart {
            client_nonce: 0xCAFE_F00D,
        };
        let mut writer = BitWriter::new();
        msg.encode(&mut writer).unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(
            &bytes[..],
            &[0x02, 0x00, 0x00, 0x00, 0x0D, 0xF0, 0xFE, 0xCA]
        );
        roundtrip(&msg);
    }

    #[test]
    fn test_client_start_constant_is_checked() {
        let data = [0x03, 0x00, 0x00, 0x00, 0x0D, 0xF0, 0xFE, 0xCA];
        let mut reader = BitReader::new(&data);
        let err = ClientStart::decode(&mut reader).unwrap_err();
        assert_eq!(
            err,
            CodecError::ConstantMismatch {
                offset: 0,
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_server_start_roundtrip() {
        roundtrip(&ServerStart {
            client_nonce: 1,
            server_nonce: 0xDEAD_BEEF,
        });
    }

    #[test]
    fn test_teardown_roundtrip_and_constant() {
        roundtrip(&TeardownConnection { nonce: 0x12345 });

        let mut writer = BitWriter::new();
        TeardownConnection { nonce: 0x12345 }
            .encode(&mut writer)
            .unwrap();
        let mut bad = writer.into_bytes().to_vec();
        bad[4] = 7;
        let mut reader = BitReader::new(&bad);
        let err = TeardownConnection::decode(&mut reader).unwrap_err();
        assert_eq!(
            err,
            CodecError::ConstantMismatch {
                offset: 32,
                expected: 6,
                actual: 7
            }
        );
    }

    #[test]
    fn test_multi_packet_roundtrip() {
        roundtrip(&MultiPacket {
            packets: vec![
                Bytes::from_static(&[0x42, 0x1A, 0x00, 0x00]),
                Bytes::from_static(&[0x42, 0x1A, 0x01, 0x00]),
            ],
        });
        roundtrip(&MultiPacket::default());
    }

    #[test]
    fn test_multi_packet_rejects_oversized_entries() {
        let msg = MultiPacket {
            packets: vec![Bytes::from(vec![0u8; 256])],
        };
        let mut writer = BitWriter::new();
        let err = msg.encode(&mut writer).unwrap_err();
        assert!(matches!(err, CodecError::ValueOutOfRange { width: 8, .. }));
    }

    #[test]
    fn test_sync_messages_roundtrip() {
        roundtrip(&ControlSync {
            time_diff: 100,
            unk: 1,
            field1: 2,
            field2: 3,
            field3: 4,
            field4: 5,
        });
        roundtrip(&ControlSyncResp {
            time_diff: 100,
            server_tick: 0xFFFF_FFFF,
            field1: 2,
            field2: 3,
            field3: 4,
            field4: 5,
        });
        roundtrip(&ConnectionClose {});
    }

    #[test]
    fn test_control_packet_writes_family_marker() {
        let packet = ControlPacket::ConnectionClose(ConnectionClose {});
        let mut writer = BitWriter::new();
        packet.encode(&mut writer).unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(&bytes[..], &[0x00, 0x0D]);
    }
}
