//! Packet families and top-level framing.
//!
//! Every frame opens with the 8-bit flags preamble. A `Crypto` packet type
//! routes the rest of the frame to the crypto family, whose opcode occupies
//! the next byte. Any other packet type splits on the opcode byte without
//! consuming it: 0x00 selects the control family, everything else the game
//! family; the chosen family's dispatcher then reads the stream from the
//! opcode on.

pub mod control;
pub mod crypto;
pub mod game;

use std::fmt;

use bytes::Bytes;

use crate::bits::{BitReader, BitWriter, Endian};
use crate::codec::{Decode, Encode};
use crate::error::{CodecError, Result};
use crate::header::{PacketFlags, PacketType};
use crate::registry::PacketRegistry;

pub use control::ControlPacket;
pub use crypto::CryptoPacket;
pub use game::GamePacket;

/// One of the three disjoint opcode namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketFamily {
    Game,
    Control,
    Crypto,
}

impl fmt::Display for PacketFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketFamily::Game => write!(f, "game"),
            PacketFamily::Control => write!(f, "control"),
            PacketFamily::Crypto => write!(f, "crypto"),
        }
    }
}

/// Opcode byte that routes a non-crypto frame to the control family.
pub(crate) const CONTROL_MARKER: u8 = 0x00;

/// A fully decoded frame: flags preamble plus family-tagged body.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub flags: PacketFlags,
    pub body: PacketBody,
}

/// The three-branch sum of everything a frame can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum PacketBody {
    Game(GamePacket),
    Control(ControlPacket),
    Crypto(CryptoPacket),
}

impl Packet {
    /// Normal-path unsecured frame around a game packet.
    pub fn game(packet: GamePacket) -> Self {
        Self {
            flags: PacketFlags {
                packet_type: PacketType::Normal,
                secured: false,
            },
            body: PacketBody::Game(packet),
        }
    }

    /// Normal-path unsecured frame around a control packet.
    pub fn control(packet: ControlPacket) -> Self {
        Self {
            flags: PacketFlags {
                packet_type: PacketType::Normal,
                secured: false,
            },
            body: PacketBody::Control(packet),
        }
    }

    /// Crypto-path unsecured frame around a crypto packet.
    pub fn crypto(packet: CryptoPacket) -> Self {
        Self {
            flags: PacketFlags {
                packet_type: PacketType::Crypto,
                secured: false,
            },
            body: PacketBody::Crypto(packet),
        }
    }

    /// Family of the carried body.
    pub fn family(&self) -> PacketFamily {
        match self.body {
            PacketBody::Game(_) => PacketFamily::Game,
            PacketBody::Control(_) => PacketFamily::Control,
            PacketBody::Crypto(_) => PacketFamily::Crypto,
        }
    }
}

/// Decodes one framed packet from `bytes`.
pub fn decode_packet(registry: &PacketRegistry, bytes: &[u8]) -> Result<Packet> {
    let mut reader = BitReader::new(bytes);
    let flags = PacketFlags::decode(&mut reader)?;
    let body = if flags.packet_type == PacketType::Crypto {
        PacketBody::Crypto(registry.decode_crypto(&mut reader)?)
    } else {
        let opcode = reader.peek_uint(8, Endian::Little)? as u8;
        if opcode == CONTROL_MARKER {
            PacketBody::Control(registry.decode_control(&mut reader)?)
        } else {
            PacketBody::Game(registry.decode_game(&mut reader)?)
        }
    };
    Ok(Packet { flags, body })
}

/// Encodes `packet` into a fresh buffer, zero-padded to a byte boundary.
pub fn encode_packet(packet: &Packet) -> Result<Bytes> {
    // Crypto bodies and the Crypto packet type imply each other.
    let crypto_flagged = packet.flags.packet_type == PacketType::Crypto;
    let crypto_body = matches!(packet.body, PacketBody::Crypto(_));
    if crypto_flagged != crypto_body {
        return Err(CodecError::InvalidFormat {
            offset: 0,
            what: "packet",
            reason: "packet type and body family disagree".into(),
        });
    }

    let mut writer = BitWriter::new();
    packet.flags.encode(&mut writer)?;
    match &packet.body {
        PacketBody::Game(body) => body.encode(&mut writer)?,
        PacketBody::Control(body) => body.encode(&mut writer)?,
        PacketBody::Crypto(body) => body.encode(&mut writer)?,
    }
    Ok(writer.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::control::{ConnectionClose, TeardownConnection};
    use super::crypto::ServerFinished;
    use super::game::KeepAliveMessage;
    use super::*;

    fn frame_roundtrip(packet: Packet) -> Bytes {
        let registry = PacketRegistry::with_defaults();
        let bytes = encode_packet(&packet).unwrap();
        let decoded = decode_packet(&registry, &bytes).unwrap();
        assert_eq!(decoded, packet);
        bytes
    }

    #[test]
    fn test_game_frame_golden_bytes() {
        let bytes = frame_roundtrip(Packet::game(GamePacket::KeepAlive(KeepAliveMessage {
            code: 0,
        })));
        assert_eq!(&bytes[..], &[0x42, 0x1A, 0x00, 0x00]);
    }

    #[test]
    fn test_control_frame_routes_through_marker() {
        let bytes = frame_roundtrip(Packet::control(ControlPacket::TeardownConnection(
            TeardownConnection { nonce: 0x1234 },
        )));
        assert_eq!(&bytes[..4], &[0x42, 0x00, 0x0E, 0x34]);
    }

    #[test]
    fn test_crypto_frame_uses_crypto_packet_type() {
        let bytes = frame_roundtrip(Packet::crypto(CryptoPacket::ServerFinished(
            ServerFinished {
                challenge_result: [7; 12],
            },
        )));
        assert_eq!(bytes[0], 0x32);
        assert_eq!(bytes[1], 0x04);
    }

    #[test]
    fn test_secured_flag_is_carried_through() {
        let mut packet = Packet::game(GamePacket::KeepAlive(KeepAliveMessage { code: 1 }));
        packet.flags.secured = true;
        let bytes = frame_roundtrip(packet);
        assert_eq!(bytes[0], 0x46);
    }

    #[test]
    fn test_reset_sequence_and_unknown2_round_trip() {
        for packet_type in [PacketType::ResetSequence, PacketType::Unknown2] {
            let mut packet = Packet::control(ControlPacket::ConnectionClose(ConnectionClose {}));
            packet.flags.packet_type = packet_type;
            frame_roundtrip(packet);
        }
    }

    #[test]
    fn test_family_accessor() {
        assert_eq!(
            Packet::game(GamePacket::KeepAlive(KeepAliveMessage { code: 0 })).family(),
            PacketFamily::Game
        );
        assert_eq!(PacketFamily::Crypto.to_string(), "crypto");
    }

    #[test]
    fn test_mismatched_crypto_flags_refuse_to_encode() {
        let packet = Packet {
            flags: PacketFlags {
                packet_type: PacketType::Crypto,
                secured: false,
            },
            body: PacketBody::Game(GamePacket::KeepAlive(KeepAliveMessage { code: 0 })),
        };
        assert!(matches!(
            encode_packet(&packet),
            Err(CodecError::InvalidFormat { what: "packet", .. })
        ));
    }

    #[test]
    fn test_truncated_frame_is_end_of_stream() {
        let registry = PacketRegistry::with_defaults();
        let err = decode_packet(&registry, &[0x42]).unwrap_err();
        assert!(matches!(err, CodecError::EndOfStream { offset: 8, .. }));
    }
}
