//! Startup-time opcode registry.
//!
//! Maps each family's opcode bytes to decoder entries. The registry is built
//! once while the process boots and is immutable afterwards, so it can be
//! shared freely across session actors without locking. Registering the same
//! opcode twice is a configuration error the process should refuse to start
//! over, not a silent replacement.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::bits::{BitReader, Endian};
use crate::codec::{self, Decode};
use crate::error::{CodecError, RegistryError, Result};
use crate::packets::control::{self, ControlOpcode, ControlPacket};
use crate::packets::crypto::{self, CryptoOpcode, CryptoPacket};
use crate::packets::game::{self, GameOpcode, GamePacket};
use crate::packets::{PacketFamily, CONTROL_MARKER};

/// Decoder entry for one game opcode. Receives the stream positioned just
/// after the opcode byte.
pub type GameDecoder = fn(&mut BitReader<'_>) -> Result<GamePacket>;
/// Decoder entry for one control opcode.
pub type ControlDecoder = fn(&mut BitReader<'_>) -> Result<ControlPacket>;
/// Decoder entry for one crypto opcode.
pub type CryptoDecoder = fn(&mut BitReader<'_>) -> Result<CryptoPacket>;

/// Immutable opcode → decoder tables, one per family.
#[derive(Clone, Default)]
pub struct PacketRegistry {
    game: HashMap<u8, GameDecoder>,
    control: HashMap<u8, ControlDecoder>,
    crypto: HashMap<u8, CryptoDecoder>,
}

impl PacketRegistry {
    /// An empty registry. Every decode fails with `UnknownOpcode` until
    /// opcodes are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every opcode this crate knows about.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry
            .game
            .insert(GameOpcode::ConnectToWorldRequestMessage.as_u8(), |r| {
                Ok(GamePacket::ConnectToWorldRequest(
                    game::ConnectToWorldRequestMessage::decode(r)?,
                ))
            });
        registry.game.insert(GameOpcode::ChatMsg.as_u8(), |r| {
            Ok(GamePacket::Chat(game::ChatMsg::decode(r)?))
        });
        registry
            .game
            .insert(GameOpcode::ObjectCreateDetailedMessage.as_u8(), |r| {
                Ok(GamePacket::ObjectCreateDetailed(
                    game::ObjectCreateDetailedMessage::decode(r)?,
                ))
            });
        registry
            .game
            .insert(GameOpcode::KeepAliveMessage.as_u8(), |r| {
                Ok(GamePacket::KeepAlive(game::KeepAliveMessage::decode(r)?))
            });
        registry
            .game
            .insert(GameOpcode::SetEmpireMessage.as_u8(), |r| {
                Ok(GamePacket::SetEmpire(game::SetEmpireMessage::decode(r)?))
            });

        registry
            .control
            .insert(ControlOpcode::ClientStart.as_u8(), |r| {
                Ok(ControlPacket::ClientStart(control::ClientStart::decode(r)?))
            });
        registry
            .control
            .insert(ControlOpcode::ServerStart.as_u8(), |r| {
                Ok(ControlPacket::ServerStart(control::ServerStart::decode(r)?))
            });
        registry
            .control
            .insert(ControlOpcode::MultiPacket.as_u8(), |r| {
                Ok(ControlPacket::MultiPacket(control::MultiPacket::decode(r)?))
            });
        registry
            .control
            .insert(ControlOpcode::ControlSync.as_u8(), |r| {
                Ok(ControlPacket::ControlSync(control::ControlSync::decode(r)?))
            });
        registry
            .control
            .insert(ControlOpcode::ControlSyncResp.as_u8(), |r| {
                Ok(ControlPacket::ControlSyncResp(
                    control::ControlSyncResp::decode(r)?,
                ))
            });
        registry
            .control
            .insert(ControlOpcode::ConnectionClose.as_u8(), |r| {
                Ok(ControlPacket::ConnectionClose(
                    control::ConnectionClose::decode(r)?,
                ))
            });
        registry
            .control
            .insert(ControlOpcode::TeardownConnection.as_u8(), |r| {
                Ok(ControlPacket::TeardownConnection(
                    control::TeardownConnection::decode(r)?,
                ))
            });

        registry
            .crypto
            .insert(CryptoOpcode::ClientChallengeXchg.as_u8(), |r| {
                Ok(CryptoPacket::ClientChallengeXchg(
                    crypto::ClientChallengeXchg::decode(r)?,
                ))
            });
        registry
            .crypto
            .insert(CryptoOpcode::ServerChallengeXchg.as_u8(), |r| {
                Ok(CryptoPacket::ServerChallengeXchg(
                    crypto::ServerChallengeXchg::decode(r)?,
                ))
            });
        registry
            .crypto
            .insert(CryptoOpcode::ClientFinished.as_u8(), |r| {
                Ok(CryptoPacket::ClientFinished(
                    crypto::ClientFinished::decode(r)?,
                ))
            });
        registry
            .crypto
            .insert(CryptoOpcode::ServerFinished.as_u8(), |r| {
                Ok(CryptoPacket::ServerFinished(
                    crypto::ServerFinished::decode(r)?,
                ))
            });

        registry
    }

    /// Registers a decoder for a game opcode. Call once per opcode at
    /// startup; a duplicate is fatal configuration.
    pub fn register_game_opcode(
        &mut self,
        opcode: GameOpcode,
        decoder: GameDecoder,
    ) -> std::result::Result<(), RegistryError> {
        match self.game.entry(opcode.as_u8()) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate {
                family: PacketFamily::Game,
                opcode: opcode.as_u8(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(decoder);
                Ok(())
            }
        }
    }

    /// Registers a decoder for a control opcode.
    pub fn register_control_opcode(
        &mut self,
        opcode: ControlOpcode,
        decoder: ControlDecoder,
    ) -> std::result::Result<(), RegistryError> {
        match self.control.entry(opcode.as_u8()) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate {
                family: PacketFamily::Control,
                opcode: opcode.as_u8(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(decoder);
                Ok(())
            }
        }
    }

    /// Registers a decoder for a crypto opcode.
    pub fn register_crypto_opcode(
        &mut self,
        opcode: CryptoOpcode,
        decoder: CryptoDecoder,
    ) -> std::result::Result<(), RegistryError> {
        match self.crypto.entry(opcode.as_u8()) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate {
                family: PacketFamily::Crypto,
                opcode: opcode.as_u8(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(decoder);
                Ok(())
            }
        }
    }

    /// True when `opcode` has a decoder in `family`.
    pub fn contains(&self, family: PacketFamily, opcode: u8) -> bool {
        match family {
            PacketFamily::Game => self.game.contains_key(&opcode),
            PacketFamily::Control => self.control.contains_key(&opcode),
            PacketFamily::Crypto => self.crypto.contains_key(&opcode),
        }
    }

    /// Total registered opcodes across all families.
    pub fn len(&self) -> usize {
        self.game.len() + self.control.len() + self.crypto.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes a game packet from a stream positioned at the opcode byte.
    pub fn decode_game(&self, reader: &mut BitReader<'_>) -> Result<GamePacket> {
        let offset = reader.position();
        let opcode = reader.read_uint(8, Endian::Little)? as u8;
        match self.game.get(&opcode) {
            Some(decoder) => decoder(reader),
            None => Err(CodecError::UnknownOpcode {
                family: PacketFamily::Game,
                opcode,
                offset,
            }),
        }
    }

    /// Decodes a control packet from a stream positioned at the 0x00 family
    /// marker.
    pub fn decode_control(&self, reader: &mut BitReader<'_>) -> Result<ControlPacket> {
        codec::read_constant(reader, 8, Endian::Little, CONTROL_MARKER as u32)?;
        let offset = reader.position();
        let opcode = reader.read_uint(8, Endian::Little)? as u8;
        match self.control.get(&opcode) {
            Some(decoder) => decoder(reader),
            None => Err(CodecError::UnknownOpcode {
                family: PacketFamily::Control,
                opcode,
                offset,
            }),
        }
    }

    /// Decodes a crypto packet from a stream positioned at the opcode byte.
    pub fn decode_crypto(&self, reader: &mut BitReader<'_>) -> Result<CryptoPacket> {
        let offset = reader.position();
        let opcode = reader.read_uint(8, Endian::Little)? as u8;
        match self.crypto.get(&opcode) {
            Some(decoder) => decoder(reader),
            None => Err(CodecError::UnknownOpcode {
                family: PacketFamily::Crypto,
                opcode,
                offset,
            }),
        }
    }
}
