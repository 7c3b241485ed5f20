//! Game-family packets.
//!
//! The game family covers everything a live session exchanges after the
//! crypto handshake: world attachment, chat, object creation, liveness. This
//! is the subset of the catalogue the server currently speaks; unknown
//! opcodes surface as `UnknownOpcode` from the dispatcher.

use crate::bits::{BitReader, BitWriter, Endian};
use crate::codec::{Decode, Encode, Guid};
use crate::error::{CodecError, Result};
use crate::objects::ConstructorData;
use crate::protocol_enum;
use crate::strings;

/// Game-family opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GameOpcode {
    ConnectToWorldRequestMessage = 0x04,
    ChatMsg = 0x12,
    ObjectCreateDetailedMessage = 0x17,
    KeepAliveMessage = 0x1A,
    SetEmpireMessage = 0x24,
}

impl GameOpcode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x04 => Some(Self::ConnectToWorldRequestMessage),
            0x12 => Some(Self::ChatMsg),
            0x17 => Some(Self::ObjectCreateDetailedMessage),
            0x1A => Some(Self::KeepAliveMessage),
            0x24 => Some(Self::SetEmpireMessage),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Periodic liveness probe. The client echoes `code` back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Decode, Encode)]
pub struct KeepAliveMessage {
    pub code: u16,
}

/// Client request to attach to a world server after login.
#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode)]
pub struct ConnectToWorldRequestMessage {
    pub server_name: String,
    pub token: String,
    pub major_version: u32,
    pub minor_version: u32,
    pub revision: u32,
    pub build_date: String,
    pub unk: u16,
}

protocol_enum! {
    /// Routing channel of a chat line.
    pub enum ChatChannel: width 8, first 1 {
        Open = 1,
        Tell = 2,
        Broadcast = 3,
        Squad = 4,
        Platoon = 5,
        Command = 6,
        Note = 7,
    }
}

/// One chat line.
///
/// `recipient` re-aligns to a byte boundary after its size prefix: the
/// channel byte plus the wide flag leave the cursor one bit past a boundary,
/// and a size prefix never changes alignment, so the client pads seven bits
/// there. `contents` is wide or narrow depending on `wide_contents`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMsg {
    pub channel: ChatChannel,
    pub wide_contents: bool,
    pub recipient: String,
    pub contents: String,
}

impl Decode for ChatMsg {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        let channel = ChatChannel::read(reader)?;
        let wide_contents = reader.read_bool()?;
        let recipient = strings::read_wide_string_aligned(reader, 7)?;
        let contents = if wide_contents {
            strings::read_wide_string(reader)?
        } else {
            strings::read_string(reader)?
        };
        Ok(Self {
            channel,
            wide_contents,
            recipient,
            contents,
        })
    }
}

impl Encode for ChatMsg {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        self.channel.write(writer)?;
        writer.write_bool(self.wide_contents);
        strings::write_wide_string_aligned(writer, &self.recipient, 7)?;
        if self.wide_contents {
            strings::write_wide_string(writer, &self.contents)
        } else {
            strings::write_string(writer, &self.contents)
        }
    }
}

protocol_enum! {
    /// Faction alignment of a game object.
    pub enum Empire: width 2, first 0 {
        Tr = 0,
        Nc = 1,
        Vs = 2,
    }
}

/// Assigns a faction to the object named by `guid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Decode, Encode)]
pub struct SetEmpireMessage {
    pub guid: Guid,
    pub empire: Empire,
}

/// Parent attachment of a newly created object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentInfo {
    pub guid: Guid,
    pub slot: u8,
}

/// Creates one game object with its full initial state.
///
/// Wire layout:
///
/// ```text
/// stream_length:u32 LE   bit count of everything after this field
/// has_parent:1           then parent guid:u16 and slot:u8 when set
/// object_class:11 LE
/// guid:u16
/// constructor payload    self-delimiting, see `objects`
/// ```
///
/// The payload length implied by `stream_length` must equal the declared bit
/// size of the class's constructor, or the frame is rejected with
/// `SizeMismatch` before the payload is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectCreateDetailedMessage {
    pub guid: Guid,
    pub parent: Option<ParentInfo>,
    pub data: ConstructorData,
}

impl Decode for ObjectCreateDetailedMessage {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        let length_offset = reader.position();
        let stream_length = reader.read_uint(32, Endian::Little)? as usize;
        let body_start = reader.position();

        let parent = if reader.read_bool()? {
            Some(ParentInfo {
                guid: Guid::decode(reader)?,
                slot: u8::decode(reader)?,
            })
        } else {
            None
        };
        let object_class = reader.read_uint(11, Endian::Little)? as u16;
        let guid = Guid::decode(reader)?;

        let header_bits = reader.position() - body_start;
        let payload_bits =
            stream_length
                .checked_sub(header_bits)
                .ok_or(CodecError::SizeMismatch {
                    offset: length_offset,
                    declared: stream_length,
                    consumed: header_bits,
                })?;
        let declared =
            ConstructorData::bit_size_of(object_class).ok_or_else(|| CodecError::InvalidFormat {
                offset: reader.position(),
                what: "object class",
                reason: format!("no constructor for class {object_class:#x}"),
            })?;
        if declared != payload_bits {
            return Err(CodecError::SizeMismatch {
                offset: reader.position(),
                declared,
                consumed: payload_bits,
            });
        }

        let region_offset = reader.position();
        let mut region = reader.split_off(payload_bits)?;
        let data = ConstructorData::decode_class(&mut region, object_class)?;
        if !region.is_empty() {
            return Err(CodecError::SizeMismatch {
                offset: region_offset,
                declared: payload_bits,
                consumed: payload_bits - region.remaining(),
            });
        }

        Ok(Self { guid, parent, data })
    }
}

impl Encode for ObjectCreateDetailedMessage {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        let mut body = BitWriter::new();
        match &self.parent {
            Some(parent) => {
                body.write_bool(true);
                parent.guid.encode(&mut body)?;
                parent.slot.encode(&mut body)?;
            }
            None => body.write_bool(false),
        }
        body.write_uint(self.data.object_class() as u32, 11, Endian::Little)?;
        self.guid.encode(&mut body)?;
        self.data.encode(&mut body)?;

        writer.write_uint(body.bit_len() as u32, 32, Endian::Little)?;
        writer.append(&body);
        Ok(())
    }
}

/// A decoded game-family packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GamePacket {
    ConnectToWorldRequest(ConnectToWorldRequestMessage),
    Chat(ChatMsg),
    ObjectCreateDetailed(ObjectCreateDetailedMessage),
    KeepAlive(KeepAliveMessage),
    SetEmpire(SetEmpireMessage),
}

impl GamePacket {
    /// Opcode identifying this packet within the game family.
    pub fn opcode(&self) -> GameOpcode {
        match self {
            Self::ConnectToWorldRequest(_) => GameOpcode::ConnectToWorldRequestMessage,
            Self::Chat(_) => GameOpcode::ChatMsg,
            Self::ObjectCreateDetailed(_) => GameOpcode::ObjectCreateDetailedMessage,
            Self::KeepAlive(_) => GameOpcode::KeepAliveMessage,
            Self::SetEmpire(_) => GameOpcode::SetEmpireMessage,
        }
    }
}

impl Encode for GamePacket {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        writer.write_uint(self.opcode().as_u8() as u32, 8, Endian::Little)?;
        match self {
            Self::ConnectToWorldRequest(msg) => msg.encode(writer),
            Self::Chat(msg) => msg.encode(writer),
            Self::ObjectCreateDetailed(msg) => msg.encode(writer),
            Self::KeepAlive(msg) => msg.encode(writer),
            Self::SetEmpire(msg) => msg.encode(writer),
        }
    }
}
