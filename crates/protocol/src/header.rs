//! The flags preamble framing every packet.
//!
//! Wire format (8 bits, in stream order):
//!
//! ```text
//! ┌─────────────┬──────────┬─────────┬──────────┬──────────────────┐
//! │ packet_type │ reserved │ secured │ advanced │ length_specified │
//! │   4 bits    │  1 bit   │  1 bit  │ 1 bit    │ 1 bit            │
//! │   1..=4     │ always 0 │         │ always 1 │ always 0         │
//! └─────────────┴──────────┴─────────┴──────────┴──────────────────┘
//! ```
//!
//! The three constant bits are part of the codec: a frame that does not carry
//! exactly those values is rejected with `ConstantMismatch` at the offending
//! bit offset. Encoding always emits them.

use crate::bits::{BitReader, BitWriter, Endian};
use crate::codec::{self, Decode, Encode, SizeHint};
use crate::error::Result;
use crate::protocol_enum;

protocol_enum! {
    /// Transport-level packet category carried in the flags preamble.
    ///
    /// The client never documents what `ResetSequence` and `Unknown2` mean;
    /// both travel the same post-header path as `Normal` and round-trip
    /// unchanged.
    pub enum PacketType: width 4, first 1 {
        ResetSequence = 1,
        Unknown2 = 2,
        Crypto = 3,
        Normal = 4,
    }
}

/// Decoded flags preamble.
///
/// `secured` records whether the payload went through the encryption layer
/// upstream; it is carried through, never interpreted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketFlags {
    pub packet_type: PacketType,
    pub secured: bool,
}

impl Decode for PacketFlags {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        let packet_type = PacketType::read(reader)?;
        codec::read_constant(reader, 1, Endian::Big, 0)?;
        let secured = reader.read_bool()?;
        codec::read_constant(reader, 1, Endian::Big, 1)?;
        codec::read_constant(reader, 1, Endian::Big, 0)?;
        Ok(Self {
            packet_type,
            secured,
        })
    }
}

impl Encode for PacketFlags {
    const SIZE: SizeHint = SizeHint::Exact(8);

    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        self.packet_type.write(writer)?;
        codec::write_constant(writer, 1, Endian::Big, 0)?;
        writer.write_bool(self.secured);
        codec::write_constant(writer, 1, Endian::Big, 1)?;
        codec::write_constant(writer, 1, Endian::Big, 0)
    }
}
