//! Object-creation constructor payloads.
//!
//! Each object class that can appear in an object-creation packet declares a
//! fixed payload layout with an exact bit size, so the outer packet can
//! delimit it without understanding it. Several fields are reserved constants
//! on the wire; decode rejects any deviation and encode reproduces them
//! verbatim.

use crate::bits::{BitReader, BitWriter, Endian};
use crate::codec::{self, Decode, Encode, SizeHint};
use crate::error::{CodecError, Result};

/// Object class codes used by the object-creation packets.
pub mod object_class {
    pub const ACE: u16 = 0x020;
    pub const REMOTE_ELECTRONICS_KIT: u16 = 0x34D;
}

/// Full initial state of a Remote Electronics Kit.
///
/// Exactly 67 bits:
///
/// ```text
/// unk1:4 | 8:4 | 0:20 | 2:4 | 0:16 | 8:4 | unk2:15
/// ```
///
/// little-endian per field. `unk2` tracks the hacking strength reported by
/// clients; the reserved runs have never been observed nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailedRekData {
    pub unk1: u8,
    pub unk2: u16,
}

impl DetailedRekData {
    pub const BIT_SIZE: usize = 67;
}

impl Decode for DetailedRekData {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        let unk1 = reader.read_uint(4, Endian::Little)? as u8;
        codec::read_constant(reader, 4, Endian::Little, 8)?;
        codec::read_constant(reader, 20, Endian::Little, 0)?;
        codec::read_constant(reader, 4, Endian::Little, 2)?;
        codec::read_constant(reader, 16, Endian::Little, 0)?;
        codec::read_constant(reader, 4, Endian::Little, 8)?;
        let unk2 = reader.read_uint(15, Endian::Little)? as u16;
        Ok(Self { unk1, unk2 })
    }
}

impl Encode for DetailedRekData {
    const SIZE: SizeHint = SizeHint::Exact(Self::BIT_SIZE);

    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        writer.write_uint(self.unk1 as u32, 4, Endian::Little)?;
        codec::write_constant(writer, 4, Endian::Little, 8)?;
        codec::write_constant(writer, 20, Endian::Little, 0)?;
        codec::write_constant(writer, 4, Endian::Little, 2)?;
        codec::write_constant(writer, 16, Endian::Little, 0)?;
        codec::write_constant(writer, 4, Endian::Little, 8)?;
        writer.write_uint(self.unk2 as u32, 15, Endian::Little)
    }
}

/// Full initial state of an Adaptive Construction Engine.
///
/// Exactly 52 bits: `unk1:4 | 8:4 | 0:20 | 2:4 | unk2:20`, little-endian per
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailedAceData {
    pub unk1: u8,
    pub unk2: u32,
}

impl DetailedAceData {
    pub const BIT_SIZE: usize = 52;
}

impl Decode for DetailedAceData {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        let unk1 = reader.read_uint(4, Endian::Little)? as u8;
        codec::read_constant(reader, 4, Endian::Little, 8)?;
        codec::read_constant(reader, 20, Endian::Little, 0)?;
        codec::read_constant(reader, 4, Endian::Little, 2)?;
        let unk2 = reader.read_uint(20, Endian::Little)?;
        Ok(Self { unk1, unk2 })
    }
}

impl Encode for DetailedAceData {
    const SIZE: SizeHint = SizeHint::Exact(Self::BIT_SIZE);

    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        writer.write_uint(self.unk1 as u32, 4, Endian::Little)?;
        codec::write_constant(writer, 4, Endian::Little, 8)?;
        codec::write_constant(writer, 20, Endian::Little, 0)?;
        codec::write_constant(writer, 4, Endian::Little, 2)?;
        writer.write_uint(self.unk2, 20, Endian::Little)
    }
}

/// Class-dispatched constructor payload of one created object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorData {
    Ace(DetailedAceData),
    Rek(DetailedRekData),
}

impl ConstructorData {
    /// Class code selecting this payload layout.
    pub fn object_class(&self) -> u16 {
        match self {
            Self::Ace(_) => object_class::ACE,
            Self::Rek(_) => object_class::REMOTE_ELECTRONICS_KIT,
        }
    }

    /// Declared wire size in bits.
    pub fn bit_size(&self) -> usize {
        match self {
            Self::Ace(_) => DetailedAceData::BIT_SIZE,
            Self::Rek(_) => DetailedRekData::BIT_SIZE,
        }
    }

    /// Declared wire size for a class code, `None` for classes without a
    /// constructor.
    pub fn bit_size_of(object_class: u16) -> Option<usize> {
        match object_class {
            object_class::ACE => Some(DetailedAceData::BIT_SIZE),
            object_class::REMOTE_ELECTRONICS_KIT => Some(DetailedRekData::BIT_SIZE),
            _ => None,
        }
    }

    /// Decodes the payload layout selected by `object_class`.
    pub fn decode_class(reader: &mut BitReader<'_>, object_class: u16) -> Result<Self> {
        match object_class {
            object_class::ACE => Ok(Self::Ace(DetailedAceData::decode(reader)?)),
            object_class::REMOTE_ELECTRONICS_KIT => {
                Ok(Self::Rek(DetailedRekData::decode(reader)?))
            }
            _ => Err(CodecError::InvalidFormat {
                offset: reader.position(),
                what: "object class",
                reason: format!("no constructor for class {object_class:#x}"),
            }),
        }
    }
}

impl Encode for ConstructorData {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        match self {
            Self::Ace(data) => data.encode(writer),
            Self::Rek(data) => data.encode(writer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rek_golden_bytes() {
        let data = DetailedRekData {
            unk1: 0xA,
            unk2: 0x1234,
        };
        let mut writer = BitWriter::new();
        data.encode(&mut writer).unwrap();
        assert_eq!(writer.bit_len(), DetailedRekData::BIT_SIZE);
        let bytes = writer.into_bytes();
        assert_eq!(
            &bytes[..],
            &[0xA8, 0x00, 0x00, 0x02, 0x00, 0x00, 0x83, 0x42, 0x40]
        );

        let mut reader = BitReader::new(&bytes);
        assert_eq!(DetailedRekData::decode(&mut reader).unwrap(), data);
        assert_eq!(reader.position(), DetailedRekData::BIT_SIZE);
    }

    #[test]
    fn test_rek_size_hint_matches_output() {
        assert_eq!(
            <DetailedRekData as Encode>::SIZE,
            SizeHint::Exact(DetailedRekData::BIT_SIZE)
        );
        let mut writer = BitWriter::new();
        DetailedRekData { unk1: 0, unk2: 0 }
            .encode(&mut writer)
            .unwrap();
        assert_eq!(writer.bit_len(), DetailedRekData::BIT_SIZE);
    }

    #[test]
    fn test_rek_constant_mismatch() {
        let data = DetailedRekData {
            unk1: 0xA,
            unk2: 0x1234,
        };
        let mut writer = BitWriter::new();
        data.encode(&mut writer).unwrap();
        let good = writer.into_bytes();

        // Flip the first constant nibble (bits 4..8, value 8 -> 9).
        let mut bad = good.to_vec();
        bad[0] = (bad[0] & 0xF0) | 0x9;
        let mut reader = BitReader::new(&bad);
        let err = DetailedRekData::decode(&mut reader).unwrap_err();
        assert_eq!(
            err,
            CodecError::ConstantMismatch {
                offset: 4,
                expected: 8,
                actual: 9
            }
        );

        // Disturb the 20-bit reserved run.
        let mut bad = good.to_vec();
        bad[1] = 0x01;
        let mut reader = BitReader::new(&bad);
        let err = DetailedRekData::decode(&mut reader).unwrap_err();
        assert!(matches!(
            err,
            CodecError::ConstantMismatch {
                offset: 8,
                expected: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_ace_roundtrip() {
        let data = DetailedAceData {
            unk1: 0x3,
            unk2: 0xABCDE,
        };
        let mut writer = BitWriter::new();
        data.encode(&mut writer).unwrap();
        assert_eq!(writer.bit_len(), DetailedAceData::BIT_SIZE);
        let bytes = writer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        assert_eq!(DetailedAceData::decode(&mut reader).unwrap(), data);
    }

    #[test]
    fn test_class_dispatch() {
        assert_eq!(
            ConstructorData::bit_size_of(object_class::REMOTE_ELECTRONICS_KIT),
            Some(67)
        );
        assert_eq!(ConstructorData::bit_size_of(object_class::ACE), Some(52));
        assert_eq!(ConstructorData::bit_size_of(0x123), None);

        let rek = ConstructorData::Rek(DetailedRekData { unk1: 1, unk2: 2 });
        assert_eq!(rek.object_class(), object_class::REMOTE_ELECTRONICS_KIT);
        assert_eq!(rek.bit_size(), 67);

        let mut writer = BitWriter::new();
        rek.encode(&mut writer).unwrap();
        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        let decoded =
            ConstructorData::decode_class(&mut reader, object_class::REMOTE_ELECTRONICS_KIT)
                .unwrap();
        assert_eq!(decoded, rek);
    }

    #[test]
    fn test_unknown_class_is_rejected() {
        let data = [0u8; 16];
        let mut reader = BitReader::new(&data);
        let err = ConstructorData::decode_class(&mut reader, 0x7FF).unwrap_err();
        assert!(matches!(err, CodecError::InvalidFormat { offset: 0, .. }));
    }
}
