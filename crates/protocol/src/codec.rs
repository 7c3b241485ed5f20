//! Composable decode/encode layer over the bit stream.
//!
//! Every wire type implements the [`Decode`]/[`Encode`] trait pair. Packets
//! whose fields all have an intrinsic wire width can derive both; anything
//! with sub-byte or size-dependent fields implements them by hand on top of
//! the helpers here (constants, padding, either-tagged unions, size-prefixed
//! regions).
//!
//! Codec values are immutable and freely shared; the mutable state lives in
//! the caller-owned [`BitReader`]/[`BitWriter`].

use std::fmt;

use crate::bits::{BitReader, BitWriter, Endian};
use crate::error::{CodecError, Result};

pub use auraxis_protocol_derive::{Decode, Encode};

/// Declared output size of an encoder, in bits.
///
/// Exact sizes drive the self-delimiting constructor payloads and let tests
/// hold encoders to their declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeHint {
    Exact(usize),
    AtLeast(usize),
    Unknown,
}

/// Decoding half of a codec: bit stream in, value out.
pub trait Decode: Sized {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self>;
}

/// Encoding half of a codec: value in, bits appended.
pub trait Encode {
    /// Size bound of the encoded form.
    const SIZE: SizeHint = SizeHint::Unknown;

    fn encode(&self, writer: &mut BitWriter) -> Result<()>;
}

macro_rules! impl_uint {
    ($($ty:ty => $width:expr),* $(,)?) => {
        $(
            impl Decode for $ty {
                fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
                    Ok(reader.read_uint($width, Endian::Little)? as $ty)
                }
            }

            impl Encode for $ty {
                const SIZE: SizeHint = SizeHint::Exact($width as usize);

                fn encode(&self, writer: &mut BitWriter) -> Result<()> {
                    writer.write_uint(*self as u32, $width, Endian::Little)
                }
            }
        )*
    };
}

impl_uint! { u8 => 8, u16 => 16, u32 => 32 }

impl Decode for bool {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        reader.read_bool()
    }
}

impl Encode for bool {
    const SIZE: SizeHint = SizeHint::Exact(1);

    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        writer.write_bool(*self);
        Ok(())
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        let mut out = [0u8; N];
        for slot in &mut out {
            *slot = reader.read_uint(8, Endian::Little)? as u8;
        }
        Ok(out)
    }
}

impl<const N: usize> Encode for [u8; N] {
    const SIZE: SizeHint = SizeHint::Exact(N * 8);

    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        writer.write_bytes(self);
        Ok(())
    }
}

// The bare String impls carry the narrow (ASCII) form; wide strings and
// aligned variants go through `strings` explicitly.
impl Decode for String {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        crate::strings::read_string(reader)
    }
}

impl Encode for String {
    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        crate::strings::write_string(writer, self)
    }
}

/// Identifier of a live game object. 16 bits little-endian on the wire,
/// opaque to the codec layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Guid(pub u16);

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GUID({})", self.0)
    }
}

impl Decode for Guid {
    fn decode(reader: &mut BitReader<'_>) -> Result<Self> {
        Ok(Guid(u16::decode(reader)?))
    }
}

impl Encode for Guid {
    const SIZE: SizeHint = SizeHint::Exact(16);

    fn encode(&self, writer: &mut BitWriter) -> Result<()> {
        self.0.encode(writer)
    }
}

/// Decodes a `width`-bit field that must hold exactly `expected`.
pub fn read_constant(
    reader: &mut BitReader<'_>,
    width: u32,
    endian: Endian,
    expected: u32,
) -> Result<()> {
    let offset = reader.position();
    let actual = reader.read_uint(width, endian)?;
    if actual != expected {
        return Err(CodecError::ConstantMismatch {
            offset,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Emits a reserved constant field.
pub fn write_constant(writer: &mut BitWriter, width: u32, endian: Endian, value: u32) -> Result<()> {
    writer.write_uint(value, width, endian)
}

/// Skips `n_bits` of padding on decode.
pub fn read_padding(reader: &mut BitReader<'_>, n_bits: usize) -> Result<()> {
    reader.skip(n_bits)
}

/// Emits `n_bits` of zero padding.
pub fn write_padding(writer: &mut BitWriter, n_bits: usize) {
    for _ in 0..n_bits {
        writer.write_bool(false);
    }
}

/// Two-branch union selected by a one-bit tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

/// Decodes the tag bit, then the branch it selects: a set tag picks `left`,
/// a clear tag picks `right`.
pub fn decode_either<'a, L, R>(
    reader: &mut BitReader<'a>,
    left: impl FnOnce(&mut BitReader<'a>) -> Result<L>,
    right: impl FnOnce(&mut BitReader<'a>) -> Result<R>,
) -> Result<Either<L, R>> {
    if reader.read_bool()? {
        Ok(Either::Left(left(reader)?))
    } else {
        Ok(Either::Right(right(reader)?))
    }
}

/// Decodes a region declared to span exactly `size_bytes` bytes. The inner
/// closure sees only that region; leftover bits in it raise `SizeMismatch`.
pub fn read_sized_bytes<'a, T>(
    reader: &mut BitReader<'a>,
    size_bytes: usize,
    inner: impl FnOnce(&mut BitReader<'a>) -> Result<T>,
) -> Result<T> {
    let declared = size_bytes * 8;
    let offset = reader.position();
    let mut region = reader.split_off(declared)?;
    let value = inner(&mut region)?;
    if !region.is_empty() {
        return Err(CodecError::SizeMismatch {
            offset,
            declared,
            consumed: declared - region.remaining(),
        });
    }
    Ok(value)
}

/// Encodes `inner` into a scratch buffer, hands its measured byte length to
/// `size` for the prefix, then splices the buffered bits.
pub fn write_sized_bytes(
    writer: &mut BitWriter,
    size: impl FnOnce(&mut BitWriter, usize) -> Result<()>,
    inner: impl FnOnce(&mut BitWriter) -> Result<()>,
) -> Result<()> {
    let mut scratch = BitWriter::new();
    inner(&mut scratch)?;
    if scratch.bit_len() % 8 != 0 {
        return Err(CodecError::SizeMismatch {
            offset: writer.bit_len(),
            declared: scratch.bit_len().div_ceil(8) * 8,
            consumed: scratch.bit_len(),
        });
    }
    size(writer, scratch.bit_len() / 8)?;
    writer.append(&scratch);
    Ok(())
}

/// Defines a wire enumeration with an explicit storage width and a contiguous
/// id range starting at `first`. Decoding a value outside `[first, last]`
/// fails with `EnumOutOfRange`; the width is checked against `last` at
/// compile time.
#[macro_export]
macro_rules! protocol_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : width $width:literal, first $first:literal {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            pub const NAME: &'static str = stringify!($name);
            pub const WIDTH: u32 = $width;
            pub const FIRST: u32 = $first;
            pub const LAST: u32 = {
                let mut last: u32 = $first;
                $(if $value > last { last = $value; })+
                last
            };

            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            pub fn from_id(id: u32) -> Option<Self> {
                match id {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            #[inline]
            pub fn id(self) -> u32 {
                self as u32
            }

            pub fn read(reader: &mut $crate::bits::BitReader<'_>) -> $crate::error::Result<Self> {
                let offset = reader.position();
                let id = reader.read_uint(Self::WIDTH, $crate::bits::Endian::Little)?;
                Self::from_id(id).ok_or($crate::error::CodecError::EnumOutOfRange {
                    name: Self::NAME,
                    first: Self::FIRST,
                    last: Self::LAST,
                    value: id,
                    offset,
                })
            }

            pub fn write(self, writer: &mut $crate::bits::BitWriter) -> $crate::error::Result<()> {
                writer.write_uint(self.id(), Self::WIDTH, $crate::bits::Endian::Little)
            }
        }

        // The largest id must fit the declared storage width.
        const _: () = assert!($width == 32 || $name::LAST < (1u32 << $width));

        impl $crate::codec::Decode for $name {
            fn decode(reader: &mut $crate::bits::BitReader<'_>) -> $crate::error::Result<Self> {
                Self::read(reader)
            }
        }

        impl $crate::codec::Encode for $name {
            const SIZE: $crate::codec::SizeHint = $crate::codec::SizeHint::Exact($width as usize);

            fn encode(&self, writer: &mut $crate::bits::BitWriter) -> $crate::error::Result<()> {
                (*self).write(writer)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    protocol_enum! {
        /// Fixture enumeration for the range checks below.
        enum Fixture: width 3, first 1 {
            One = 1,
            Two = 2,
            Five = 5,
        }
    }

    #[test]
    fn test_primitive_roundtrip() {
        let mut writer = BitWriter::new();
        0xABu8.encode(&mut writer).unwrap();
        0x1234u16.encode(&mut writer).unwrap();
        0xDEAD_BEEFu32.encode(&mut writer).unwrap();
        true.encode(&mut writer).unwrap();
        Guid(1055).encode(&mut writer).unwrap();
        let bytes = writer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        assert_eq!(u8::decode(&mut reader).unwrap(), 0xAB);
        assert_eq!(u16::decode(&mut reader).unwrap(), 0x1234);
        assert_eq!(u32::decode(&mut reader).unwrap(), 0xDEAD_BEEF);
        assert!(bool::decode(&mut reader).unwrap());
        assert_eq!(Guid::decode(&mut reader).unwrap(), Guid(1055));
    }

    #[test]
    fn test_multibyte_fields_are_little_endian() {
        let mut writer = BitWriter::new();
        0x1234u16.encode(&mut writer).unwrap();
        assert_eq!(&writer.into_bytes()[..], &[0x34, 0x12]);
    }

    #[test]
    fn test_byte_array_roundtrip() {
        let challenge: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];
        let mut writer = BitWriter::new();
        challenge.encode(&mut writer).unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(&bytes[..], &challenge);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(<[u8; 4]>::decode(&mut reader).unwrap(), challenge);
    }

    #[test]
    fn test_constant_verifies_on_decode() {
        let mut writer = BitWriter::new();
        write_constant(&mut writer, 4, Endian::Little, 8).unwrap();
        let bytes = writer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        read_constant(&mut reader, 4, Endian::Little, 8).unwrap();

        let mut reader = BitReader::new(&bytes);
        let err = read_constant(&mut reader, 4, Endian::Little, 2).unwrap_err();
        assert_eq!(
            err,
            CodecError::ConstantMismatch {
                offset: 0,
                expected: 2,
                actual: 8
            }
        );
    }

    #[test]
    fn test_padding_roundtrip() {
        let mut writer = BitWriter::new();
        writer.write_bool(true);
        write_padding(&mut writer, 7);
        0x5Au8.encode(&mut writer).unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(&bytes[..], &[0x80, 0x5A]);

        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bool().unwrap());
        read_padding(&mut reader, 7).unwrap();
        assert_eq!(u8::decode(&mut reader).unwrap(), 0x5A);
    }

    #[test]
    fn test_either_tag_selects_branch() {
        let mut writer = BitWriter::new();
        writer.write_bool(false);
        writer.write_uint(5, 7, Endian::Little).unwrap();
        let bytes = writer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        let value = decode_either(
            &mut reader,
            |r| r.read_uint(15, Endian::Little),
            |r| r.read_uint(7, Endian::Little),
        )
        .unwrap();
        assert_eq!(value, Either::Right(5));
    }

    #[test]
    fn test_sized_region_exact() {
        let mut writer = BitWriter::new();
        write_sized_bytes(
            &mut writer,
            |w, len| w.write_uint(len as u32, 8, Endian::Little),
            |w| {
                w.write_bytes(&[0xAA, 0xBB]);
                Ok(())
            },
        )
        .unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(&bytes[..], &[0x02, 0xAA, 0xBB]);

        let mut reader = BitReader::new(&bytes);
        let len = reader.read_uint(8, Endian::Little).unwrap() as usize;
        let inner = read_sized_bytes(&mut reader, len, |r| r.read_bytes(len)).unwrap();
        assert_eq!(inner, vec![0xAA, 0xBB]);
    }

    #[test]
    fn test_sized_region_underconsumption_is_an_error() {
        let data = [0xAA, 0xBB];
        let mut reader = BitReader::new(&data);
        let err = read_sized_bytes(&mut reader, 2, |r| r.read_bytes(1)).unwrap_err();
        assert_eq!(
            err,
            CodecError::SizeMismatch {
                offset: 0,
                declared: 16,
                consumed: 8
            }
        );
    }

    #[test]
    fn test_enum_totality() {
        for &variant in Fixture::ALL {
            let mut writer = BitWriter::new();
            variant.write(&mut writer).unwrap();
            assert_eq!(writer.bit_len(), 3);
            let bytes = writer.into_bytes();
            let mut reader = BitReader::new(&bytes);
            assert_eq!(Fixture::read(&mut reader).unwrap(), variant);
        }
    }

    #[test]
    fn test_enum_out_of_range() {
        for id in [0u32, 3, 4, 6, 7] {
            let mut writer = BitWriter::new();
            writer.write_uint(id, 3, Endian::Little).unwrap();
            let bytes = writer.into_bytes();
            let mut reader = BitReader::new(&bytes);
            let err = Fixture::read(&mut reader).unwrap_err();
            assert_eq!(
                err,
                CodecError::EnumOutOfRange {
                    name: "Fixture",
                    first: 1,
                    last: 5,
                    value: id,
                    offset: 0
                }
            );
        }
    }

    #[test]
    fn test_enum_error_message_shape() {
        let mut writer = BitWriter::new();
        writer.write_uint(7, 3, Endian::Little).unwrap();
        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        let message = Fixture::read(&mut reader).unwrap_err().to_string();
        assert_eq!(
            message,
            "Expected Fixture with ID between [1, 5], but got 7 at bit 0"
        );
    }
}
