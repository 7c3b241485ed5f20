//! Length-prefixed string codecs.
//!
//! The client uses a self-describing size prefix: one tag bit, then either a
//! 7-bit length (0..=127, one byte total) or, with the tag set, the low 7
//! bits of the length followed by its high 8 bits (128..=32767, two bytes
//! total). The short form is mandatory whenever the length fits it.
//!
//! Strings come in a narrow form (ASCII, one byte per symbol) and a wide form
//! (UTF-16LE, two bytes per symbol, prefix counting symbols). The `_aligned`
//! variants insert `pad_bits` zero bits between the size prefix and the
//! character data; the client re-aligns to a byte boundary there whenever the
//! prefix ends off one. Accepted pads are 0..=7, chosen per call site.

use crate::bits::{BitReader, BitWriter, Endian};
use crate::codec::{self, Either};
use crate::error::{CodecError, Result};

/// Longest length the two-byte size prefix can carry.
pub const MAX_STRING_SIZE: usize = 0x7FFF;

/// Decodes the string size prefix.
pub fn read_string_size(reader: &mut BitReader<'_>) -> Result<usize> {
    let size = codec::decode_either(
        reader,
        |r| {
            let low = r.read_uint(7, Endian::Little)?;
            let high = r.read_uint(8, Endian::Little)?;
            Ok((high << 7) | low)
        },
        |r| r.read_uint(7, Endian::Little),
    )?;
    Ok(match size {
        Either::Left(n) | Either::Right(n) => n as usize,
    })
}

/// Encodes the string size prefix, short form iff `size <= 127`.
pub fn write_string_size(writer: &mut BitWriter, size: usize) -> Result<()> {
    if size <= 0x7F {
        writer.write_bool(false);
        writer.write_uint(size as u32, 7, Endian::Little)
    } else if size <= MAX_STRING_SIZE {
        writer.write_bool(true);
        writer.write_uint((size & 0x7F) as u32, 7, Endian::Little)?;
        writer.write_uint((size >> 7) as u32, 8, Endian::Little)
    } else {
        Err(CodecError::ValueOutOfRange {
            offset: writer.bit_len(),
            value: size as u32,
            width: 15,
        })
    }
}

/// Decodes a narrow (ASCII) string.
pub fn read_string(reader: &mut BitReader<'_>) -> Result<String> {
    read_string_aligned(reader, 0)
}

/// Decodes a narrow string with `pad_bits` of padding after the size prefix.
pub fn read_string_aligned(reader: &mut BitReader<'_>, pad_bits: usize) -> Result<String> {
    debug_assert!(pad_bits < 8, "pad must be 0..=7");
    let size = read_string_size(reader)?;
    codec::read_padding(reader, pad_bits)?;
    let offset = reader.position();
    codec::read_sized_bytes(reader, size, |region| {
        let bytes = region.read_bytes(size)?;
        if !bytes.is_ascii() {
            return Err(CodecError::InvalidFormat {
                offset,
                what: "string",
                reason: "non-ASCII byte in narrow string".into(),
            });
        }
        String::from_utf8(bytes).map_err(|e| CodecError::InvalidFormat {
            offset,
            what: "string",
            reason: e.to_string(),
        })
    })
}

/// Encodes a narrow (ASCII) string.
pub fn write_string(writer: &mut BitWriter, value: &str) -> Result<()> {
    write_string_aligned(writer, value, 0)
}

/// Encodes a narrow string with `pad_bits` of padding after the size prefix.
pub fn write_string_aligned(writer: &mut BitWriter, value: &str, pad_bits: usize) -> Result<()> {
    debug_assert!(pad_bits < 8, "pad must be 0..=7");
    if !value.is_ascii() {
        return Err(CodecError::InvalidFormat {
            offset: writer.bit_len(),
            what: "string",
            reason: "narrow strings must be ASCII".into(),
        });
    }
    codec::write_sized_bytes(
        writer,
        |w, byte_len| {
            write_string_size(w, byte_len)?;
            codec::write_padding(w, pad_bits);
            Ok(())
        },
        |w| {
            w.write_bytes(value.as_bytes());
            Ok(())
        },
    )
}

/// Decodes a wide (UTF-16LE) string; the wire prefix counts symbols.
pub fn read_wide_string(reader: &mut BitReader<'_>) -> Result<String> {
    read_wide_string_aligned(reader, 0)
}

/// Decodes a wide string with `pad_bits` of padding after the size prefix.
pub fn read_wide_string_aligned(reader: &mut BitReader<'_>, pad_bits: usize) -> Result<String> {
    debug_assert!(pad_bits < 8, "pad must be 0..=7");
    let symbols = read_string_size(reader)?;
    codec::read_padding(reader, pad_bits)?;
    let offset = reader.position();
    // The prefix counts symbols; the region it delimits spans twice as many bytes.
    codec::read_sized_bytes(reader, symbols * 2, |region| {
        let mut units = Vec::with_capacity(symbols);
        for _ in 0..symbols {
            units.push(region.read_uint(16, Endian::Little)? as u16);
        }
        String::from_utf16(&units).map_err(|_| CodecError::InvalidFormat {
            offset,
            what: "wide string",
            reason: "invalid UTF-16 sequence".into(),
        })
    })
}

/// Encodes a wide (UTF-16LE) string.
pub fn write_wide_string(writer: &mut BitWriter, value: &str) -> Result<()> {
    write_wide_string_aligned(writer, value, 0)
}

/// Encodes a wide string with `pad_bits` of padding after the size prefix.
pub fn write_wide_string_aligned(
    writer: &mut BitWriter,
    value: &str,
    pad_bits: usize,
) -> Result<()> {
    debug_assert!(pad_bits < 8, "pad must be 0..=7");
    codec::write_sized_bytes(
        writer,
        |w, byte_len| {
            write_string_size(w, byte_len / 2)?;
            codec::write_padding(w, pad_bits);
            Ok(())
        },
        |w| {
            for unit in value.encode_utf16() {
                w.write_uint(unit as u32, 16, Endian::Little)?;
            }
            Ok(())
        },
    )
}
