use thiserror::Error;

use crate::packets::PacketFamily;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Failure of a single decode or encode step.
///
/// Every variant carries the bit offset at which the failure occurred so a
/// session layer can report exactly where a frame went bad. Decode failures
/// are always recoverable values; nothing here aborts or logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("end of stream at bit {offset}: needed {needed} more bits, {remaining} available")]
    EndOfStream {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("constant mismatch at bit {offset}: expected {expected:#x}, got {actual:#x}")]
    ConstantMismatch {
        offset: usize,
        expected: u32,
        actual: u32,
    },

    #[error("Expected {name} with ID between [{first}, {last}], but got {value} at bit {offset}")]
    EnumOutOfRange {
        name: &'static str,
        first: u32,
        last: u32,
        value: u32,
        offset: usize,
    },

    #[error("value {value} does not fit in {width} bits at bit {offset}")]
    ValueOutOfRange { offset: usize, value: u32, width: u32 },

    #[error("size mismatch at bit {offset}: declared {declared} bits, consumed {consumed} bits")]
    SizeMismatch {
        offset: usize,
        declared: usize,
        consumed: usize,
    },

    #[error("unknown {family} opcode {opcode:#04x} at offset {offset}")]
    UnknownOpcode {
        family: PacketFamily,
        opcode: u8,
        offset: usize,
    },

    #[error("invalid {what} at bit {offset}: {reason}")]
    InvalidFormat {
        offset: usize,
        what: &'static str,
        reason: String,
    },
}

/// Startup-time configuration failure of the opcode registry.
///
/// Registration happens once, before any traffic; a duplicate opcode is a
/// programming error the process should refuse to start over.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate {family} opcode registration: {opcode:#04x}")]
    Duplicate { family: PacketFamily, opcode: u8 },
}
