//! # Auraxis Protocol
//!
//! Core wire-protocol definitions for the Auraxis server.
//!
//! This crate provides:
//! - `BitReader`/`BitWriter`: bit-granular cursors over byte buffers
//! - `Decode`/`Encode`: the codec trait pair every wire type implements,
//!   with derive macros for packets whose fields all have intrinsic widths
//! - `PacketFlags`: the 8-bit preamble framing every packet
//! - Length-prefixed string codecs (narrow, wide, and byte-realigned forms)
//! - The game, control, and crypto packet families with their opcode tables
//! - `PacketRegistry`: the startup-built opcode dispatch tables
//! - Object-creation constructor payloads, self-delimited by exact bit size
//!
//! The codec layer is purely functional: registries and codecs are immutable
//! once built, all cursor state is caller-owned, and every failure is a
//! recoverable [`CodecError`] carrying the bit offset where it happened. The
//! format must stay bit-exact in both directions against an unmodifiable
//! client, so encoders reproduce every reserved constant verbatim and tests
//! pin golden byte vectors.
//!
//! ## Example
//!
//! ```
//! use auraxis_protocol::packets::game::{GamePacket, KeepAliveMessage};
//! use auraxis_protocol::{decode_packet, encode_packet, Packet, PacketRegistry};
//!
//! let registry = PacketRegistry::with_defaults();
//! let packet = Packet::game(GamePacket::KeepAlive(KeepAliveMessage { code: 0 }));
//!
//! let bytes = encode_packet(&packet).unwrap();
//! assert_eq!(&bytes[..], &[0x42, 0x1A, 0x00, 0x00]);
//!
//! let decoded = decode_packet(&registry, &bytes).unwrap();
//! assert_eq!(decoded, packet);
//! ```

// Lets the derive macros refer to this crate by its external name.
extern crate self as auraxis_protocol;

pub mod bits;
pub mod codec;
pub mod error;
pub mod header;
pub mod objects;
pub mod packets;
pub mod registry;
pub mod strings;

pub use bits::{BitReader, BitWriter, Endian};
pub use codec::{Decode, Encode, Guid, SizeHint};
pub use error::{CodecError, RegistryError, Result};
pub use header::{PacketFlags, PacketType};
pub use packets::{decode_packet, encode_packet, Packet, PacketBody, PacketFamily};
pub use registry::PacketRegistry;
