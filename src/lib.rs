//! # Auraxis
//!
//! Server core for the PlanetSide wire protocol:
//! - Bit-exact decode/encode of the client's bit-packed packet format
//! - Packet framing flags and the game/control/crypto opcode families
//! - Startup-built opcode registry for dispatch
//!
//! ## Components
//!
//! - `auraxis-protocol`: bit-stream primitives, codec traits, string and
//!   enumeration atoms, packet families, framing and dispatch
//! - `auraxis-protocol-derive`: field-by-field `Decode`/`Encode` derives
//!
//! ## Example
//!
//! See the `demos/` directory for a runnable walkthrough.

pub use auraxis_protocol as protocol;
