//! # netpulse
//!
//! Core of a UDP application-level transport: a bit-packed message codec
//! and the per-connection keep-alive / clock-synchronization engine.
//!
//! ## Architecture
//!
//! - **Codec**: [`MessageBuffer`] reads and writes integers of arbitrary
//!   bit widths, varints, floats, strings, endpoints, and quantized
//!   values over an LSB-first, little-endian bit stream. The encodings
//!   are a wire contract: independent implementations must interoperate
//!   byte for byte.
//! - **Keep-alive**: [`LatencyTracker`] runs the ping/pong exchange that
//!   drives timeout deadlines, the RTT average, and remote clock
//!   translation; [`Connection`] fans the results out to sender channels
//!   and the host.
//! - **Memory**: [`ArrayPool`] recycles the short-lived byte buffers the
//!   transport churns through.

pub mod bits;
pub mod buffer;
pub mod config;
pub mod connection;
pub mod error;
pub mod incoming;
pub mod latency;
pub mod pool;
pub mod time;

pub use buffer::{MessageBuffer, bits_to_hold_u32, bits_to_hold_u64};
pub use config::PeerConfig;
pub use connection::{Connection, ReliableSenderChannel, SenderChannel, UnreliableSenderChannel};
pub use error::{CodecError, Result};
pub use incoming::{
    ConnectionId, DeliveryMethod, IncomingKind, IncomingMessage, WireMessageType,
};
pub use latency::{LatencyTracker, Ping, Pong, PongOutcome};
pub use pool::ArrayPool;
pub use time::{ManualClock, NetworkClock, SystemClock};
