//! Transport layer for log streaming sessions.
//!
//! Provides:
//! - Frame decoding into run or admin log records
//! - WebSocket client with heartbeat
//! - Console output sink (feature: console)

pub mod protocol;
pub mod websocket;

#[cfg(feature = "console")]
pub mod console;

pub use protocol::{DecodeError, Frame, decode};
pub use websocket::{ConnectOptions, FrameSource, TransportError, WsConnection, connect};

#[cfg(feature = "console")]
pub use console::ConsoleSink;
