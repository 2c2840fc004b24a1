//! Session orchestration for log streaming.
//!
//! Provides:
//! - `SessionDriver` - Read, decode, render and resolve input requests
//! - Request/response API client (feature: http)

pub mod api;
pub mod driver;

pub use driver::{SessionDriver, SessionError, SessionReport};

#[cfg(feature = "http")]
pub use api::{HttpApiConfig, HttpRunApi};
