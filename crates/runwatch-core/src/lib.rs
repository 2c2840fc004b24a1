//! Core types for streaming pipeline run and admin logs.
//!
//! This crate provides the fundamental building blocks:
//! - `LogRecord` - Run-scoped or admin-scoped log record
//! - `PendingInput` - Descriptor of a manual input gate, plus the option policy
//! - `SessionTarget` - Which log stream a session follows
//! - `RunApi` and `LogSink` traits

pub mod input;
pub mod record;
pub mod target;
pub mod traits;

pub use input::{InputOption, InputSubmission, PendingInput, RunStatus, RunSummary, legal_options};
pub use record::{AdminLog, AdminLogType, LogRecord, RunLog, RunLogType, Severity};
pub use target::{Scope, SessionTarget};
pub use traits::{ApiError, LogSink, RunApi};
