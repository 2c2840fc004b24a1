//! Core traits for the request/response API and log output.

use async_trait::async_trait;
use thiserror::Error;

use crate::{InputSubmission, LogRecord, PendingInput, RunSummary, Severity};

/// Request/response API error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("{method} {url} [{status}] {msg}")]
    Status {
        method: String,
        url: String,
        status: String,
        msg: String,
    },
    #[error("Response decode error: {0}")]
    Decode(String),
    #[error("runName {0} not exists")]
    RunNotFound(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// Synchronous side calls made while a run session is streaming.
#[async_trait]
pub trait RunApi: Send + Sync {
    /// Fetch the current status of a run.
    async fn get_run(&self, run_name: &str) -> Result<RunSummary, ApiError>;

    /// Fetch the input gate the run is currently waiting on.
    async fn get_pending_input(&self, run_name: &str) -> Result<PendingInput, ApiError>;

    /// Submit the answer for an input gate.
    async fn submit_input(
        &self,
        run_name: &str,
        submission: &InputSubmission,
    ) -> Result<(), ApiError>;
}

/// Presentation of records and operator notices.
///
/// Implementations swallow their own write errors.
pub trait LogSink: Send {
    /// Render one decoded record.
    fn render(&mut self, record: &LogRecord);

    /// Render a locally generated message on the given channel.
    fn notice(&mut self, severity: Severity, msg: &str);
}
