//! Log records streamed over a session.

use serde::{Deserialize, Serialize};

/// Type of a run-scoped log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunLogType {
    Info,
    Warning,
    Error,
    /// The run is paused at a phase waiting for operator input.
    Input,
    /// Any type this client does not know about, with its wire value.
    Other(String),
}

impl RunLogType {
    /// Wire label of this type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Input => "INPUT",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for RunLogType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "INFO" => Self::Info,
            "WARNING" => Self::Warning,
            "ERROR" => Self::Error,
            "INPUT" => Self::Input,
            _ => Self::Other(raw),
        }
    }
}

impl From<RunLogType> for String {
    fn from(log_type: RunLogType) -> Self {
        match log_type {
            RunLogType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Type of an admin-scoped log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AdminLogType {
    Info,
    Fail,
    Success,
    Other(String),
}

impl AdminLogType {
    /// Wire label of this type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Info => "INFO",
            Self::Fail => "FAIL",
            Self::Success => "SUCCESS",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for AdminLogType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "INFO" => Self::Info,
            "FAIL" => Self::Fail,
            "SUCCESS" => Self::Success,
            _ => Self::Other(raw),
        }
    }
}

impl From<AdminLogType> for String {
    fn from(log_type: AdminLogType) -> Self {
        match log_type {
            AdminLogType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Log record of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLog {
    #[serde(rename = "logType")]
    pub log_type: RunLogType,
    #[serde(rename = "phaseID", default)]
    pub phase_id: String,
    pub content: String,
    #[serde(rename = "createTime", default)]
    pub create_time: String,
}

/// Log record of an admin operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminLog {
    #[serde(rename = "logType")]
    pub log_type: AdminLogType,
    pub content: String,
    #[serde(rename = "endTime", default)]
    pub end_time: String,
}

/// Presentation channel of a record or notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Success,
    Debug,
}

impl Severity {
    /// Four-letter label used for locally generated notices.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERRO",
            Self::Success => "SUCC",
            Self::Debug => "DEBU",
        }
    }
}

/// A decoded log record.
///
/// The variant is fixed by the session scope; a session never yields both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LogRecord {
    Run(RunLog),
    Admin(AdminLog),
}

impl LogRecord {
    /// Presentation channel, or `None` for record types that are not rendered.
    ///
    /// Input requests are announced by the input notices instead.
    #[must_use]
    pub const fn severity(&self) -> Option<Severity> {
        match self {
            Self::Run(log) => match &log.log_type {
                RunLogType::Info => Some(Severity::Info),
                RunLogType::Warning => Some(Severity::Warning),
                RunLogType::Error => Some(Severity::Error),
                RunLogType::Input | RunLogType::Other(_) => None,
            },
            Self::Admin(log) => match &log.log_type {
                AdminLogType::Info => Some(Severity::Info),
                AdminLogType::Fail => Some(Severity::Error),
                AdminLogType::Success => Some(Severity::Success),
                AdminLogType::Other(_) => None,
            },
        }
    }

    /// Wire label of the record type.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Run(log) => log.log_type.as_str(),
            Self::Admin(log) => log.log_type.as_str(),
        }
    }

    /// Server-side timestamp: creation time for runs, end time for admin operations.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        match self {
            Self::Run(log) => &log.create_time,
            Self::Admin(log) => &log.end_time,
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Run(log) => &log.content,
            Self::Admin(log) => &log.content,
        }
    }

    /// Phase identifier of an input request, if this record is one.
    #[must_use]
    pub fn input_request(&self) -> Option<&str> {
        match self {
            Self::Run(log) if log.log_type == RunLogType::Input => Some(&log.phase_id),
            _ => None,
        }
    }
}
