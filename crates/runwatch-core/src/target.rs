//! Log stream a session is bound to.

/// Record shape a session decodes, fixed when the session is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Pipeline run, with phase and input-gate semantics.
    Run { run_name: String },
    /// General administration operation.
    Admin,
}

/// Target identity of a streaming session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTarget {
    /// Path relative to the server base URL.
    pub path: String,
    pub scope: Scope,
}

impl SessionTarget {
    /// Follow the logs of a pipeline run.
    #[must_use]
    pub fn run(run_name: impl Into<String>) -> Self {
        let run_name = run_name.into();
        Self {
            path: format!("api/ws/log/run/{run_name}"),
            scope: Scope::Run { run_name },
        }
    }

    /// Follow the audit log of an admin operation.
    #[must_use]
    pub fn admin_audit(audit_id: &str) -> Self {
        Self {
            path: format!("api/ws/log/audit/admin/{audit_id}"),
            scope: Scope::Admin,
        }
    }
}
