//! Manual input gates and run status.

use serde::{Deserialize, Serialize};

/// Implicit option accepting a gate that advertises no options.
pub const INPUT_VALUE_CONFIRM: &str = "confirm";

/// Implicit option aborting the run, always offered.
pub const INPUT_VALUE_ABORT: &str = "abort";

/// One advertised option of an input gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputOption {
    #[serde(default)]
    pub name: String,
    pub value: String,
}

/// Full descriptor of the input gate a run is waiting on.
///
/// Fetched on demand; the log stream only carries the phase identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PendingInput {
    #[serde(rename = "phaseID", default)]
    pub phase_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "isMultiple", default)]
    pub is_multiple: bool,
    #[serde(default)]
    pub options: Vec<InputOption>,
}

impl PendingInput {
    /// Options the operator may choose from, see [`legal_options`].
    #[must_use]
    pub fn legal_options(&self) -> Vec<String> {
        legal_options(&self.options)
    }
}

/// Compute the option set offered to the operator.
///
/// Advertised values keep their order and `abort` is appended. A gate with
/// no advertised options offers `confirm` and `abort`.
#[must_use]
pub fn legal_options(advertised: &[InputOption]) -> Vec<String> {
    let mut opts: Vec<String> = advertised.iter().map(|opt| opt.value.clone()).collect();
    if opts.is_empty() {
        opts.push(INPUT_VALUE_CONFIRM.to_string());
    }
    opts.push(INPUT_VALUE_ABORT.to_string());
    opts
}

/// Answer submitted for an input gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSubmission {
    #[serde(rename = "phaseID")]
    pub phase_id: String,
    #[serde(rename = "inputValue")]
    pub input_value: String,
}

/// Execution status of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunStatus {
    #[serde(default)]
    pub result: String,
    #[serde(rename = "startTime", default)]
    pub start_time: String,
    /// Set once the run has completed.
    #[serde(default)]
    pub duration: String,
}

/// Run as reported by the run status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(rename = "runName", default)]
    pub run_name: String,
    #[serde(default)]
    pub status: RunStatus,
}

impl RunSummary {
    /// Whether the run already carries a duration marker.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !self.status.duration.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(value: &str) -> InputOption {
        InputOption {
            name: value.to_uppercase(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_legal_options_without_advertised() {
        assert_eq!(legal_options(&[]), vec!["confirm", "abort"]);
    }

    #[test]
    fn test_legal_options_appends_abort() {
        let opts = legal_options(&[opt("staging"), opt("prod")]);
        assert_eq!(opts, vec!["staging", "prod", "abort"]);
    }

    #[test]
    fn test_pending_input_wire_names() {
        let input: PendingInput = serde_json::from_str(
            r#"{"phaseID":"p9","title":"Deploy","desc":"pick env","isMultiple":true,
                "options":[{"name":"Staging","value":"staging"}]}"#,
        )
        .unwrap();
        assert_eq!(input.phase_id, "p9");
        assert!(input.is_multiple);
        assert_eq!(input.legal_options(), vec!["staging", "abort"]);
    }

    #[test]
    fn test_run_finished_by_duration() {
        let mut run: RunSummary =
            serde_json::from_str(r#"{"runName":"demo-1","status":{"result":"RUNNING"}}"#).unwrap();
        assert!(!run.is_finished());
        run.status.duration = "1m3s".to_string();
        assert!(run.is_finished());
    }

    #[test]
    fn test_submission_wire_names() {
        let body = serde_json::to_value(InputSubmission {
            phase_id: "p1".to_string(),
            input_value: "approve".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"phaseID": "p1", "inputValue": "approve"}));
    }
}
