//! Human-input coordinator for manual pipeline gates.
//!
//! When a run reports that it is waiting for input, the coordinator checks
//! that the request is still current, resolves an answer from the batch
//! queue or the operator, and submits it before streaming resumes.

use std::sync::Arc;

use async_trait::async_trait;
use runwatch_core::{ApiError, InputSubmission, LogSink, PendingInput, RunApi, Severity};
use thiserror::Error;

use crate::{
    batch::BatchQueue,
    prompt::{OperatorPrompt, PromptError},
};

const PROMPT_SINGLE: &str = "# please input option";
const PROMPT_MULTIPLE: &str = "# please input options (support multiple options, example: opt1,opt2)";

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    /// No input request in progress.
    Streaming,
    AwaitingStatus,
    AwaitingSpec,
    AwaitingAnswer,
    Submitting,
    /// A side call or the prompt failed; the session must end.
    Failed,
}

/// Where a submitted answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    Batch,
    Operator,
}

/// Outcome of an input request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An answer was submitted.
    Submitted {
        phase_id: String,
        input_value: String,
        source: AnswerSource,
    },
    /// The run already finished; the request is stale.
    RunFinished,
    /// The pending gate belongs to another phase.
    PhaseMismatch { requested: String, pending: String },
}

impl Resolution {
    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}

/// Input resolution error.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// Handler for input-requested records.
#[async_trait]
pub trait InputGate: Send {
    /// Resolve the input request raised at `phase_id`.
    ///
    /// Returns once streaming may resume.
    async fn on_input_requested(
        &mut self,
        phase_id: &str,
        sink: &mut dyn LogSink,
    ) -> Result<Resolution, InputError>;
}

/// Resolves input requests of one run.
pub struct InputCoordinator {
    api: Arc<dyn RunApi>,
    run_name: String,
    batch: BatchQueue,
    prompt: Box<dyn OperatorPrompt>,
    state: InputState,
}

impl InputCoordinator {
    /// Create a coordinator for `run_name`.
    #[must_use]
    pub fn new(
        api: Arc<dyn RunApi>,
        run_name: impl Into<String>,
        batch: BatchQueue,
        prompt: Box<dyn OperatorPrompt>,
    ) -> Self {
        Self {
            api,
            run_name: run_name.into(),
            batch,
            prompt,
            state: InputState::Streaming,
        }
    }

    #[must_use]
    pub const fn state(&self) -> InputState {
        self.state
    }

    /// Answers not yet consumed.
    #[must_use]
    pub const fn batch(&self) -> &BatchQueue {
        &self.batch
    }

    /// Resolve the input request raised at `phase_id`.
    ///
    /// # Errors
    /// Returns error if a side call fails or operator input is closed.
    pub async fn resolve(
        &mut self,
        phase_id: &str,
        sink: &mut dyn LogSink,
    ) -> Result<Resolution, InputError> {
        let result = self.run_gate(phase_id, sink).await;
        let next = if result.is_ok() {
            InputState::Streaming
        } else {
            InputState::Failed
        };
        self.transition(next);
        result
    }

    fn transition(&mut self, next: InputState) {
        tracing::debug!(run = %self.run_name, from = ?self.state, to = ?next, "Input state");
        self.state = next;
    }

    async fn run_gate(
        &mut self,
        phase_id: &str,
        sink: &mut dyn LogSink,
    ) -> Result<Resolution, InputError> {
        self.transition(InputState::AwaitingStatus);
        let run = self.api.get_run(&self.run_name).await?;
        if run.run_name.is_empty() {
            return Err(ApiError::RunNotFound(self.run_name.clone()).into());
        }
        if run.is_finished() {
            tracing::debug!(run = %self.run_name, phase_id, "Run already finished, skipping input");
            return Ok(Resolution::RunFinished);
        }

        self.transition(InputState::AwaitingSpec);
        let pending = self.api.get_pending_input(&self.run_name).await?;
        if pending.phase_id != phase_id {
            tracing::debug!(
                run = %self.run_name,
                requested = phase_id,
                pending = %pending.phase_id,
                "Input request superseded"
            );
            return Ok(Resolution::PhaseMismatch {
                requested: phase_id.to_string(),
                pending: pending.phase_id,
            });
        }

        self.transition(InputState::AwaitingAnswer);
        sink.notice(
            Severity::Warning,
            &format!("# {}, {}", pending.title, pending.desc),
        );
        sink.notice(
            Severity::Warning,
            &format!("# options: {}", pending.legal_options().join(",")),
        );
        let (input_value, source) = self.answer(&pending, sink).await?;

        self.transition(InputState::Submitting);
        let submission = InputSubmission {
            phase_id: pending.phase_id,
            input_value,
        };
        self.api.submit_input(&self.run_name, &submission).await?;
        tracing::info!(
            run = %self.run_name,
            phase_id = %submission.phase_id,
            ?source,
            "Input submitted"
        );

        Ok(Resolution::Submitted {
            phase_id: submission.phase_id,
            input_value: submission.input_value,
            source,
        })
    }

    /// Take the next batch answer or ask the operator until a non-empty line is entered.
    ///
    /// Batch answers are used verbatim, without checking them against the legal options.
    async fn answer(
        &mut self,
        pending: &PendingInput,
        sink: &mut dyn LogSink,
    ) -> Result<(String, AnswerSource), PromptError> {
        if let Some(value) = self.batch.next_answer() {
            if !value.is_empty() {
                sink.notice(
                    Severity::Warning,
                    &format!("# input value automatically: {value}"),
                );
                return Ok((value, AnswerSource::Batch));
            }
        }

        let hint = if pending.is_multiple {
            PROMPT_MULTIPLE
        } else {
            PROMPT_SINGLE
        };
        loop {
            sink.notice(Severity::Warning, hint);
            let line = self.prompt.read_line().await?;
            let value = line.trim();
            if !value.is_empty() {
                return Ok((value.to_string(), AnswerSource::Operator));
            }
        }
    }
}

#[async_trait]
impl InputGate for InputCoordinator {
    async fn on_input_requested(
        &mut self,
        phase_id: &str,
        sink: &mut dyn LogSink,
    ) -> Result<Resolution, InputError> {
        self.resolve(phase_id, sink).await
    }
}
