//! Operator input resolution for manual pipeline gates.
//!
//! Provides:
//! - `BatchQueue` - Pre-supplied answers for unattended runs
//! - `OperatorPrompt` trait with a line-reader implementation
//! - `InputCoordinator` - State machine resolving input requests

pub mod batch;
pub mod coordinator;
pub mod prompt;

pub use batch::BatchQueue;
pub use coordinator::{AnswerSource, InputCoordinator, InputError, InputGate, InputState, Resolution};
pub use prompt::{LinePrompt, OperatorPrompt, PromptError, StdinPrompt};
