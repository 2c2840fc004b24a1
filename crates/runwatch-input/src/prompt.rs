//! Operator answer entry.

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

/// Prompt error.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Operator input closed")]
    Closed,
    #[error("Failed to read operator input: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of operator answers.
///
/// Implement this trait to plug in another input UI.
#[async_trait]
pub trait OperatorPrompt: Send {
    /// Block until the operator enters one line.
    ///
    /// The returned line is untrimmed.
    async fn read_line(&mut self) -> Result<String, PromptError>;
}

/// Prompt reading lines from a buffered reader.
pub struct LinePrompt<R> {
    reader: R,
}

/// Prompt reading from standard input.
pub type StdinPrompt = LinePrompt<BufReader<Stdin>>;

impl<R> LinePrompt<R> {
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl StdinPrompt {
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R> OperatorPrompt for LinePrompt<R>
where
    R: AsyncBufRead + Send + Unpin,
{
    async fn read_line(&mut self) -> Result<String, PromptError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(PromptError::Closed);
        }
        Ok(line)
    }
}
