//! Pre-supplied answers for input gates.

use std::collections::VecDeque;

/// Ordered queue of answers consumed one per resolved input request.
///
/// Answers are taken from the head and never put back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchQueue {
    answers: VecDeque<String>,
}

impl BatchQueue {
    /// Create a queue from answers in the order they will be used.
    #[must_use]
    pub fn new<I>(answers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }

    /// Take the next answer, if any remain.
    pub fn next_answer(&mut self) -> Option<String> {
        self.answers.pop_front()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}
