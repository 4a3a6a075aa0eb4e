//! Error types for the core library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Decode(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    /// Shorthand for the error returned when a task id is unknown.
    pub fn task_not_found(id: &str) -> Self {
        Self::NotFound(format!("task not found: {}", id))
    }

    /// Prefix the message with `context` while keeping the error kind.
    ///
    /// Serialization, cancellation and deadline errors are kind-only and pass
    /// through unchanged.
    pub fn context(self, context: impl std::fmt::Display) -> Self {
        match self {
            Self::Validation(msg) => Self::Validation(format!("{}: {}", context, msg)),
            Self::NotFound(msg) => Self::NotFound(format!("{}: {}", context, msg)),
            Self::AlreadyExists(msg) => Self::AlreadyExists(format!("{}: {}", context, msg)),
            Self::Storage(msg) => Self::Storage(format!("{}: {}", context, msg)),
            Self::Decode(msg) => Self::Decode(format!("{}: {}", context, msg)),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_kind_and_prefixes_message() {
        let err = Error::task_not_found("abc").context("failed to get task");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "failed to get task: task not found: abc");
    }

    #[test]
    fn context_leaves_cancellation_untouched() {
        let err = Error::Cancelled.context("failed to list tasks");
        assert!(matches!(err, Error::Cancelled));
    }
}
