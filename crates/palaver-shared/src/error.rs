use std::time::Duration;

use thiserror::Error;

/// Conditions the caller is expected to show to the user.
///
/// Missing chatrooms and persistence failures are not represented: reads
/// on an unknown room return empty results and storage errors are swallowed
/// by the mirror.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Validation rejected: {0}")]
    ValidationRejected(String),

    #[error("Rate limited: retry in {} ms", retry_after.as_millis())]
    RateLimited { retry_after: Duration },

    #[error("History unavailable: {0}")]
    HistoryUnavailable(String),
}

impl ChatError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::ValidationRejected(reason.into())
    }

    /// Whether retrying the same call later can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::HistoryUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
