use repscore_core::{Platform, StorageError};
use thiserror::Error;

/// Failure of a single review source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{platform} API returned status {status}")]
    Status { platform: Platform, status: u16 },

    #[error("{platform} authentication failed: {reason}")]
    Auth { platform: Platform, reason: String },

    #[error("{platform} response parse error: {reason}")]
    Parse { platform: Platform, reason: String },
}

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("no reviews provided for analysis")]
    NoReviews,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
