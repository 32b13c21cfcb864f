//! Error types for the collaborator seams.
//!
//! Each fallible stage returns its own error kind; the analysis engine
//! decides at one site how a failure degrades the result.

use thiserror::Error;

/// Fatal configuration problem detected at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("brand keyword list must contain at least one non-empty keyword")]
    EmptyKeywordSet,

    #[error("invalid brand keyword {keyword:?}: {source}")]
    InvalidKeyword {
        keyword: String,
        #[source]
        source: regex::Error,
    },
}

/// Alert or message persistence failure
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Warning-message delivery failure
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("failed to encode warning payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to publish warning: {0}")]
    Publish(#[from] async_nats::PublishError),

    #[error("warning delivery failed: {0}")]
    Delivery(String),
}

/// Text extraction failure reported by the OCR collaborator
#[derive(Debug, Error)]
#[error("text extraction failed: {0}")]
pub struct OcrError(pub String);
