//! meetsync - Sync Fireflies meeting transcripts into a Supabase-backed RAG store
//!
//! One pipeline: fetch transcript, convert to Markdown, chunk, embed, persist.

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod fireflies;
pub mod markdown;
pub mod pipeline;
pub mod storage;

use thiserror::Error;

/// Main error type for meetsync
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fireflies API error: {0}")]
    Fireflies(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Meeting {0} already ingested")]
    AlreadyIngested(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl SyncError {
    /// Transient failures are worth retrying: network hiccups, upstream
    /// timeouts, rate limits.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Embedding(_) | Self::Storage(_) | Self::Fireflies(_)
        )
    }

    /// Fatal failures should stop the whole run rather than a single
    /// transcript: bad credentials, broken tokenizer, unusable config.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Tokenizer(_))
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "meetsync";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_and_fatal_are_disjoint() {
        let errors = [
            SyncError::Config("x".into()),
            SyncError::Fireflies("x".into()),
            SyncError::Embedding("x".into()),
            SyncError::Storage("x".into()),
            SyncError::Tokenizer("x".into()),
            SyncError::AlreadyIngested("x".into()),
            SyncError::NotFound("x".into()),
            SyncError::Other("x".into()),
        ];

        for err in errors {
            assert!(
                !(err.is_transient() && err.is_fatal()),
                "{err} classified as both transient and fatal"
            );
        }
    }

    #[test]
    fn already_ingested_is_neither_transient_nor_fatal() {
        let err = SyncError::AlreadyIngested("abc".into());
        assert!(!err.is_transient());
        assert!(!err.is_fatal());
    }
}
