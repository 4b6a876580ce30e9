//! Error types for the tokenizer module

use std::io;
use thiserror::Error;

/// Result type for tokenizer operations
pub type TokenizerResult<T> = Result<T, TokenizerError>;

/// Errors that can occur during tokenization
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Error from API call
    #[error("API error: {0}")]
    Api(String),

    /// Error from tokenizer library
    #[error("Tokenizer error: {0}")]
    Backend(String),

    /// Required environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVar(String),

    /// Cache operation error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Failed to acquire lock on cache
    #[error("Failed to acquire lock on cache")]
    CacheLock,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request error
    #[error("Request error: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TokenizerError {
    fn from(error: reqwest::Error) -> Self {
        TokenizerError::Request(error.to_string())
    }
}
