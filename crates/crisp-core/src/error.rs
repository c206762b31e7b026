//! Error types for crisp-core

use thiserror::Error;

/// Result type alias using crisp-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in crisp-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status; the message is extracted from
    /// the response body's `detail`/`message`/`error` fields
    #[error("{0}")]
    Api(String),

    /// Session token was rejected; local auth state has been cleared
    #[error("Session expired; sign in again")]
    SessionExpired,

    /// No stored session for an endpoint that requires one
    #[error("Not authenticated; run `crisp auth login` first")]
    NotAuthenticated,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Session persistence (keychain/keyring) error
    #[error("Session storage error: {0}")]
    SessionStorage(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
