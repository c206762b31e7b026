use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] crisp_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid filter '{0}' (expected key=value)")]
    InvalidFilter(String),
    #[error("Invalid JSON payload: {0}")]
    InvalidPayload(String),
    #[error("Record ID cannot be empty")]
    EmptyRecordId,
    #[error("Record not found for id/prefix: {0}")]
    RecordNotFound(String),
    #[error("{0}")]
    AmbiguousRecordId(String),
    #[error("Poll interval must be greater than zero")]
    ZeroInterval,
    #[error("Bulk delete failed for {failed} of {total} records")]
    BulkDeleteFailed { failed: usize, total: usize },
}
