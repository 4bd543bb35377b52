// crates/classroom-lib/src/error.rs

//! Central error type.
//!
//! Per the failure model, nothing here is fatal to a session: a failed relay
//! send or a dropped message degrades to a stale UI, and only room-code
//! validation surfaces an error to the caller.
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid class code")]
    InvalidRoomCode,

    #[error("Context closed: {0}")]
    ContextClosed(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for AppError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        AppError::ContextClosed("Failed to send command".to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
