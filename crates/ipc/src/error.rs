//! Errors raised while encoding or decoding protocol messages.

/// Protocol-level failures.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("Failed to (de)serialize message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    #[error("Axis index {0} is out of range (expected 0..=2)")]
    InvalidAxis(usize),
}
