//! Decode failures for composite answer payloads.

/// Failure to decode a stored composite answer.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The stored text was not valid JSON.
    #[error("composite answer is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
