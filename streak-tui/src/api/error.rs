use thiserror::Error;

/// Failure of a backend call. Every variant displays as a single
/// human-readable sentence suitable for a toast.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success response, already normalized from `{detail|message}`,
    /// raw body text or the status reason.
    #[error("{0}")]
    Api(String),

    #[error("Unexpected response: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The request was superseded and aborted before it settled.
    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
