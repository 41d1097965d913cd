//! LLM error types

use thiserror::Error;

/// Errors that can occur during generation requests
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API credential not found. Set the {env} environment variable.")]
    MissingCredential { env: String },

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image payload decode failed: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("No image generated")]
    NoImagePayload,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Coarse failure classes
///
/// Every error collapses into one of these before it reaches the UI, which in
/// turn shows a single generic failure indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingCredential,
    EmptyResponse,
    TransportFailure,
    NoImagePayload,
}

impl LlmError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LlmError::MissingCredential { .. } => ErrorKind::MissingCredential,
            LlmError::EmptyResponse => ErrorKind::EmptyResponse,
            LlmError::NoImagePayload | LlmError::Decode(_) => ErrorKind::NoImagePayload,
            LlmError::ApiError { .. } | LlmError::Network(_) | LlmError::Json(_) | LlmError::InvalidResponse(_) => {
                ErrorKind::TransportFailure
            }
        }
    }
}
