//! Generation client module
//!
//! Provides the text and image generation requests used by the blueprint run
//! and the image units.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod types;

pub use client::LlmClient;
pub use error::{ErrorKind, LlmError};
pub use gemini::GeminiClient;
pub use types::{
    CompletionRequest, CompletionResponse, GeneratedImage, ImageRequest, Message, Role, TokenUsage,
};

use crate::config::LlmConfig;

/// Create a generation client based on the provider specified in config
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, "create_client: called");
    Ok(Arc::new(GeminiClient::from_config(config)?))
}
