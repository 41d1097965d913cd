//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, GeneratedImage, ImageRequest, LlmError};

/// Stateless generation client - each call is independent
///
/// Both the blueprint run and every image unit receive the client by
/// injection, so tests substitute a scripted implementation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single text completion request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Generate one image; the first inline payload of the response wins
    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, LlmError>;
}
