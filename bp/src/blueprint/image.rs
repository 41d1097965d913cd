//! Image generation unit
//!
//! One unit per visual prompt. The unit is a small state machine:
//!
//! ```text
//! Waiting --(first time visible)--> Loading --> Success(image)
//!                                          \--> Error --(manual retry)--> Loading
//! ```
//!
//! The unit never performs I/O itself. Transitions that need a request hand
//! back an [`ImageJob`]; the owner runs it and feeds the outcome to
//! [`ImageUnit::complete`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::llm::{GeneratedImage, ImageRequest, LlmClient, LlmError};
use crate::prompts::styled_image_prompt;

/// Lifecycle phase of one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePhase {
    /// Not requested yet
    Waiting,
    /// Request in flight
    Loading,
    /// Image received
    Success(Arc<GeneratedImage>),
    /// Request failed; only a manual retry leaves this phase
    Error,
}

impl ImagePhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Loading => "loading",
            Self::Success(_) => "success",
            Self::Error => "error",
        }
    }
}

/// A single image request, ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    pub request: ImageRequest,
}

impl ImageJob {
    /// Perform the one generation call
    pub async fn execute(self, client: &dyn LlmClient) -> Result<GeneratedImage, LlmError> {
        debug!(prompt_len = self.request.prompt.len(), "ImageJob::execute: called");
        client.generate_image(self.request).await
    }
}

/// State machine for one visual prompt
#[derive(Debug, Clone)]
pub struct ImageUnit {
    prompt: String,
    phase: ImagePhase,
    attempted: bool,
    visible: bool,
}

impl ImageUnit {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            phase: ImagePhase::Waiting,
            attempted: false,
            visible: false,
        }
    }

    /// The visual prompt as written by the model
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn phase(&self) -> &ImagePhase {
        &self.phase
    }

    pub fn attempted(&self) -> bool {
        self.attempted
    }

    pub fn image(&self) -> Option<&Arc<GeneratedImage>> {
        match &self.phase {
            ImagePhase::Success(image) => Some(image),
            _ => None,
        }
    }

    fn job(&self) -> ImageJob {
        ImageJob {
            request: ImageRequest {
                prompt: styled_image_prompt(&self.prompt),
            },
        }
    }

    /// Apply a visibility change
    ///
    /// Returns a job only on a not-visible to visible edge, and only if the
    /// unit has never been attempted and holds no image.
    pub fn on_visibility(&mut self, visible: bool) -> Option<ImageJob> {
        let became_visible = visible && !self.visible;
        self.visible = visible;
        if !became_visible || self.attempted || self.phase != ImagePhase::Waiting {
            return None;
        }

        debug!(prompt = %self.prompt, "ImageUnit::on_visibility: became visible, starting generation");
        self.phase = ImagePhase::Loading;
        Some(self.job())
    }

    /// Manual retry after a failure
    ///
    /// Goes straight to Loading without waiting on a visibility edge.
    pub fn retry(&mut self) -> Option<ImageJob> {
        if self.phase != ImagePhase::Error {
            debug!(phase = self.phase.name(), "ImageUnit::retry: not in error, ignoring");
            return None;
        }

        info!(prompt = %self.prompt, "Retrying image generation");
        self.attempted = false;
        self.phase = ImagePhase::Loading;
        Some(self.job())
    }

    /// Record the outcome of a job
    ///
    /// Outcomes arriving while not Loading are ignored.
    pub fn complete(&mut self, outcome: Result<GeneratedImage, LlmError>) {
        if self.phase != ImagePhase::Loading {
            debug!(phase = self.phase.name(), "ImageUnit::complete: not loading, dropping outcome");
            return;
        }

        self.attempted = true;
        match outcome {
            Ok(image) => {
                debug!(bytes = image.bytes.len(), "ImageUnit::complete: success");
                self.phase = ImagePhase::Success(Arc::new(image));
            }
            Err(e) => {
                warn!(prompt = %self.prompt, error = %e, kind = ?e.kind(), "Image generation failed");
                self.phase = ImagePhase::Error;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;

    #[test]
    fn test_initial_state() {
        let unit = ImageUnit::new("a cat");
        assert_eq!(unit.phase(), &ImagePhase::Waiting);
        assert!(!unit.attempted());
        assert!(unit.image().is_none());
    }

    #[test]
    fn test_fires_once_on_visible_edge() {
        let mut unit = ImageUnit::new("a cat");
        assert!(unit.on_visibility(false).is_none());

        let job = unit.on_visibility(true).expect("first visible edge fires");
        assert!(job.request.prompt.ends_with(": a cat"));
        assert_eq!(unit.phase(), &ImagePhase::Loading);

        // Staying visible, or toggling while loading, never fires again
        assert!(unit.on_visibility(true).is_none());
        assert!(unit.on_visibility(false).is_none());
        assert!(unit.on_visibility(true).is_none());
    }

    #[tokio::test]
    async fn test_failure_never_auto_retries() {
        let client = MockLlmClient::new()
            .with_image_error(LlmError::NoImagePayload)
            .with_image(b"png");
        let mut unit = ImageUnit::new("a cat");

        let job = unit.on_visibility(true).unwrap();
        unit.complete(job.execute(&client).await);
        assert_eq!(unit.phase(), &ImagePhase::Error);
        assert!(unit.attempted());

        // Leaving and returning to the tab does not re-fire
        assert!(unit.on_visibility(false).is_none());
        assert!(unit.on_visibility(true).is_none());
        assert_eq!(client.image_calls(), 1);

        // Manual retry goes straight to Loading
        let job = unit.retry().expect("retry from error");
        assert_eq!(unit.phase(), &ImagePhase::Loading);
        assert!(!unit.attempted());
        unit.complete(job.execute(&client).await);

        assert_eq!(unit.image().map(|i| i.bytes.clone()), Some(b"png".to_vec()));
        assert_eq!(client.image_calls(), 2);
    }

    #[tokio::test]
    async fn test_retry_can_fail_again() {
        let client = MockLlmClient::new()
            .with_image_error(LlmError::EmptyResponse)
            .with_image_error(LlmError::NoImagePayload);
        let mut unit = ImageUnit::new("a cat");

        let job = unit.on_visibility(true).unwrap();
        unit.complete(job.execute(&client).await);
        let job = unit.retry().unwrap();
        unit.complete(job.execute(&client).await);
        assert_eq!(unit.phase(), &ImagePhase::Error);
        assert!(unit.retry().is_some());
    }

    #[test]
    fn test_no_retry_outside_error() {
        let mut unit = ImageUnit::new("a cat");
        assert!(unit.retry().is_none());

        unit.on_visibility(true);
        assert!(unit.retry().is_none());

        unit.complete(Ok(GeneratedImage::png(vec![1])));
        assert!(unit.retry().is_none());
        assert!(unit.on_visibility(false).is_none());
        assert!(unit.on_visibility(true).is_none());
    }

    #[test]
    fn test_outcome_ignored_when_not_loading() {
        let mut unit = ImageUnit::new("a cat");
        unit.complete(Ok(GeneratedImage::png(vec![1])));
        assert_eq!(unit.phase(), &ImagePhase::Waiting);
        assert!(!unit.attempted());
    }
}
