//! Blueprint orchestrator
//!
//! Owns the top-level request status and the current [`BlueprintResult`].
//! A run is split in three so the UI loop can keep the network call off its
//! own task: [`Orchestrator::begin`] moves to Loading and hands back a
//! [`BlueprintJob`], the job runs anywhere, and [`Orchestrator::finish`]
//! applies the outcome.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::parser::{BlueprintResult, parse};
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message, TokenUsage};
use crate::prompts::PromptLoader;

/// Top-level request status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalysisStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// A validated, non-blank problem statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueprintRequest {
    problem: String,
}

impl BlueprintRequest {
    /// Returns `None` for blank input
    pub fn new(text: &str) -> Option<Self> {
        let problem = text.trim();
        if problem.is_empty() {
            return None;
        }
        Some(Self {
            problem: problem.to_string(),
        })
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }
}

/// The one text-generation request of a run
#[derive(Debug, Clone)]
pub struct BlueprintJob {
    pub generation: u64,
    messages: Vec<Message>,
}

impl BlueprintJob {
    /// Issue the request and parse the reply
    ///
    /// A missing or zero-length reply is an error. Whitespace is still a
    /// reply and parses to nine empty sections.
    pub async fn execute(self, client: &dyn LlmClient) -> Result<(BlueprintResult, TokenUsage), LlmError> {
        debug!(generation = self.generation, "BlueprintJob::execute: called");
        let response = client
            .complete(CompletionRequest {
                messages: self.messages,
            })
            .await?;

        let text = match response.content {
            Some(text) if !text.is_empty() => text,
            _ => return Err(LlmError::EmptyResponse),
        };
        debug!(
            text_len = text.len(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "BlueprintJob::execute: got response"
        );
        Ok((parse(&text), response.usage))
    }
}

/// Outcome of a [`BlueprintJob`]
pub type BlueprintOutcome = Result<(BlueprintResult, TokenUsage), LlmError>;

/// Drives one problem statement to a blueprint
pub struct Orchestrator {
    prompts: PromptLoader,
    status: AnalysisStatus,
    result: Option<BlueprintResult>,
    problem: Option<String>,
    error: Option<String>,
    generation: u64,
}

impl Orchestrator {
    pub fn new(prompts: PromptLoader) -> Self {
        debug!("Orchestrator::new: called");
        Self {
            prompts,
            status: AnalysisStatus::Idle,
            result: None,
            problem: None,
            error: None,
            generation: 0,
        }
    }

    pub fn status(&self) -> AnalysisStatus {
        self.status
    }

    pub fn result(&self) -> Option<&BlueprintResult> {
        self.result.as_ref()
    }

    /// The problem statement of the current (or last) run
    pub fn problem(&self) -> Option<&str> {
        self.problem.as_deref()
    }

    /// Message of the last failure, if the status is Error
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Generation of the newest submission
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a run
    ///
    /// Blank input is a no-op. Otherwise the prior result is cleared, the
    /// status moves to Loading and the request to run is returned.
    pub fn begin(&mut self, problem: &str) -> Option<BlueprintJob> {
        debug!(problem_len = problem.len(), "Orchestrator::begin: called");
        let request = BlueprintRequest::new(problem)?;

        self.generation += 1;
        self.status = AnalysisStatus::Loading;
        self.result = None;
        self.error = None;
        self.problem = Some(request.problem().to_string());
        info!(generation = self.generation, "Blueprint generation started");

        match self.prompts.blueprint_messages(request.problem()) {
            Ok(messages) => Some(BlueprintJob {
                generation: self.generation,
                messages,
            }),
            Err(e) => {
                warn!(error = %e, "Failed to build blueprint prompt");
                self.status = AnalysisStatus::Error;
                self.error = Some(e.to_string());
                None
            }
        }
    }

    /// Apply the outcome of the job for `generation`
    ///
    /// Outcomes of superseded submissions are ignored. Returns true if the
    /// outcome was applied.
    pub fn finish(&mut self, generation: u64, outcome: BlueprintOutcome) -> bool {
        debug!(generation, current = self.generation, "Orchestrator::finish: called");
        if generation != self.generation || self.status != AnalysisStatus::Loading {
            debug!("Orchestrator::finish: stale outcome dropped");
            return false;
        }

        match outcome {
            Ok((result, usage)) => {
                info!(
                    generation,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "Blueprint ready"
                );
                self.result = Some(result);
                self.status = AnalysisStatus::Success;
            }
            Err(e) => {
                warn!(generation, error = %e, kind = ?e.kind(), "Blueprint generation failed");
                self.result = None;
                self.error = Some(e.to_string());
                self.status = AnalysisStatus::Error;
            }
        }
        true
    }

    /// begin + execute + finish in one call
    pub async fn run(&mut self, client: Arc<dyn LlmClient>, problem: &str) -> Option<&BlueprintResult> {
        debug!("Orchestrator::run: called");
        let job = self.begin(problem)?;
        let generation = job.generation;
        let outcome = job.execute(client.as_ref()).await;
        self.finish(generation, outcome);
        self.result.as_ref()
    }

    /// Back to Idle, discarding the result
    pub fn reset(&mut self) {
        debug!(status = %self.status, "Orchestrator::reset: called");
        // Any job still in flight becomes stale
        self.generation += 1;
        self.status = AnalysisStatus::Idle;
        self.result = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::Section;
    use crate::llm::client::mock::MockLlmClient;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(PromptLoader::embedded_only())
    }

    #[test]
    fn test_request_rejects_blank() {
        assert!(BlueprintRequest::new("").is_none());
        assert!(BlueprintRequest::new(" \n\t ").is_none());
        assert_eq!(BlueprintRequest::new("  queues  ").unwrap().problem(), "queues");
    }

    #[tokio::test]
    async fn test_blank_input_is_noop() {
        let client = Arc::new(MockLlmClient::new().with_text("unused"));
        let mut orch = orchestrator();
        assert!(orch.run(client.clone(), "   ").await.is_none());
        assert_eq!(orch.status(), AnalysisStatus::Idle);
        assert_eq!(orch.generation(), 0);
        assert_eq!(client.text_calls(), 0);
    }

    #[tokio::test]
    async fn test_success_parses_sections() {
        let client = Arc::new(MockLlmClient::new().with_text(
            "==== 1. PROBLEM OVERVIEW ====\nHello [VISUAL_PROMPT: a cat] world\n==== 2. DETAILED BREAKDOWN ====\nBody",
        ));
        let mut orch = orchestrator();
        let result = orch.run(client.clone(), "Traffic jams").await.cloned().unwrap();

        assert_eq!(orch.status(), AnalysisStatus::Success);
        assert_eq!(result.get(Section::ProblemOverview), "Hello [VISUAL_PROMPT: a cat] world");
        assert_eq!(result.get(Section::DetailedBreakdown), "Body");
        assert_eq!(orch.problem(), Some("Traffic jams"));

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages.len(), 2);
        assert!(requests[0].messages[1].text.ends_with("Traffic jams"));
    }

    #[tokio::test]
    async fn test_empty_response_is_error_without_result() {
        let client = Arc::new(MockLlmClient::new().with_text(""));
        let mut orch = orchestrator();
        assert!(orch.run(client, "Traffic jams").await.is_none());
        assert_eq!(orch.status(), AnalysisStatus::Error);
        assert!(orch.result().is_none());
        assert!(orch.error().is_some());
    }

    #[tokio::test]
    async fn test_whitespace_response_is_success_with_empty_sections() {
        let client = Arc::new(MockLlmClient::new().with_text("  \n\t "));
        let mut orch = orchestrator();
        let result = orch.run(client, "Traffic jams").await.cloned().unwrap();
        assert_eq!(orch.status(), AnalysisStatus::Success);
        assert!(result.is_empty());
        assert!(orch.error().is_none());
    }

    #[tokio::test]
    async fn test_missing_credential_is_error() {
        let client = Arc::new(MockLlmClient::new().with_text_error(LlmError::MissingCredential {
            env: "API_KEY".to_string(),
        }));
        let mut orch = orchestrator();
        orch.run(client, "Traffic jams").await;
        assert_eq!(orch.status(), AnalysisStatus::Error);
        assert!(orch.error().unwrap().contains("API_KEY"));
    }

    #[tokio::test]
    async fn test_new_run_clears_prior_result() {
        let client = Arc::new(
            MockLlmClient::new()
                .with_text("==== 1. PROBLEM OVERVIEW ====\nfirst")
                .with_text_error(LlmError::EmptyResponse),
        );
        let mut orch = orchestrator();
        orch.run(client.clone(), "one").await;
        assert!(orch.result().is_some());

        orch.begin("two").unwrap();
        assert_eq!(orch.status(), AnalysisStatus::Loading);
        assert!(orch.result().is_none());
    }

    #[test]
    fn test_stale_finish_ignored() {
        let mut orch = orchestrator();
        let first = orch.begin("one").unwrap();
        let second = orch.begin("two").unwrap();
        assert!(second.generation > first.generation);

        let stale = Ok((BlueprintResult::default(), TokenUsage::default()));
        assert!(!orch.finish(first.generation, stale));
        assert_eq!(orch.status(), AnalysisStatus::Loading);

        assert!(orch.finish(second.generation, Err(LlmError::EmptyResponse)));
        assert_eq!(orch.status(), AnalysisStatus::Error);
    }

    #[test]
    fn test_reset_discards_in_flight() {
        let mut orch = orchestrator();
        let job = orch.begin("one").unwrap();
        orch.reset();
        assert_eq!(orch.status(), AnalysisStatus::Idle);

        let outcome = Ok((BlueprintResult::default(), TokenUsage::default()));
        assert!(!orch.finish(job.generation, outcome));
        assert_eq!(orch.status(), AnalysisStatus::Idle);
        assert!(orch.result().is_none());
    }
}
