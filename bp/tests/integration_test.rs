//! Integration tests for the blueprint pipeline
//!
//! Drive a full run through the public API with a scripted client: prompt,
//! parse, extract, lazy image generation, export.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use blueprint::blueprint::{AnalysisStatus, Gallery, ImageKey, ImagePhase, Orchestrator, Section};
use blueprint::llm::{
    CompletionRequest, CompletionResponse, GeneratedImage, ImageRequest, LlmClient, LlmError, TokenUsage,
};
use blueprint::prompts::PromptLoader;
use blueprint::{export_blueprint, extract};
use tempfile::TempDir;

/// Answers every text request with `text`; fails image prompts containing "broken"
struct ScriptedClient {
    text: String,
    image_calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            image_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Ok(CompletionResponse {
            content: Some(self.text.clone()),
            usage: TokenUsage {
                input_tokens: 120,
                output_tokens: 900,
            },
        })
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, LlmError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        if request.prompt.contains("broken") {
            return Err(LlmError::NoImagePayload);
        }
        Ok(GeneratedImage::png(request.prompt.len().to_le_bytes().to_vec()))
    }
}

fn full_blueprint() -> String {
    Section::ALL
        .into_iter()
        .map(|s| {
            format!(
                "{}\n- Point about {}\n- [VISUAL_PROMPT: {} scene one]\n- [VISUAL_PROMPT: {} scene two]\n\n",
                s.marker(),
                s.label(),
                s.tab_id(),
                s.tab_id()
            )
        })
        .collect()
}

#[tokio::test]
async fn test_full_run_then_lazy_images() {
    let client = Arc::new(ScriptedClient::new(&full_blueprint()));
    let mut orchestrator = Orchestrator::new(PromptLoader::embedded_only());

    let result = orchestrator
        .run(client.clone(), "Farmers cannot predict crop prices")
        .await
        .cloned()
        .expect("blueprint");
    assert_eq!(orchestrator.status(), AnalysisStatus::Success);

    for (section, text) in result.iter() {
        let view = extract(text);
        assert_eq!(view.prompts.len(), 2, "section {:?}", section);
        assert!(!view.display_text.contains("VISUAL_PROMPT"));
    }

    // Nothing is generated until a section is shown
    let mut gallery = Gallery::new(orchestrator.generation(), &result);
    assert_eq!(gallery.stats().waiting, 18);
    assert_eq!(client.image_calls.load(Ordering::SeqCst), 0);

    let client_dyn: Arc<dyn LlmClient> = client.clone();
    for job in gallery.show(Section::Flowcharts) {
        let outcome = job.run(Arc::clone(&client_dyn)).await;
        assert!(gallery.complete(outcome));
    }
    assert_eq!(client.image_calls.load(Ordering::SeqCst), 2);
    assert_eq!(gallery.stats().success, 2);

    // Coming back to the tab does not regenerate
    gallery.show(Section::JuryQuestions);
    assert!(gallery.show(Section::Flowcharts).is_empty());

    let dir = TempDir::new().expect("Failed to create temp dir");
    let out = export_blueprint(dir.path(), "Farmers cannot predict crop prices", &result, &gallery.images())
        .expect("export");
    let md = std::fs::read_to_string(out.join("blueprint.md")).expect("markdown");
    assert!(md.contains(&format!("## {}", Section::Flowcharts.label())));
    assert!(out.join("flowcharts-1.png").exists());
    assert!(out.join("flowcharts-2.png").exists());
}

#[tokio::test]
async fn test_failed_image_recovers_on_manual_retry() {
    let raw = format!(
        "{}\nText [VISUAL_PROMPT: broken chart]\n{}\n",
        Section::ProblemOverview.marker(),
        Section::DetailedBreakdown.marker()
    );
    let client: Arc<dyn LlmClient> = Arc::new(ScriptedClient::new(&raw));
    let mut orchestrator = Orchestrator::new(PromptLoader::embedded_only());
    let result = orchestrator.run(Arc::clone(&client), "x").await.cloned().expect("blueprint");

    let mut gallery = Gallery::new(orchestrator.generation(), &result);
    let job = gallery.show(Section::ProblemOverview).remove(0);
    gallery.complete(job.run(Arc::clone(&client)).await);

    let key = ImageKey {
        section: Section::ProblemOverview,
        index: 0,
    };
    assert_eq!(gallery.unit(key).map(|u| u.phase().clone()), Some(ImagePhase::Error));

    // Still failing prompt: retry is allowed again and again, never automatic
    let job = gallery.retry(key).expect("retry");
    gallery.complete(job.run(Arc::clone(&client)).await);
    assert_eq!(gallery.unit(key).map(|u| u.phase().clone()), Some(ImagePhase::Error));
    assert!(gallery.show(Section::ProblemOverview).is_empty());
}

#[tokio::test]
async fn test_model_ignoring_format_is_success_with_empty_sections() {
    let client: Arc<dyn LlmClient> = Arc::new(ScriptedClient::new("I cannot help with that."));
    let mut orchestrator = Orchestrator::new(PromptLoader::embedded_only());
    let result = orchestrator.run(client, "x").await.cloned().expect("result");

    assert_eq!(orchestrator.status(), AnalysisStatus::Success);
    assert!(result.is_empty());
    assert_eq!(Gallery::new(orchestrator.generation(), &result).stats().total(), 0);
}
