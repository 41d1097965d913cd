//! TUI Runner - main loop that owns the terminal and the background tasks
//!
//! The TuiRunner is responsible for:
//! - Dispatching terminal events to App
//! - Spawning the blueprint request and image requests queued by AppState
//! - Feeding task results back into AppState
//! - Performing clipboard and file output

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::views;
use crate::blueprint::{BlueprintOutcome, ImageKey, ImageOutcome};
use crate::clipboard;
use crate::export;
use crate::llm::LlmClient;
use crate::prompts::PromptLoader;

/// Result from a background generation task
#[derive(Debug)]
enum TaskResult {
    Blueprint { generation: u64, outcome: BlueprintOutcome },
    Image(ImageOutcome),
}

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    app: App,
    terminal: Tui,
    event_handler: EventHandler,
    client: Arc<dyn LlmClient>,
    /// Where saved images and exports go
    output_dir: PathBuf,
    result_tx: mpsc::UnboundedSender<TaskResult>,
    result_rx: mpsc::UnboundedReceiver<TaskResult>,
}

impl TuiRunner {
    pub fn new(terminal: Tui, client: Arc<dyn LlmClient>, prompts: PromptLoader, output_dir: PathBuf) -> Self {
        debug!(?output_dir, "TuiRunner::new: called");
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        Self {
            app: App::new(prompts),
            terminal,
            event_handler: EventHandler::new(Duration::from_millis(100)),
            client,
            output_dir,
            result_tx,
            result_rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        debug!("TuiRunner::run: entering main loop");
        loop {
            self.terminal.draw(|frame| views::render(self.app.state(), frame))?;

            tokio::select! {
                event = self.event_handler.next() => {
                    match event? {
                        Event::Tick => self.handle_tick(),
                        Event::Key(key) => {
                            if self.app.handle_key(key) {
                                break;
                            }
                            // Act on what the key queued without waiting for a tick
                            self.dispatch_pending();
                        }
                        Event::Paste(text) => self.app.handle_paste(&text),
                        Event::Resize(width, height) => {
                            debug!(width, height, "TuiRunner::run: resize");
                        }
                    }
                }
                Some(result) = self.result_rx.recv() => {
                    self.handle_result(result);
                    self.dispatch_pending();
                }
            }

            if self.app.state().should_quit {
                debug!("TuiRunner::run: should_quit is true, breaking");
                break;
            }
        }

        debug!("TuiRunner::run: exiting");
        Ok(())
    }

    fn handle_tick(&mut self) {
        self.app.state_mut().tick();

        let results: Vec<TaskResult> = std::iter::from_fn(|| self.result_rx.try_recv().ok()).collect();
        for result in results {
            self.handle_result(result);
        }
        self.dispatch_pending();
    }

    fn handle_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Blueprint { generation, outcome } => {
                debug!(generation, ok = outcome.is_ok(), "TuiRunner::handle_result: blueprint");
                self.app.state_mut().finish_blueprint(generation, outcome);
            }
            TaskResult::Image(outcome) => {
                debug!(key = ?outcome.key, ok = outcome.result.is_ok(), "TuiRunner::handle_result: image");
                self.app.state_mut().finish_image(outcome);
            }
        }
    }

    /// Start or perform everything AppState queued
    fn dispatch_pending(&mut self) {
        if let Some(job) = self.app.state_mut().pending_blueprint.take() {
            let generation = job.generation;
            info!(generation, "Spawning blueprint request");
            let client = Arc::clone(&self.client);
            let tx = self.result_tx.clone();
            tokio::spawn(async move {
                let outcome = job.execute(client.as_ref()).await;
                let _ = tx.send(TaskResult::Blueprint { generation, outcome });
            });
        }

        let jobs = std::mem::take(&mut self.app.state_mut().pending_images);
        if !jobs.is_empty() {
            info!(count = jobs.len(), "Spawning image requests");
        }
        for job in jobs {
            let client = Arc::clone(&self.client);
            let tx = self.result_tx.clone();
            tokio::spawn(async move {
                let outcome = job.run(client).await;
                let _ = tx.send(TaskResult::Image(outcome));
            });
        }

        if let Some(text) = self.app.state_mut().pending_copy.take() {
            match clipboard::copy(&text) {
                Ok(()) => self.app.state_mut().mark_copied(),
                Err(e) => {
                    warn!(error = %e, "Copy to clipboard failed");
                    self.app.state_mut().set_error(format!("Copy failed: {}", e));
                }
            }
        }

        if let Some(key) = self.app.state_mut().pending_save.take() {
            self.save_image(key);
        }

        if std::mem::take(&mut self.app.state_mut().pending_export) {
            self.export();
        }
    }

    fn save_image(&mut self, key: ImageKey) {
        debug!(?key, "TuiRunner::save_image: called");
        let image = self
            .app
            .state()
            .gallery
            .as_ref()
            .and_then(|g| g.unit(key))
            .and_then(|u| u.image().cloned());
        let Some(image) = image else {
            return;
        };
        match export::save_image(&self.output_dir, key, &image) {
            Ok(path) => self.app.state_mut().set_notice(format!("Saved {}", path.display())),
            Err(e) => {
                warn!(error = %e, "Saving image failed");
                self.app.state_mut().set_error(e.to_string());
            }
        }
    }

    fn export(&mut self) {
        debug!("TuiRunner::export: called");
        let state = self.app.state();
        let (Some(result), Some(gallery)) = (state.orchestrator.result(), state.gallery.as_ref()) else {
            return;
        };
        let problem = state.orchestrator.problem().unwrap_or_default();
        let images = gallery.images();

        match export::export_blueprint(&self.output_dir, problem, result, &images) {
            Ok(dir) => self.app.state_mut().set_notice(format!("Exported to {}", dir.display())),
            Err(e) => {
                warn!(error = %e, "Export failed");
                self.app.state_mut().set_error(e.to_string());
            }
        }
    }
}
