//! TUI application state
//!
//! Pure data structures for the TUI. No rendering and no I/O here: actions
//! that need the network, the terminal or the filesystem are queued in the
//! `pending_*` fields and picked up by the runner.

use std::time::{Duration, Instant};

use rand::seq::IndexedRandom;
use tracing::{debug, info};

use crate::blueprint::{
    AnalysisStatus, BlueprintJob, BlueprintOutcome, Gallery, GalleryJob, ImageKey, ImageOutcome, Orchestrator, Section,
};
use crate::prompts::PromptLoader;

/// Words for the loading indicator
pub const LOADING_WORDS: &[&str] = &[
    "Architecting",
    "Sketching",
    "Brainstorming",
    "Blueprinting",
    "Drafting",
    "Scoping",
    "Whiteboarding",
    "Prototyping",
];

/// How long the "Copied" indicator stays up
pub const COPIED_INDICATOR: Duration = Duration::from_secs(2);

/// Interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Normal,
    Help,
}

/// Application state
pub struct AppState {
    /// Top-level request status and result
    pub orchestrator: Orchestrator,
    /// Section views and image units of the current blueprint
    pub gallery: Option<Gallery>,
    /// Problem statement being typed
    pub input: String,
    /// Active tab
    pub active_tab: Section,
    /// Selected image card within the active tab
    pub selected_card: usize,
    /// Scroll offset of the section text
    pub scroll: u16,
    pub interaction_mode: InteractionMode,
    pub should_quit: bool,

    pub loading_word: String,
    pub loading_start: Option<Instant>,
    pub copied_at: Option<Instant>,
    /// Transient one-line notice (saved file, export directory)
    pub notice: Option<String>,
    pub error_message: Option<String>,

    // === Work for the runner ===
    pub pending_blueprint: Option<BlueprintJob>,
    pub pending_images: Vec<GalleryJob>,
    pub pending_copy: Option<String>,
    pub pending_save: Option<ImageKey>,
    pub pending_export: bool,
}

impl AppState {
    pub fn new(prompts: PromptLoader) -> Self {
        debug!("AppState::new: called");
        Self {
            orchestrator: Orchestrator::new(prompts),
            gallery: None,
            input: String::new(),
            active_tab: Section::ProblemOverview,
            selected_card: 0,
            scroll: 0,
            interaction_mode: InteractionMode::Normal,
            should_quit: false,
            loading_word: String::new(),
            loading_start: None,
            copied_at: None,
            notice: None,
            error_message: None,
            pending_blueprint: None,
            pending_images: Vec::new(),
            pending_copy: None,
            pending_save: None,
            pending_export: false,
        }
    }

    pub fn status(&self) -> AnalysisStatus {
        self.orchestrator.status()
    }

    /// Submit the typed problem statement
    ///
    /// Blank input does nothing.
    pub fn submit(&mut self) {
        debug!(input_len = self.input.len(), "AppState::submit: called");
        if self.status() == AnalysisStatus::Loading {
            debug!("AppState::submit: already loading, ignoring");
            return;
        }
        let Some(job) = self.orchestrator.begin(&self.input) else {
            debug!("AppState::submit: nothing to submit");
            return;
        };

        // A new run discards the previous blueprint and every image unit
        self.gallery = None;
        self.pending_images.clear();
        self.start_loading();
        self.pending_blueprint = Some(job);
    }

    fn start_loading(&mut self) {
        let mut rng = rand::rng();
        self.loading_word = LOADING_WORDS.choose(&mut rng).unwrap_or(&"Architecting").to_string();
        self.loading_start = Some(Instant::now());
    }

    /// Apply the outcome of a blueprint job
    pub fn finish_blueprint(&mut self, generation: u64, outcome: BlueprintOutcome) {
        debug!(generation, "AppState::finish_blueprint: called");
        if !self.orchestrator.finish(generation, outcome) {
            return;
        }
        self.loading_start = None;

        if let Some(result) = self.orchestrator.result() {
            info!(generation, "Opening blueprint view");
            self.gallery = Some(Gallery::new(generation, result));
            self.active_tab = Section::ProblemOverview;
            self.selected_card = 0;
            self.scroll = 0;
            self.show_active_tab();
        }
    }

    /// Apply the outcome of an image job
    pub fn finish_image(&mut self, outcome: ImageOutcome) {
        debug!(key = ?outcome.key, "AppState::finish_image: called");
        match self.gallery.as_mut() {
            Some(gallery) => {
                gallery.complete(outcome);
            }
            None => debug!("AppState::finish_image: no gallery, dropping outcome"),
        }
    }

    fn show_active_tab(&mut self) {
        if let Some(gallery) = self.gallery.as_mut() {
            let jobs = gallery.show(self.active_tab);
            debug!(job_count = jobs.len(), tab = ?self.active_tab, "AppState::show_active_tab: jobs");
            self.pending_images.extend(jobs);
        }
    }

    /// Switch to `section`
    pub fn select_tab(&mut self, section: Section) {
        debug!(?section, "AppState::select_tab: called");
        if self.status() != AnalysisStatus::Success {
            return;
        }
        if section != self.active_tab {
            self.active_tab = section;
            self.selected_card = 0;
            self.scroll = 0;
        }
        self.show_active_tab();
    }

    pub fn next_tab(&mut self) {
        self.select_tab(self.active_tab.next());
    }

    pub fn prev_tab(&mut self) {
        self.select_tab(self.active_tab.prev());
    }

    /// Number of image cards in the active tab
    pub fn card_count(&self) -> usize {
        self.gallery
            .as_ref()
            .map(|g| g.unit_count(self.active_tab))
            .unwrap_or(0)
    }

    pub fn next_card(&mut self) {
        let count = self.card_count();
        if count > 0 {
            self.selected_card = (self.selected_card + 1) % count;
        }
    }

    pub fn prev_card(&mut self) {
        let count = self.card_count();
        if count > 0 {
            self.selected_card = (self.selected_card + count - 1) % count;
        }
    }

    pub fn selected_key(&self) -> Option<ImageKey> {
        (self.selected_card < self.card_count()).then_some(ImageKey {
            section: self.active_tab,
            index: self.selected_card,
        })
    }

    /// Retry the selected card if it failed
    pub fn retry_selected(&mut self) {
        debug!(card = self.selected_card, "AppState::retry_selected: called");
        let Some(key) = self.selected_key() else {
            return;
        };
        if let Some(job) = self.gallery.as_mut().and_then(|g| g.retry(key)) {
            self.pending_images.push(job);
        }
    }

    /// Queue saving the selected card's image
    pub fn save_selected(&mut self) {
        debug!(card = self.selected_card, "AppState::save_selected: called");
        let key = self.selected_key();
        let has_image = key
            .and_then(|k| self.gallery.as_ref()?.unit(k)?.image().cloned())
            .is_some();
        if has_image {
            self.pending_save = key;
        } else {
            self.set_notice("No image to save yet");
        }
    }

    /// Queue copying the active section's display text
    pub fn copy_active_section(&mut self) {
        debug!(tab = ?self.active_tab, "AppState::copy_active_section: called");
        if let Some(gallery) = self.gallery.as_ref() {
            self.pending_copy = Some(gallery.view(self.active_tab).display_text.clone());
        }
    }

    pub fn mark_copied(&mut self) {
        self.copied_at = Some(Instant::now());
    }

    /// True while the "Copied" indicator should show
    pub fn copied(&self) -> bool {
        self.copied_at.is_some_and(|at| at.elapsed() < COPIED_INDICATOR)
    }

    /// "New Project": back to the input screen
    pub fn new_project(&mut self) {
        debug!("AppState::new_project: called");
        self.orchestrator.reset();
        self.gallery = None;
        self.pending_images.clear();
        self.pending_blueprint = None;
        self.loading_start = None;
        self.input.clear();
        self.active_tab = Section::ProblemOverview;
        self.selected_card = 0;
        self.scroll = 0;
    }

    /// Leave the error screen, keeping the typed problem
    pub fn try_again(&mut self) {
        debug!("AppState::try_again: called");
        self.orchestrator.reset();
        self.loading_start = None;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn set_notice(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        debug!(%msg, "AppState::set_notice: called");
        self.notice = Some(msg);
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        debug!(%msg, "AppState::set_error: called");
        self.error_message = Some(msg);
    }

    pub fn clear_messages(&mut self) {
        self.notice = None;
        self.error_message = None;
    }

    /// Tick - called on each frame update
    pub fn tick(&mut self) {
        if self.copied_at.is_some() && !self.copied() {
            self.copied_at = None;
        }
    }
}
