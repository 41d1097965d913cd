//! TUI application - event handling and state management
//!
//! The App struct owns the AppState and handles all keyboard events.
//! It does not do any rendering - that's delegated to the views module.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, trace};

use super::state::{AppState, InteractionMode};
use crate::blueprint::{AnalysisStatus, Section};
use crate::prompts::PromptLoader;

/// TUI application
pub struct App {
    state: AppState,
}

impl App {
    pub fn new(prompts: PromptLoader) -> Self {
        debug!("App::new: called");
        Self {
            state: AppState::new(prompts),
        }
    }

    pub fn state(&self) -> &AppState {
        trace!("App::state: called");
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        trace!("App::state_mut: called");
        &mut self.state
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        debug!(?key, "App::handle_key: called");
        if key.kind == KeyEventKind::Release {
            return false;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            debug!("App::handle_key: Ctrl+C force quit");
            return true;
        }
        self.state.clear_messages();

        if self.state.interaction_mode == InteractionMode::Help {
            debug!("App::handle_key: Help mode");
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.state.interaction_mode = InteractionMode::Normal;
            }
            return false;
        }

        match self.state.status() {
            AnalysisStatus::Idle => self.handle_input_key(key),
            AnalysisStatus::Loading => self.handle_loading_key(key),
            AnalysisStatus::Error => self.handle_error_key(key),
            AnalysisStatus::Success => self.handle_blueprint_key(key),
        }
        self.state.should_quit
    }

    /// Handle pasted text
    ///
    /// Only the problem input takes a paste; newlines in it never submit.
    pub fn handle_paste(&mut self, text: &str) {
        debug!(len = text.len(), "App::handle_paste: called");
        if self.state.interaction_mode != InteractionMode::Normal || self.state.status() != AnalysisStatus::Idle {
            trace!("App::handle_paste: ignored outside problem input");
            return;
        }
        self.state.clear_messages();
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        self.state.input.push_str(&text);
    }

    /// Problem statement entry
    fn handle_input_key(&mut self, key: KeyEvent) {
        debug!(?key, "App::handle_input_key: called");
        match (key.code, key.modifiers) {
            (KeyCode::Enter, m) if m.contains(KeyModifiers::ALT) || m.contains(KeyModifiers::SHIFT) => {
                self.state.input.push('\n');
            }
            (KeyCode::Enter, _) => {
                debug!("App::handle_input_key: submit");
                self.state.submit();
            }
            (KeyCode::Backspace, _) => {
                self.state.input.pop();
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.state.input.clear();
            }
            (KeyCode::Esc, _) => {
                debug!("App::handle_input_key: quit requested");
                self.state.should_quit = true;
            }
            (KeyCode::Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
                self.state.input.push(c);
            }
            _ => {
                trace!("App::handle_input_key: unhandled key");
            }
        }
    }

    fn handle_loading_key(&mut self, key: KeyEvent) {
        debug!(?key, "App::handle_loading_key: called");
        if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
            self.state.should_quit = true;
        }
    }

    fn handle_error_key(&mut self, key: KeyEvent) {
        debug!(?key, "App::handle_error_key: called");
        match key.code {
            KeyCode::Enter | KeyCode::Char('r') => self.state.try_again(),
            KeyCode::Char('q') | KeyCode::Esc => self.state.should_quit = true,
            _ => {}
        }
    }

    /// Nine-tab blueprint view
    fn handle_blueprint_key(&mut self, key: KeyEvent) {
        debug!(?key, "App::handle_blueprint_key: called");
        match key.code {
            KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Char('?') | KeyCode::F(1) => self.state.interaction_mode = InteractionMode::Help,

            KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => self.state.next_tab(),
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => self.state.prev_tab(),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if let Some(section) = Section::from_index(index) {
                    self.state.select_tab(section);
                }
            }

            KeyCode::Down | KeyCode::Char('j') => self.state.scroll_down(1),
            KeyCode::Up | KeyCode::Char('k') => self.state.scroll_up(1),
            KeyCode::PageDown => self.state.scroll_down(10),
            KeyCode::PageUp => self.state.scroll_up(10),
            KeyCode::Char('g') => self.state.scroll = 0,

            KeyCode::Char(']') => self.state.next_card(),
            KeyCode::Char('[') => self.state.prev_card(),
            KeyCode::Char('r') => self.state.retry_selected(),
            KeyCode::Char('s') => self.state.save_selected(),

            KeyCode::Char('c') | KeyCode::Char('y') => self.state.copy_active_section(),
            KeyCode::Char('e') => self.state.pending_export = true,
            KeyCode::Char('n') => self.state.new_project(),
            _ => {
                trace!("App::handle_blueprint_key: unhandled key");
            }
        }
    }
}
