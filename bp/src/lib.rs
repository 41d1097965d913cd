//! Hackathon Architect
//!
//! Turns a problem statement into a nine-section project blueprint. The text
//! comes from one generation request, is split into sections on fixed
//! markers, and every `[VISUAL_PROMPT: ...]` tag inside a section becomes an
//! image that is generated the first time its section is shown.
//!
//! # Modules
//!
//! - [`blueprint`] - Sections, parsing, prompt extraction, image units, orchestrator
//! - [`llm`] - Generation client trait and Gemini implementation
//! - [`prompts`] - Embedded prompt templates with user overrides
//! - [`export`] - Writing blueprints and images to disk
//! - [`tui`] - Terminal interface
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod blueprint;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod export;
pub mod llm;
pub mod prompts;
pub mod tui;

// Re-export commonly used types
pub use blueprint::{
    AnalysisStatus, BlueprintResult, Gallery, ImageKey, ImagePhase, ImageUnit, Orchestrator, Section, SectionView,
    extract, parse,
};
pub use config::{Config, LlmConfig};
pub use export::{ExportError, export_blueprint};
pub use llm::{GeneratedImage, LlmClient, LlmError, create_client};
pub use prompts::PromptLoader;
