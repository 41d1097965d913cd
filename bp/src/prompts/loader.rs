//! Prompt Loader
//!
//! Loads prompt templates from the user override directory or falls back to
//! the embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;
use crate::llm::Message;

/// Context for rendering the problem statement turn
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    pub problem: String,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.blueprint/prompts/`)
    user_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader rooted at `workdir`
    ///
    /// Overrides are read from `{workdir}/.blueprint/prompts/{name}.pmt`.
    pub fn new(workdir: impl AsRef<Path>) -> Self {
        let user_dir = workdir.as_ref().join(".blueprint/prompts");
        let user_dir_exists = user_dir.exists();
        debug!(?user_dir, %user_dir_exists, "PromptLoader::new: called");

        Self {
            hbs: Self::engine(),
            user_dir: if user_dir_exists { Some(user_dir) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Problem statements are plain text, not HTML
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `.blueprint/prompts/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in user override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// The fixed system instruction
    pub fn system_instruction(&self) -> Result<String> {
        debug!("PromptLoader::system_instruction: called");
        self.load_template("blueprint")
    }

    /// Render the problem statement turn
    pub fn problem_turn(&self, problem: &str) -> Result<String> {
        debug!(problem_len = problem.len(), "PromptLoader::problem_turn: called");
        let template = self.load_template("problem")?;
        let context = PromptContext {
            problem: problem.to_string(),
        };
        info!("Rendering problem template ({} chars)", problem.len());
        self.hbs
            .render_template(&template, &context)
            .map_err(|e| eyre!("Failed to render template problem: {}", e))
    }

    /// The two ordered turns of a blueprint request
    pub fn blueprint_messages(&self, problem: &str) -> Result<Vec<Message>> {
        Ok(vec![
            Message::user(self.system_instruction()?),
            Message::user(self.problem_turn(problem)?),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_problem_turn_is_not_html_escaped() {
        let loader = PromptLoader::embedded_only();
        let turn = loader.problem_turn("Farmers & <traders> can't \"predict\" prices").unwrap();
        assert_eq!(
            turn,
            "Here is the PROBLEM STATEMENT: Farmers & <traders> can't \"predict\" prices"
        );
    }

    #[test]
    fn test_blueprint_messages_order() {
        let loader = PromptLoader::embedded_only();
        let messages = loader.blueprint_messages("slow checkout lines").unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].text.contains("9-section project blueprint"));
        assert!(messages[1].text.ends_with("slow checkout lines"));
    }

    #[test]
    fn test_user_override_wins() {
        let dir = TempDir::new().unwrap();
        let prompts = dir.path().join(".blueprint/prompts");
        std::fs::create_dir_all(&prompts).unwrap();
        std::fs::write(prompts.join("problem.pmt"), "PROBLEM >>> {{problem}}").unwrap();

        let loader = PromptLoader::new(dir.path());
        assert_eq!(loader.problem_turn("x").unwrap(), "PROBLEM >>> x");
        // No override for the system instruction: embedded default
        assert!(loader.system_instruction().unwrap().contains("==== 9. PPT SUMMARY GENERATOR ===="));
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.load_template("nonexistent-template").is_err());
    }
}
