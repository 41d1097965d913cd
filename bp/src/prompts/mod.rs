//! Prompt Template System
//!
//! Template loading chain:
//! 1. `.blueprint/prompts/{name}.pmt` (user override)
//! 2. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use embedded::styled_image_prompt;
pub use loader::{PromptContext, PromptLoader};
