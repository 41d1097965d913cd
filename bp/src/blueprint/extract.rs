//! Visual prompt extraction
//!
//! Pulls `[VISUAL_PROMPT: ...]` tags out of a section body. The tag content
//! may span lines and ends at the nearest `]`.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static VISUAL_PROMPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[VISUAL_PROMPT:\s*([\s\S]*?)\]").expect("visual prompt pattern is valid")
});

/// A section body split into what is displayed and what is drawn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionView {
    /// Body text with every tag removed, trimmed
    pub display_text: String,
    /// Tag contents, trimmed, in order of appearance
    pub prompts: Vec<String>,
}

/// Extract the visual prompts from `text`
pub fn extract(text: &str) -> SectionView {
    debug!(text_len = text.len(), "extract: called");
    let prompts: Vec<String> = VISUAL_PROMPT
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .collect();
    let display_text = strip_tags(text).trim().to_string();
    debug!(prompt_count = prompts.len(), "extract: done");
    SectionView { display_text, prompts }
}

/// Remove tags until none remain
///
/// A single pass can splice a new tag together out of the text around a
/// removed one (`[VISUAL_[VISUAL_PROMPT: a]PROMPT: b]`); those are removed
/// too so that the displayed text never carries a tag. Every pass shortens
/// the text, so this terminates.
fn strip_tags(text: &str) -> String {
    let mut current = VISUAL_PROMPT.replace_all(text, "").into_owned();
    while VISUAL_PROMPT.is_match(&current) {
        debug!("strip_tags: spliced tag found, stripping again");
        current = VISUAL_PROMPT.replace_all(&current, "").into_owned();
    }
    current
}
