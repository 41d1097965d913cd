//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Blueprint system instruction: nine sections, visual prompt rule, format
pub const BLUEPRINT: &str = include_str!("../../prompts/blueprint.pmt");

/// Problem statement turn (Handlebars, `{{problem}}`)
pub const PROBLEM: &str = include_str!("../../prompts/problem.pmt");

/// Style directive prefixed to every image prompt
pub const IMAGE_STYLE_DIRECTIVE: &str = "Generate a clear, high-quality, professional visualization, diagram, or \
     illustration for the following concept. Do not include text inside the image if possible, focus on visual \
     representation";

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "blueprint" => Some(BLUEPRINT),
        "problem" => Some(PROBLEM),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

/// Full image request text for one visual prompt
pub fn styled_image_prompt(prompt: &str) -> String {
    format!("{IMAGE_STYLE_DIRECTIVE}: {prompt}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::Section;

    #[test]
    fn test_blueprint_lists_every_marker_in_order() {
        let mut last = 0;
        for section in Section::ALL {
            let pos = BLUEPRINT.find(section.marker()).expect("marker present");
            assert!(pos >= last);
            last = pos;
        }
    }

    #[test]
    fn test_blueprint_demands_two_visual_prompts() {
        assert!(BLUEPRINT.contains("at least 2 visual descriptions"));
        assert!(BLUEPRINT.contains("[VISUAL_PROMPT: description]"));
    }

    #[test]
    fn test_problem_template_has_placeholder() {
        assert!(PROBLEM.contains("{{problem}}"));
        assert!(PROBLEM.starts_with("Here is the PROBLEM STATEMENT: "));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("blueprint").is_some());
        assert!(get_embedded("unknown-template").is_none());
    }

    #[test]
    fn test_styled_image_prompt() {
        let styled = styled_image_prompt("a cat");
        assert!(styled.starts_with("Generate a clear, high-quality, professional visualization"));
        assert!(styled.contains("Do not include text inside the image"));
        assert!(styled.ends_with("visual representation: a cat"));
    }
}
