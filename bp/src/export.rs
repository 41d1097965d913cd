//! Blueprint export
//!
//! Writes a finished blueprint to disk: one timestamped directory holding
//! `blueprint.md` and every successfully generated image.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use thiserror::Error;
use tracing::{debug, info};

use crate::blueprint::{BlueprintResult, ImageKey, RenderStyle, extract};
use crate::llm::GeneratedImage;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create export directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// File name of one exported image
pub fn image_file_name(key: ImageKey, image: &GeneratedImage) -> String {
    format!("{}-{}.{}", key.section.tab_id(), key.index + 1, image.extension())
}

/// Render the markdown document
pub fn render_markdown(problem: &str, result: &BlueprintResult, images: &[(ImageKey, Arc<GeneratedImage>)]) -> String {
    debug!(image_count = images.len(), "render_markdown: called");
    let mut md = String::new();
    let _ = writeln!(md, "# Project Blueprint\n");
    let _ = writeln!(md, "> {}\n", problem.trim().replace('\n', "\n> "));

    for (section, text) in result.iter() {
        let view = extract(text);
        let _ = writeln!(md, "## {}\n", section.label());
        match section.render_style() {
            RenderStyle::Code => {
                let fence = code_fence(&view.display_text);
                let _ = writeln!(md, "{fence}\n{}\n{fence}\n", view.display_text);
            }
            RenderStyle::Text => {
                let _ = writeln!(md, "{}\n", view.display_text);
            }
        }

        let section_images = images.iter().filter(|(key, _)| key.section == section);
        for (key, image) in section_images {
            let alt = view.prompts.get(key.index).map(String::as_str).unwrap_or_default();
            let alt = alt.replace(['\n', '[', ']'], " ");
            let _ = writeln!(md, "![{}]({})\n", alt, image_file_name(*key, image));
        }
    }
    md
}

/// Backtick fence one longer than the longest backtick run in `body`
fn code_fence(body: &str) -> String {
    let longest = body
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or_default();
    "`".repeat(longest.max(2) + 1)
}

/// Write the blueprint and images under `base`
///
/// Returns the created directory.
pub fn export_blueprint(
    base: &Path,
    problem: &str,
    result: &BlueprintResult,
    images: &[(ImageKey, Arc<GeneratedImage>)],
) -> Result<PathBuf, ExportError> {
    debug!(?base, image_count = images.len(), "export_blueprint: called");
    let dir = unique_dir(base, &Local::now().format("blueprint-%Y%m%d-%H%M%S").to_string());
    fs::create_dir_all(&dir).map_err(|source| ExportError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let md_path = dir.join("blueprint.md");
    fs::write(&md_path, render_markdown(problem, result, images)).map_err(|source| ExportError::Write {
        path: md_path.clone(),
        source,
    })?;

    for (key, image) in images {
        let path = dir.join(image_file_name(*key, image));
        debug!(?path, "export_blueprint: writing image");
        fs::write(&path, &image.bytes).map_err(|source| ExportError::Write { path, source })?;
    }

    info!(dir = %dir.display(), images = images.len(), "Blueprint exported");
    Ok(dir)
}

/// Save a single image under `base`
pub fn save_image(base: &Path, key: ImageKey, image: &GeneratedImage) -> Result<PathBuf, ExportError> {
    debug!(?base, ?key, "save_image: called");
    fs::create_dir_all(base).map_err(|source| ExportError::CreateDir {
        path: base.to_path_buf(),
        source,
    })?;
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let path = base.join(format!("{}-{}", stamp, image_file_name(key, image)));
    fs::write(&path, &image.bytes).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "Image saved");
    Ok(path)
}

/// `base/name`, suffixed when that already exists
fn unique_dir(base: &Path, name: &str) -> PathBuf {
    let candidate = base.join(name);
    if !candidate.exists() {
        return candidate;
    }
    (2..)
        .map(|n| base.join(format!("{}-{}", name, n)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::{Section, parse};
    use tempfile::TempDir;

    fn sample() -> BlueprintResult {
        parse(
            "==== 1. PROBLEM OVERVIEW ====\nOverview [VISUAL_PROMPT: a city]\n\
             ==== 2. DETAILED BREAKDOWN ====\nDetails\n\
             ==== 7. FLOWCHARTS & ARCHITECTURE ====\nA --> B\n\
             ==== 8. JURY QUESTIONS ====\nWhy?",
        )
    }

    fn key(section: Section, index: usize) -> ImageKey {
        ImageKey { section, index }
    }

    #[test]
    fn test_image_file_name() {
        let image = GeneratedImage::png(vec![]);
        assert_eq!(image_file_name(key(Section::JuryQuestions, 0), &image), "jury-1.png");
    }

    #[test]
    fn test_markdown_strips_tags_and_fences_code() {
        let images = vec![(key(Section::ProblemOverview, 0), Arc::new(GeneratedImage::png(vec![1])))];
        let md = render_markdown("Too many cars", &sample(), &images);

        assert!(md.contains("> Too many cars"));
        assert!(md.contains("## Problem Overview\n\nOverview\n"));
        assert!(!md.contains("VISUAL_PROMPT"));
        assert!(md.contains("![a city](overview-1.png)"));
        assert!(md.contains("```\nA --> B\n```"));
    }

    #[test]
    fn test_code_fence_outgrows_body() {
        assert_eq!(code_fence("A --> B"), "```");
        assert_eq!(code_fence("```mermaid\nA\n```"), "````");
        assert_eq!(code_fence("x `````` y"), "```````");
    }

    #[test]
    fn test_markdown_keeps_nested_fence_inside_block() {
        let result = parse(
            "==== 7. FLOWCHARTS & ARCHITECTURE ====\n```mermaid\nA --> B\n```\n\
             ==== 8. JURY QUESTIONS ====\nWhy?",
        );
        let md = render_markdown("Too many cars", &result, &[]);
        assert!(md.contains("````\n```mermaid\nA --> B\n```\n````"));
    }

    #[test]
    fn test_export_writes_files() {
        let dir = TempDir::new().unwrap();
        let images = vec![(key(Section::ProblemOverview, 0), Arc::new(GeneratedImage::png(vec![9, 9])))];

        let out = export_blueprint(dir.path(), "Too many cars", &sample(), &images).unwrap();
        assert!(out.starts_with(dir.path()));
        assert!(out.join("blueprint.md").exists());
        assert_eq!(fs::read(out.join("overview-1.png")).unwrap(), vec![9, 9]);

        // Same second: a second export gets its own directory
        let again = export_blueprint(dir.path(), "Too many cars", &sample(), &[]).unwrap();
        assert_ne!(again, out);
    }

    #[test]
    fn test_save_image() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        let path = save_image(&nested, key(Section::PptSummary, 1), &GeneratedImage::png(vec![7])).unwrap();
        assert!(path.to_string_lossy().ends_with("ppt-2.png"));
        assert_eq!(fs::read(path).unwrap(), vec![7]);
    }
}
