//! Blueprint model
//!
//! Everything between the raw model output and what the user sees: the
//! section catalogue, the parser, visual prompt extraction, the image units
//! and the orchestrator driving a run.

mod extract;
mod gallery;
mod image;
mod orchestrator;
mod parser;
mod section;

pub use extract::{SectionView, extract};
pub use gallery::{Gallery, GalleryJob, GalleryStats, ImageKey, ImageOutcome};
pub use image::{ImageJob, ImagePhase, ImageUnit};
pub use orchestrator::{AnalysisStatus, BlueprintJob, BlueprintOutcome, BlueprintRequest, Orchestrator};
pub use parser::{BlueprintResult, parse};
pub use section::{RenderStyle, Section};
