//! Per-blueprint collection of image units
//!
//! Owns one [`ImageUnit`] per (section, prompt index) and propagates tab
//! visibility to them. Every gallery carries the generation number of the
//! blueprint it was built from; outcomes tagged with another generation
//! belong to a discarded blueprint and are dropped.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::extract::{SectionView, extract};
use super::image::{ImageJob, ImagePhase, ImageUnit};
use super::parser::BlueprintResult;
use super::section::Section;
use crate::llm::{GeneratedImage, LlmClient, LlmError};

/// Identifies one image unit within a blueprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageKey {
    pub section: Section,
    pub index: usize,
}

/// An image job tagged with where its outcome belongs
#[derive(Debug, Clone)]
pub struct GalleryJob {
    pub generation: u64,
    pub key: ImageKey,
    pub job: ImageJob,
}

impl GalleryJob {
    /// Run the request and tag the outcome
    pub async fn run(self, client: Arc<dyn LlmClient>) -> ImageOutcome {
        debug!(generation = self.generation, key = ?self.key, "GalleryJob::run: called");
        let result = self.job.execute(client.as_ref()).await;
        ImageOutcome {
            generation: self.generation,
            key: self.key,
            result,
        }
    }
}

/// Result of a [`GalleryJob`]
#[derive(Debug)]
pub struct ImageOutcome {
    pub generation: u64,
    pub key: ImageKey,
    pub result: Result<GeneratedImage, LlmError>,
}

/// Counts of units per phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GalleryStats {
    pub waiting: usize,
    pub loading: usize,
    pub success: usize,
    pub error: usize,
}

impl GalleryStats {
    pub fn total(&self) -> usize {
        self.waiting + self.loading + self.success + self.error
    }
}

/// Section views and image units of one blueprint
#[derive(Debug, Clone)]
pub struct Gallery {
    generation: u64,
    views: Vec<SectionView>,
    units: BTreeMap<ImageKey, ImageUnit>,
    shown: Option<Section>,
}

impl Gallery {
    /// Build views and units for every section of `result`
    pub fn new(generation: u64, result: &BlueprintResult) -> Self {
        debug!(generation, "Gallery::new: called");
        let views: Vec<SectionView> = result.iter().map(|(_, text)| extract(text)).collect();
        let units = Section::ALL
            .into_iter()
            .zip(&views)
            .flat_map(|(section, view)| {
                view.prompts
                    .iter()
                    .enumerate()
                    .map(move |(index, prompt)| (ImageKey { section, index }, ImageUnit::new(prompt.clone())))
            })
            .collect::<BTreeMap<_, _>>();
        debug!(unit_count = units.len(), "Gallery::new: built units");

        Self {
            generation,
            views,
            units,
            shown: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Display text and prompts of a section
    pub fn view(&self, section: Section) -> &SectionView {
        &self.views[section.index()]
    }

    pub fn shown(&self) -> Option<Section> {
        self.shown
    }

    pub fn unit(&self, key: ImageKey) -> Option<&ImageUnit> {
        self.units.get(&key)
    }

    /// Units of one section in prompt order
    pub fn units(&self, section: Section) -> impl Iterator<Item = (ImageKey, &ImageUnit)> + '_ {
        self.units
            .range(ImageKey { section, index: 0 }..=ImageKey {
                section,
                index: usize::MAX,
            })
            .map(|(k, u)| (*k, u))
    }

    pub fn unit_count(&self, section: Section) -> usize {
        self.units(section).count()
    }

    /// Make `section` the visible one
    ///
    /// The previously shown section's units become not-visible. Units of
    /// `section` that see a not-visible to visible edge start generating.
    pub fn show(&mut self, section: Section) -> Vec<GalleryJob> {
        debug!(?section, previous = ?self.shown, "Gallery::show: called");
        if let Some(previous) = self.shown
            && previous != section
        {
            self.set_section_visible(previous, false);
        }
        self.shown = Some(section);
        self.set_section_visible(section, true)
    }

    /// Nothing is visible (e.g. the blueprint view is closed)
    pub fn hide(&mut self) {
        debug!(shown = ?self.shown, "Gallery::hide: called");
        if let Some(previous) = self.shown.take() {
            self.set_section_visible(previous, false);
        }
    }

    fn set_section_visible(&mut self, section: Section, visible: bool) -> Vec<GalleryJob> {
        let generation = self.generation;
        self.units
            .iter_mut()
            .filter(|(key, _)| key.section == section)
            .filter_map(|(key, unit)| {
                unit.on_visibility(visible).map(|job| GalleryJob {
                    generation,
                    key: *key,
                    job,
                })
            })
            .collect()
    }

    /// Manual retry of one failed unit
    pub fn retry(&mut self, key: ImageKey) -> Option<GalleryJob> {
        debug!(?key, "Gallery::retry: called");
        let generation = self.generation;
        self.units
            .get_mut(&key)?
            .retry()
            .map(|job| GalleryJob { generation, key, job })
    }

    /// Apply an outcome; returns false if it was stale or unknown
    pub fn complete(&mut self, outcome: ImageOutcome) -> bool {
        if outcome.generation != self.generation {
            debug!(
                outcome_generation = outcome.generation,
                generation = self.generation,
                "Gallery::complete: stale outcome dropped"
            );
            return false;
        }
        match self.units.get_mut(&outcome.key) {
            Some(unit) => {
                unit.complete(outcome.result);
                true
            }
            None => {
                debug!(key = ?outcome.key, "Gallery::complete: unknown key");
                false
            }
        }
    }

    pub fn stats(&self) -> GalleryStats {
        let mut stats = GalleryStats::default();
        for unit in self.units.values() {
            match unit.phase() {
                ImagePhase::Waiting => stats.waiting += 1,
                ImagePhase::Loading => stats.loading += 1,
                ImagePhase::Success(_) => stats.success += 1,
                ImagePhase::Error => stats.error += 1,
            }
        }
        stats
    }

    /// Every generated image, in section then prompt order
    pub fn images(&self) -> Vec<(ImageKey, Arc<GeneratedImage>)> {
        self.units
            .iter()
            .filter_map(|(key, unit)| unit.image().map(|image| (*key, Arc::clone(image))))
            .collect()
    }
}
