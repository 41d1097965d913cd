//! Section parser
//!
//! Splits the raw model output into the nine sections by exact substring
//! search on the section markers. Never fails: a section whose marker is
//! missing is simply empty.

use tracing::debug;

use super::section::Section;

/// The nine section bodies of one blueprint, raw (visual prompt tags intact)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlueprintResult {
    pub problem_overview: String,
    pub detailed_breakdown: String,
    pub dataset_requirements: String,
    pub expected_solution: String,
    pub gen_ai_use_cases: String,
    pub real_life_scenario: String,
    pub flowcharts: String,
    pub jury_questions: String,
    pub ppt_summary: String,
}

impl BlueprintResult {
    /// Raw text of one section
    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::ProblemOverview => &self.problem_overview,
            Section::DetailedBreakdown => &self.detailed_breakdown,
            Section::DatasetRequirements => &self.dataset_requirements,
            Section::ExpectedSolution => &self.expected_solution,
            Section::GenAiUseCases => &self.gen_ai_use_cases,
            Section::RealLifeScenario => &self.real_life_scenario,
            Section::Flowcharts => &self.flowcharts,
            Section::JuryQuestions => &self.jury_questions,
            Section::PptSummary => &self.ppt_summary,
        }
    }

    fn get_mut(&mut self, section: Section) -> &mut String {
        match section {
            Section::ProblemOverview => &mut self.problem_overview,
            Section::DetailedBreakdown => &mut self.detailed_breakdown,
            Section::DatasetRequirements => &mut self.dataset_requirements,
            Section::ExpectedSolution => &mut self.expected_solution,
            Section::GenAiUseCases => &mut self.gen_ai_use_cases,
            Section::RealLifeScenario => &mut self.real_life_scenario,
            Section::Flowcharts => &mut self.flowcharts,
            Section::JuryQuestions => &mut self.jury_questions,
            Section::PptSummary => &mut self.ppt_summary,
        }
    }

    /// Sections paired with their raw text, in marker order
    pub fn iter(&self) -> impl Iterator<Item = (Section, &str)> + '_ {
        Section::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    /// True when no section has any text
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, text)| text.is_empty())
    }
}

/// Parse a raw model response into its nine sections
pub fn parse(raw: &str) -> BlueprintResult {
    debug!(raw_len = raw.len(), "parse: called");
    let mut result = BlueprintResult::default();
    for section in Section::ALL {
        let end_marker = Section::from_index(section.index() + 1).map(Section::marker);
        *result.get_mut(section) = section_text(raw, section.marker(), end_marker).to_string();
    }
    debug!(empty = result.is_empty(), "parse: done");
    result
}

/// Text between `start` and the next `end` found after it
///
/// The end marker is only searched for forward of the start marker. When it
/// is absent there (or `end` is `None`), the section runs to end of text.
fn section_text<'a>(raw: &'a str, start: &str, end: Option<&str>) -> &'a str {
    let Some(s) = raw.find(start) else {
        debug!(%start, "section_text: start marker not found");
        return "";
    };
    let content_start = s + start.len();
    let rest = &raw[content_start..];
    let content = match end.and_then(|e| rest.find(e)) {
        Some(offset) => &rest[..offset],
        None => rest,
    };
    content.trim()
}
