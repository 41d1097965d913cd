//! The nine blueprint sections
//!
//! Marker order is fixed: the parser, the tab bar and the export all iterate
//! [`Section::ALL`].

/// One of the nine blueprint sections, in marker order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    ProblemOverview,
    DetailedBreakdown,
    DatasetRequirements,
    ExpectedSolution,
    GenAiUseCases,
    RealLifeScenario,
    Flowcharts,
    JuryQuestions,
    PptSummary,
}

/// How a section body is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    /// Wrapped prose
    Text,
    /// Preformatted, whitespace preserved (ASCII diagrams, slide outlines)
    Code,
}

impl Section {
    pub const ALL: [Section; 9] = [
        Section::ProblemOverview,
        Section::DetailedBreakdown,
        Section::DatasetRequirements,
        Section::ExpectedSolution,
        Section::GenAiUseCases,
        Section::RealLifeScenario,
        Section::Flowcharts,
        Section::JuryQuestions,
        Section::PptSummary,
    ];

    /// Literal delimiter that opens this section in the model output
    pub fn marker(self) -> &'static str {
        match self {
            Self::ProblemOverview => "==== 1. PROBLEM OVERVIEW ====",
            Self::DetailedBreakdown => "==== 2. DETAILED BREAKDOWN ====",
            Self::DatasetRequirements => "==== 3. DATASET REQUIREMENTS ====",
            Self::ExpectedSolution => "==== 4. EXPECTED SOLUTION ====",
            Self::GenAiUseCases => "==== 5. GENAI USE CASES ====",
            Self::RealLifeScenario => "==== 6. REAL-LIFE SCENARIO ====",
            Self::Flowcharts => "==== 7. FLOWCHARTS & ARCHITECTURE ====",
            Self::JuryQuestions => "==== 8. JURY QUESTIONS ====",
            Self::PptSummary => "==== 9. PPT SUMMARY GENERATOR ====",
        }
    }

    /// Short stable identifier, used for tab commands and file names
    pub fn tab_id(self) -> &'static str {
        match self {
            Self::ProblemOverview => "overview",
            Self::DetailedBreakdown => "breakdown",
            Self::DatasetRequirements => "dataset",
            Self::ExpectedSolution => "solution",
            Self::GenAiUseCases => "genai",
            Self::RealLifeScenario => "scenario",
            Self::Flowcharts => "flowcharts",
            Self::JuryQuestions => "jury",
            Self::PptSummary => "ppt",
        }
    }

    /// Human-readable tab label
    pub fn label(self) -> &'static str {
        match self {
            Self::ProblemOverview => "Problem Overview",
            Self::DetailedBreakdown => "Detailed Breakdown",
            Self::DatasetRequirements => "Dataset Requirements",
            Self::ExpectedSolution => "Expected Solution",
            Self::GenAiUseCases => "GenAI Use Cases",
            Self::RealLifeScenario => "Real-Life Scenario",
            Self::Flowcharts => "Flows & Architecture",
            Self::JuryQuestions => "Jury Questions",
            Self::PptSummary => "PPT Summary",
        }
    }

    pub fn render_style(self) -> RenderStyle {
        match self {
            Self::Flowcharts | Self::PptSummary => RenderStyle::Code,
            _ => RenderStyle::Text,
        }
    }

    /// Zero-based position in marker order
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The section after this one, wrapping around
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// The section before this one, wrapping around
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}
