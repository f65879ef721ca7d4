use serde::{Deserialize, Serialize};
use tracing::warn;

/// Deployment flavour of the question-answering pipeline.
///
/// Both profiles share one pipeline; they differ in prompt wording, in whether
/// the LLM provider and key are entered in the UI, and in post-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineProfile {
    /// `decisions` table; provider resolved from the environment.
    #[default]
    Decisions,
    /// `dusturia_records` table; provider and API key entered in the sidebar,
    /// COUNT queries answered without a second LLM call.
    Dusturia,
}

impl PipelineProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineProfile::Decisions => "decisions",
            PipelineProfile::Dusturia => "dusturia",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "decisions" => PipelineProfile::Decisions,
            "dusturia" | "dusturia_records" => PipelineProfile::Dusturia,
            unknown => {
                warn!(
                    "Unknown pipeline profile '{}', defaulting to decisions",
                    unknown
                );
                PipelineProfile::Decisions
            }
        }
    }

    /// Whether the sidebar asks for the provider and API key.
    pub fn prompts_for_api_key(&self) -> bool {
        matches!(self, PipelineProfile::Dusturia)
    }

    pub fn counts_shortcut(&self) -> bool {
        matches!(self, PipelineProfile::Dusturia)
    }
}

impl std::fmt::Display for PipelineProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
