use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the user asked for. Built once per submission and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRequest {
    pub protein_name: String,
    pub structure_id: Option<String>,
    pub drug_name: String,
    pub interaction_type: String,
}

impl InteractionRequest {
    /// Fields are kept literally; only a blank structure id collapses to `None`.
    pub fn new(
        protein_name: impl Into<String>,
        structure_id: Option<String>,
        drug_name: impl Into<String>,
        interaction_type: impl Into<String>,
    ) -> Self {
        Self {
            protein_name: protein_name.into(),
            structure_id: structure_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            drug_name: drug_name.into(),
            interaction_type: interaction_type.into(),
        }
    }
}

/// Fields posted by the HTML form and the JSON API.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub protein: String,
    #[serde(default)]
    pub pdb_id: Option<String>,
    #[serde(default)]
    pub drug: String,
    #[serde(default)]
    pub interaction_type: String,
    /// Overrides GROQ_API_KEY for this submission only
    #[serde(default)]
    pub api_key: Option<String>,
}

impl AnalyzeForm {
    pub fn to_request(&self) -> InteractionRequest {
        InteractionRequest::new(
            self.protein.clone(),
            self.pdb_id.clone(),
            self.drug.clone(),
            self.interaction_type.clone(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A user-visible message emitted by one workflow step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub step: String,
    pub message: String,
}

impl Notice {
    pub fn warning(step: &str, message: impl Into<String>) -> Self {
        Self::with_level(NoticeLevel::Warning, step, message)
    }

    pub fn error(step: &str, message: impl Into<String>) -> Self {
        Self::with_level(NoticeLevel::Error, step, message)
    }

    fn with_level(level: NoticeLevel, step: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            step: step.to_string(),
            message: message.into(),
        }
    }
}

/// Embeddable viewer fragment for one structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureView {
    pub structure_id: String,
    pub html: String,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Halted,
}

/// Everything one workflow run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionOutcome {
    pub run_id: String,
    pub status: RunStatus,
    pub request: InteractionRequest,
    pub database_record: Option<Value>,
    pub report: Option<String>,
    pub structure_view: Option<StructureView>,
    pub notices: Vec<Notice>,
    pub steps: Vec<String>,
}

impl InteractionOutcome {
    pub fn has_errors(&self) -> bool {
        self.notices.iter().any(|n| n.level == NoticeLevel::Error)
    }
}
