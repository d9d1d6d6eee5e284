use thiserror::Error;

/// Failures of the individual interaction steps.
///
/// None of these abort a run: each step turns them into a user-visible
/// notice and the workflow moves on.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("{0}")]
    Validation(String),

    #[error("Error fetching NCBI data: {0}")]
    NetworkFailure(String),

    #[error("No API key provided. Set GROQ_API_KEY or enter a key in the form.")]
    Unconfigured,

    #[error("Error analyzing interaction: {0}")]
    ApiFailure(String),

    #[error("Invalid PDB ID '{0}': expected 1-16 letters, digits or underscores")]
    InvalidStructureId(String),
}

impl From<reqwest::Error> for AnalyzerError {
    fn from(e: reqwest::Error) -> Self {
        AnalyzerError::NetworkFailure(e.to_string())
    }
}
