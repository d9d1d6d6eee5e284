use async_trait::async_trait;
use interaction_flow::{Context, NextAction, Result, Task, TaskResult};
use tracing::{info, warn};

use super::utils::{load_request, push_notice};
use crate::error::AnalyzerError;
use crate::models::{InteractionRequest, Notice};

pub const MISSING_FIELDS_MESSAGE: &str = "Please provide both protein and drug information.";

pub fn validate_request(request: &InteractionRequest) -> std::result::Result<(), AnalyzerError> {
    if request.protein_name.trim().is_empty() || request.drug_name.trim().is_empty() {
        return Err(AnalyzerError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
    }
    Ok(())
}

/// Stops the run before any network call when protein or drug is blank.
pub struct ValidateRequestTask;

#[async_trait]
impl Task for ValidateRequestTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        info!("running task: {}", self.id());

        let request = load_request(&context).await?;

        if let Err(e) = validate_request(&request) {
            warn!(error = %e, "rejecting interaction request");
            push_notice(&context, Notice::warning("validate", e.to_string())).await?;
            return Ok(TaskResult::new_with_status(
                None,
                NextAction::Halt,
                Some(e.to_string()),
            ));
        }

        Ok(TaskResult::new_with_status(
            None,
            NextAction::ContinueAndExecute,
            Some("Request accepted".to_string()),
        ))
    }
}
