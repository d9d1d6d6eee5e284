use async_trait::async_trait;
use interaction_flow::{Context, NextAction, Result, Task, TaskResult};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::session_keys;
use super::utils::{load_request, push_notice};
use crate::config::GenerationSettings;
use crate::error::AnalyzerError;
use crate::llm::{TextGenerator, build_report_request};
use crate::models::Notice;

/// Ask the text model for an interaction report.
///
/// Without a credential this fails with [`AnalyzerError::Unconfigured`]
/// before anything is sent.
pub async fn generate_interaction_report(
    generator: &dyn TextGenerator,
    settings: &GenerationSettings,
    credential: Option<&SecretString>,
    protein: &str,
    drug: &str,
    interaction_type: &str,
) -> std::result::Result<String, AnalyzerError> {
    let credential = credential.ok_or(AnalyzerError::Unconfigured)?;
    let request = build_report_request(settings, protein, drug, interaction_type);
    generator.generate(credential, &request).await
}

pub struct ReportGenerationTask {
    generator: Arc<dyn TextGenerator>,
    settings: GenerationSettings,
    credential: Option<SecretString>,
}

impl ReportGenerationTask {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        settings: GenerationSettings,
        credential: Option<SecretString>,
    ) -> Self {
        Self {
            generator,
            settings,
            credential,
        }
    }
}

#[async_trait]
impl Task for ReportGenerationTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        info!("Analyzing interaction");

        let request = load_request(&context).await?;

        let outcome = generate_interaction_report(
            self.generator.as_ref(),
            &self.settings,
            self.credential.as_ref(),
            &request.protein_name,
            &request.drug_name,
            &request.interaction_type,
        )
        .await;

        match outcome {
            Ok(report) => {
                info!(chars = report.len(), "interaction report generated");
                context.set(session_keys::REPORT, report).await?;
            }
            Err(AnalyzerError::Unconfigured) => {
                warn!("no API key available, skipping report generation");
                let message = AnalyzerError::Unconfigured.to_string();
                push_notice(&context, Notice::error("report_generation", message)).await?;
            }
            Err(e) => {
                error!(error = %e, "report generation failed");
                push_notice(&context, Notice::error("report_generation", e.to_string())).await?;
            }
        }

        Ok(TaskResult::new_with_status(
            None,
            NextAction::ContinueAndExecute,
            Some("Report generation finished".to_string()),
        ))
    }
}
