use async_trait::async_trait;
use interaction_flow::{Context, GraphError, NextAction, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::session_keys;
use super::utils::{load_request, push_notice};
use crate::models::Notice;
use crate::viewer::StructureRenderer;

pub const NO_STRUCTURE_MESSAGE: &str = "No PDB ID provided for 3D structure.";

/// Only reached when the request carries a structure id.
pub struct StructureRenderTask {
    renderer: Arc<dyn StructureRenderer>,
}

impl StructureRenderTask {
    pub fn new(renderer: Arc<dyn StructureRenderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl Task for StructureRenderTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        let request = load_request(&context).await?;
        let structure_id = request.structure_id.ok_or_else(|| {
            GraphError::TaskExecutionFailed("structure render reached without a PDB ID".to_string())
        })?;

        info!(%structure_id, "Displaying 3D structure");

        match self.renderer.render(&structure_id) {
            Ok(view) => {
                context.set(session_keys::STRUCTURE_VIEW, view).await?;
            }
            Err(e) => {
                error!(error = %e, %structure_id, "structure rendering failed");
                push_notice(&context, Notice::error("structure_render", e.to_string())).await?;
            }
        }

        Ok(TaskResult::new_with_status(
            None,
            NextAction::End,
            Some("Interaction analysis finished".to_string()),
        ))
    }
}

pub struct StructureSkippedTask;

#[async_trait]
impl Task for StructureSkippedTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        warn!("no PDB ID supplied, skipping viewer");
        push_notice(&context, Notice::warning("structure_render", NO_STRUCTURE_MESSAGE)).await?;

        Ok(TaskResult::new_with_status(
            None,
            NextAction::End,
            Some("Interaction analysis finished without a structure".to_string()),
        ))
    }
}
