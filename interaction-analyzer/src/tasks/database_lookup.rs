use async_trait::async_trait;
use interaction_flow::{Context, NextAction, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::{error, info};

use super::session_keys;
use super::utils::{load_request, push_notice};
use crate::models::Notice;
use crate::ncbi::EntrezClient;

/// Looks the protein up in NCBI. A failed lookup is reported and the run
/// carries on to report generation.
pub struct DatabaseLookupTask {
    entrez: Arc<EntrezClient>,
}

impl DatabaseLookupTask {
    pub fn new(entrez: Arc<EntrezClient>) -> Self {
        Self { entrez }
    }
}

#[async_trait]
impl Task for DatabaseLookupTask {
    async fn run(&self, context: Context) -> Result<TaskResult> {
        info!("Fetching data from NCBI");

        let request = load_request(&context).await?;
        let database = self.entrez.default_database();

        match self
            .entrez
            .fetch_database_record(request.protein_name.trim(), database)
            .await
        {
            Ok(record) => {
                context.set(session_keys::DATABASE_RECORD, record).await?;
            }
            Err(e) => {
                error!(error = %e, database, "NCBI lookup failed");
                push_notice(&context, Notice::error("database_lookup", e.to_string())).await?;
            }
        }

        Ok(TaskResult::new_with_status(
            None,
            NextAction::ContinueAndExecute,
            Some("Database lookup finished".to_string()),
        ))
    }
}
