//! FlowRunner – shares one graph across requests and executes a whole run per call.
//!
//! Each call gets its own [`Context`]; nothing is kept between runs. The run is
//! wrapped in a `flow_run` tracing span carrying the caller's run id, so every
//! task log line can be tied back to the request that triggered it.

use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, error, info, info_span};

use crate::{
    context::Context,
    error::Result,
    graph::{ExecutionResult, Graph},
};

/// Cheap-to-clone handle around an `Arc<Graph>`.
#[derive(Clone)]
pub struct FlowRunner {
    graph: Arc<Graph>,
}

impl FlowRunner {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Execute the graph from its start task with the given context.
    pub async fn run(&self, run_id: &str, context: Context) -> Result<ExecutionResult> {
        let span = info_span!("flow_run", graph_id = %self.graph.id, run_id = %run_id);
        let graph = self.graph.clone();

        async move {
            let started = Instant::now();
            info!("starting run");

            let result = graph.execute(context).await;
            match &result {
                Ok(execution) => info!(
                    status = ?execution.status,
                    steps = execution.executed.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "run finished"
                ),
                Err(e) => error!(error = %e, "run failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}
