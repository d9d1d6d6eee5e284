use thiserror::Error;

/// Errors raised by the workflow engine itself.
///
/// Task-level failures that a workflow wants to survive should be handled
/// inside the task; anything returned as a `GraphError` aborts the run.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Task execution failed: {0}")]
    TaskExecutionFailed(String),

    #[error("Context error: {0}")]
    ContextError(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Graph '{0}' has no start task")]
    MissingStartTask(String),

    #[error("Graph '{graph_id}' exceeded {limit} steps")]
    StepLimitExceeded { graph_id: String, limit: usize },
}

pub type Result<T> = std::result::Result<T, GraphError>;
