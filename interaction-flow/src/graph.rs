use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    context::Context,
    error::{GraphError, Result},
    task::{NextAction, Task, TaskResult},
};

/// Upper bound on task executions per run, guards against cyclic edges.
pub const DEFAULT_STEP_LIMIT: usize = 64;

/// Type alias for edge condition functions
pub type EdgeCondition = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

/// Outgoing route of a task
#[derive(Clone)]
enum Edge {
    Direct(String),
    Conditional {
        condition: EdgeCondition,
        yes: String,
        no: String,
    },
}

/// An immutable graph of tasks, built with [`GraphBuilder`].
pub struct Graph {
    pub id: String,
    tasks: HashMap<String, Arc<dyn Task>>,
    edges: HashMap<String, Edge>,
    start_task_id: Option<String>,
    step_limit: usize,
}

impl Graph {
    /// Run the graph from its start task until a task ends or halts the run,
    /// or until a task continues without an outgoing edge.
    pub async fn execute(&self, context: Context) -> Result<ExecutionResult> {
        let mut current = self
            .start_task_id
            .clone()
            .ok_or_else(|| GraphError::MissingStartTask(self.id.clone()))?;
        let mut executed = Vec::new();

        loop {
            if executed.len() >= self.step_limit {
                return Err(GraphError::StepLimitExceeded {
                    graph_id: self.id.clone(),
                    limit: self.step_limit,
                });
            }

            let result = self.execute_single_task(&current, context.clone()).await?;
            executed.push(result.task_id.clone());

            match result.next_action.clone() {
                NextAction::ContinueAndExecute => match self.find_next_task(&current, &context) {
                    Some(next_task_id) => {
                        debug!(from = %current, to = %next_task_id, "following edge");
                        current = next_task_id;
                    }
                    None => return Ok(Self::finish(result, ExecutionStatus::Completed, executed)),
                },
                NextAction::End => {
                    return Ok(Self::finish(result, ExecutionStatus::Completed, executed));
                }
                NextAction::Halt => {
                    info!(task_id = %result.task_id, "run halted");
                    let status = ExecutionStatus::Halted(result.task_id.clone());
                    return Ok(Self::finish(result, status, executed));
                }
            }
        }
    }

    fn finish(result: TaskResult, status: ExecutionStatus, executed: Vec<String>) -> ExecutionResult {
        ExecutionResult {
            response: result.response,
            status,
            status_message: result.status_message,
            executed,
        }
    }

    async fn execute_single_task(&self, task_id: &str, context: Context) -> Result<TaskResult> {
        let task = self
            .tasks
            .get(task_id)
            .ok_or_else(|| GraphError::TaskNotFound(task_id.to_string()))?;

        let mut result = task.run(context).await?;

        // Set the task_id in the result to track which task generated it
        result.task_id = task_id.to_string();

        Ok(result)
    }

    /// Find the next task based on edges and conditions
    pub fn find_next_task(&self, current_task_id: &str, context: &Context) -> Option<String> {
        match self.edges.get(current_task_id)? {
            Edge::Direct(to) => Some(to.clone()),
            Edge::Conditional { condition, yes, no } => {
                if condition(context) {
                    Some(yes.clone())
                } else {
                    Some(no.clone())
                }
            }
        }
    }

    /// Get the start task ID
    pub fn start_task_id(&self) -> Option<&str> {
        self.start_task_id.as_deref()
    }
}

/// Builder for creating graphs
pub struct GraphBuilder {
    id: String,
    tasks: HashMap<String, Arc<dyn Task>>,
    edges: HashMap<String, Edge>,
    start_task_id: Option<String>,
    step_limit: usize,
}

impl GraphBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tasks: HashMap::new(),
            edges: HashMap::new(),
            start_task_id: None,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Add a task; the first task added becomes the start task.
    pub fn add_task(mut self, task: Arc<dyn Task>) -> Self {
        let task_id = task.id().to_string();
        if self.start_task_id.is_none() {
            self.start_task_id = Some(task_id.clone());
        }
        self.tasks.insert(task_id, task);
        self
    }

    /// Add an unconditional edge. A task has at most one outgoing route;
    /// adding another replaces it.
    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.insert(from.into(), Edge::Direct(to.into()));
        self
    }

    /// Route to `yes` when `condition` holds for the context, otherwise to `no`.
    pub fn add_conditional_edge<F>(
        mut self,
        from: impl Into<String>,
        condition: F,
        yes: impl Into<String>,
        no: impl Into<String>,
    ) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        self.edges.insert(
            from.into(),
            Edge::Conditional {
                condition: Arc::new(condition),
                yes: yes.into(),
                no: no.into(),
            },
        );
        self
    }

    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn build(self) -> Graph {
        Graph {
            id: self.id,
            tasks: self.tasks,
            edges: self.edges,
            start_task_id: self.start_task_id,
            step_limit: self.step_limit,
        }
    }
}

/// Outcome of a full graph run
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Response of the last task that ran
    pub response: Option<String>,
    pub status: ExecutionStatus,
    pub status_message: Option<String>,
    /// Task ids in execution order
    pub executed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Workflow completed successfully
    Completed,
    /// A task stopped the run early
    Halted(String),
}
