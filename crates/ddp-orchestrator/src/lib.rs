//! ddp Orchestrator
//!
//! This crate provides the workflow orchestration capability the pipeline
//! talks to: a registry of named workflows that can be listed page by page,
//! and a way to start a new execution of one of them with a JSON input.
//!
//! The [`WorkflowService`] trait defines two operations:
//! - Listing registered workflows, paginated with an opaque continuation token
//! - Starting an execution without waiting for it to finish
//!
//! [`SqliteWorkflowService`] persists workflows and executions in SQLite.
//! [`MemoryWorkflowService`] keeps them in memory.

mod memory;
mod sqlite;
mod types;

pub use memory::MemoryWorkflowService;
pub use sqlite::SqliteWorkflowService;
pub use types::{
  Execution, ExecutionHandle, ExecutionStatus, StartExecution, WorkflowDescriptor, WorkflowPage,
};

use async_trait::async_trait;

/// Error type for orchestration service operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// No workflow is registered under this identifier.
  #[error("workflow not found: {0}")]
  WorkflowNotFound(String),

  /// An execution with this name already exists with a different input.
  #[error("execution '{name}' already exists for workflow {workflow_id} with a different input")]
  ExecutionAlreadyExists { workflow_id: String, name: String },

  /// The continuation token was not produced by this service.
  #[error("invalid pagination token: {0}")]
  InvalidToken(String),

  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  /// Schema migration failed.
  #[error("migration error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Orchestration service trait.
#[async_trait]
pub trait WorkflowService: Send + Sync {
  /// List one page of registered workflows.
  ///
  /// Pass `None` for the first page and the returned `next_token` for the
  /// following ones. A page without `next_token` is the last page.
  async fn list_workflows(&self, next_token: Option<&str>) -> Result<WorkflowPage, Error>;

  /// Start a new execution.
  ///
  /// Returns once the execution is accepted; it does not wait for it to
  /// finish. When `request.name` is set and an execution with that name
  /// already exists for the workflow, the existing execution is returned if
  /// the input matches, and [`Error::ExecutionAlreadyExists`] otherwise.
  async fn start_execution(&self, request: StartExecution) -> Result<ExecutionHandle, Error>;
}

/// Build the identifier of an execution from its workflow and name.
pub(crate) fn execution_id(workflow_id: &str, name: &str) -> String {
  format!("{workflow_id}:{name}")
}
