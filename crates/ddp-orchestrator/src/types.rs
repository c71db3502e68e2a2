use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered workflow as returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WorkflowDescriptor {
  pub workflow_id: String,
  pub name: String,
}

/// One page of a workflow listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPage {
  pub workflows: Vec<WorkflowDescriptor>,
  pub next_token: Option<String>,
}

/// Request to start a workflow execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartExecution {
  pub workflow_id: String,
  /// JSON text passed verbatim to the execution.
  pub input: String,
  /// Optional unique name; a random one is generated when absent.
  pub name: Option<String>,
}

/// Status of a workflow execution.
///
/// Executions are only ever started here; nothing reports their completion
/// back, so every recorded execution stays `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ExecutionStatus {
  Running,
}

/// Returned when an execution has been accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionHandle {
  pub execution_id: String,
  pub workflow_id: String,
  pub name: String,
  pub started_at: DateTime<Utc>,
}

/// A workflow execution as stored by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Execution {
  pub execution_id: String,
  pub workflow_id: String,
  pub name: String,
  pub input: String,
  pub status: ExecutionStatus,
  pub started_at: DateTime<Utc>,
}

impl Execution {
  pub fn handle(&self) -> ExecutionHandle {
    ExecutionHandle {
      execution_id: self.execution_id.clone(),
      workflow_id: self.workflow_id.clone(),
      name: self.name.clone(),
      started_at: self.started_at,
    }
  }
}
