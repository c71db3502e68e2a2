use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
  Error, Execution, ExecutionHandle, ExecutionStatus, StartExecution, WorkflowDescriptor,
  WorkflowPage, WorkflowService, execution_id,
};

#[derive(Debug, Default)]
struct State {
  workflows: Vec<WorkflowDescriptor>,
  executions: Vec<Execution>,
}

/// In-memory workflow service.
///
/// Listings are paginated with the index of the next workflow as the token.
/// Suitable for tests and local runs.
#[derive(Debug)]
pub struct MemoryWorkflowService {
  state: Mutex<State>,
  page_size: usize,
}

impl Default for MemoryWorkflowService {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryWorkflowService {
  pub fn new() -> Self {
    Self {
      state: Mutex::new(State::default()),
      page_size: crate::sqlite::DEFAULT_PAGE_SIZE as usize,
    }
  }

  pub fn with_page_size(mut self, page_size: usize) -> Self {
    self.page_size = page_size.max(1);
    self
  }

  /// Register a workflow with a caller-chosen identifier.
  pub async fn register(&self, workflow_id: &str, name: &str) -> WorkflowDescriptor {
    let workflow = WorkflowDescriptor {
      workflow_id: workflow_id.to_string(),
      name: name.to_string(),
    };
    self.state.lock().await.workflows.push(workflow.clone());
    workflow
  }

  /// All executions started so far, oldest first.
  pub async fn executions(&self) -> Vec<Execution> {
    self.state.lock().await.executions.clone()
  }
}

#[async_trait]
impl WorkflowService for MemoryWorkflowService {
  async fn list_workflows(&self, next_token: Option<&str>) -> Result<WorkflowPage, Error> {
    let start = match next_token {
      Some(token) => token
        .parse::<usize>()
        .map_err(|_| Error::InvalidToken(token.to_string()))?,
      None => 0,
    };

    let state = self.state.lock().await;
    let end = (start + self.page_size).min(state.workflows.len());
    let workflows = state.workflows.get(start..end).unwrap_or_default().to_vec();
    let next_token = (end < state.workflows.len()).then(|| end.to_string());

    Ok(WorkflowPage {
      workflows,
      next_token,
    })
  }

  async fn start_execution(&self, request: StartExecution) -> Result<ExecutionHandle, Error> {
    let mut state = self.state.lock().await;
    if !state
      .workflows
      .iter()
      .any(|w| w.workflow_id == request.workflow_id)
    {
      return Err(Error::WorkflowNotFound(request.workflow_id));
    }

    let name = request
      .name
      .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    if let Some(existing) = state
      .executions
      .iter()
      .find(|e| e.workflow_id == request.workflow_id && e.name == name)
    {
      if existing.input != request.input {
        return Err(Error::ExecutionAlreadyExists {
          workflow_id: request.workflow_id,
          name,
        });
      }
      return Ok(existing.handle());
    }

    let execution = Execution {
      execution_id: execution_id(&request.workflow_id, &name),
      workflow_id: request.workflow_id,
      name,
      input: request.input,
      status: ExecutionStatus::Running,
      started_at: Utc::now(),
    };
    let handle = execution.handle();
    state.executions.push(execution);
    Ok(handle)
  }
}
