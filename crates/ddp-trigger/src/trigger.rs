use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument, warn};

use ddp_orchestrator::{ExecutionHandle, StartExecution, WorkflowService};

use crate::error::TriggerError;
use crate::input::{ExecutionInput, execution_name};

/// How execution names are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionNaming {
  /// Let the service generate a unique name; redeliveries start new runs.
  #[default]
  Generated,
  /// Derive the name from the object identity; see [`execution_name`].
  /// Objects without a version token fall back to generated names.
  Deterministic,
}

/// Starts workflow executions.
pub struct ExecutionTrigger {
  service: Arc<dyn WorkflowService>,
  call_timeout: Duration,
  naming: ExecutionNaming,
}

impl ExecutionTrigger {
  /// Create a new trigger. Each start request is bounded by `call_timeout`.
  pub fn new(service: Arc<dyn WorkflowService>, call_timeout: Duration) -> Self {
    Self {
      service,
      call_timeout,
      naming: ExecutionNaming::default(),
    }
  }

  pub fn with_naming(mut self, naming: ExecutionNaming) -> Self {
    self.naming = naming;
    self
  }

  /// Start one execution of `workflow_id` for the object at `bucket`/`key`.
  pub async fn start(
    &self,
    workflow_id: &str,
    bucket: &str,
    key: &str,
  ) -> Result<ExecutionHandle, TriggerError> {
    self.start_versioned(workflow_id, bucket, key, None).await
  }

  /// Like [`ExecutionTrigger::start`], with the object revision used for
  /// deterministic naming.
  #[instrument(name = "execution_start", skip(self, version))]
  pub async fn start_versioned(
    &self,
    workflow_id: &str,
    bucket: &str,
    key: &str,
    version: Option<&str>,
  ) -> Result<ExecutionHandle, TriggerError> {
    let result = self.start_inner(workflow_id, bucket, key, version).await;

    match &result {
      Ok(handle) => {
        info!(execution_id = %handle.execution_id, "execution started");
      }
      Err(e) => {
        error!(error = %e, "failed to start execution");
      }
    }

    result
  }

  async fn start_inner(
    &self,
    workflow_id: &str,
    bucket: &str,
    key: &str,
    version: Option<&str>,
  ) -> Result<ExecutionHandle, TriggerError> {
    let input = ExecutionInput::new(bucket, key).to_json()?;
    let name = match self.naming {
      ExecutionNaming::Generated => None,
      ExecutionNaming::Deterministic => match version {
        Some(version) => Some(execution_name(bucket, key, version)),
        None => {
          warn!("object has no version token, using a generated execution name");
          None
        }
      },
    };

    let request = StartExecution {
      workflow_id: workflow_id.to_string(),
      input,
      name,
    };

    tokio::time::timeout(self.call_timeout, self.service.start_execution(request))
      .await
      .map_err(|_| TriggerError::Timeout {
        workflow_id: workflow_id.to_string(),
        timeout: self.call_timeout,
      })?
      .map_err(|source| TriggerError::Start {
        workflow_id: workflow_id.to_string(),
        source,
      })
  }
}
