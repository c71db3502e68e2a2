use std::time::Duration;

/// Errors that can occur while starting an execution.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
  /// The execution input could not be serialized.
  #[error("failed to serialize execution input: {0}")]
  InputSerialization(#[from] serde_json::Error),

  /// The orchestration service rejected or failed the start request.
  #[error("failed to start execution of workflow '{workflow_id}': {source}")]
  Start {
    workflow_id: String,
    #[source]
    source: ddp_orchestrator::Error,
  },

  /// The start request did not finish in time.
  #[error("starting execution of workflow '{workflow_id}' timed out after {timeout:?}")]
  Timeout {
    workflow_id: String,
    timeout: Duration,
  },
}
