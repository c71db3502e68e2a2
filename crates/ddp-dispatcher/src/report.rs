//! Per-record outcomes of one notification.

use serde::Serialize;

use ddp_orchestrator::ExecutionHandle;
use ddp_storage::ObjectRef;

use crate::error::DispatchError;
use crate::event::Malformed;

/// Why a record was skipped without failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
  Malformed(Malformed),
  IgnoredSource { container: String },
  WorkflowNotFound { object: ObjectRef, workflow_name: String },
}

/// What happened to one record.
#[derive(Debug)]
pub enum RecordOutcome {
  /// The object was valid and one execution was started for it.
  Triggered {
    object: ObjectRef,
    execution: ExecutionHandle,
  },
  Skipped(SkipReason),
  Failed(DispatchError),
}

/// Outcomes of every record of a notification, in record order.
#[derive(Debug, Default)]
pub struct BatchReport {
  pub outcomes: Vec<RecordOutcome>,
}

impl BatchReport {
  pub fn triggered(&self) -> impl Iterator<Item = &ExecutionHandle> {
    self.outcomes.iter().filter_map(|o| match o {
      RecordOutcome::Triggered { execution, .. } => Some(execution),
      _ => None,
    })
  }

  pub fn skipped(&self) -> impl Iterator<Item = &SkipReason> {
    self.outcomes.iter().filter_map(|o| match o {
      RecordOutcome::Skipped(reason) => Some(reason),
      _ => None,
    })
  }

  pub fn failures(&self) -> impl Iterator<Item = &DispatchError> {
    self.outcomes.iter().filter_map(|o| match o {
      RecordOutcome::Failed(e) => Some(e),
      _ => None,
    })
  }

  pub fn is_success(&self) -> bool {
    self.failures().next().is_none()
  }

  /// Turn the report into the invocation result: an error if any record failed.
  pub fn into_result(self) -> Result<Self, DispatchError> {
    let failed = self.failures().count();
    if failed == 0 {
      return Ok(self);
    }
    Err(DispatchError::RecordsFailed {
      failed,
      total: self.outcomes.len(),
      retryable: self.failures().any(DispatchError::is_retryable),
    })
  }

  pub fn summary(&self) -> ReportSummary {
    let records: Vec<RecordSummary> = self
      .outcomes
      .iter()
      .enumerate()
      .map(|(index, outcome)| RecordSummary::new(index, outcome))
      .collect();

    ReportSummary {
      total: records.len(),
      triggered: self.triggered().count(),
      skipped: self.skipped().count(),
      failed: self.failures().count(),
      records,
    }
  }
}

/// Serializable view of a [`BatchReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
  pub total: usize,
  pub triggered: usize,
  pub skipped: usize,
  pub failed: usize,
  pub records: Vec<RecordSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
  pub index: usize,
  pub status: &'static str,
  pub detail: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub execution_id: Option<String>,
}

impl RecordSummary {
  fn new(index: usize, outcome: &RecordOutcome) -> Self {
    match outcome {
      RecordOutcome::Triggered { object, execution } => Self {
        index,
        status: "triggered",
        detail: object.to_string(),
        execution_id: Some(execution.execution_id.clone()),
      },
      RecordOutcome::Skipped(reason) => Self {
        index,
        status: "skipped",
        detail: match reason {
          SkipReason::Malformed(m) => format!("malformed record: {m}"),
          SkipReason::IgnoredSource { container } => {
            format!("ignored container '{container}'")
          }
          SkipReason::WorkflowNotFound {
            object,
            workflow_name,
          } => format!("workflow '{workflow_name}' not found for {object}"),
        },
        execution_id: None,
      },
      RecordOutcome::Failed(e) => Self {
        index,
        status: "failed",
        detail: e.to_string(),
        execution_id: None,
      },
    }
  }
}
