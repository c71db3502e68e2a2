use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use serde_json::Value;
use tracing::{Instrument, debug, error, field, info, info_span, instrument, warn};

use ddp_config::PipelineConfig;
use ddp_orchestrator::{ExecutionHandle, WorkflowService};
use ddp_resolver::{Resolver, ServiceResolver};
use ddp_storage::{ObjectRef, ObjectStore, read_first_line};
use ddp_tabular::{FormatValidator, ValidationOutcome};
use ddp_trigger::{ExecutionNaming, ExecutionTrigger};

use crate::error::DispatchError;
use crate::event::{IncomingObject, Notification};
use crate::report::{BatchReport, RecordOutcome, SkipReason};

/// Handles object-creation notifications.
///
/// Clients are constructed once per process and shared by reference across
/// invocations; the dispatcher itself holds no per-invocation state.
pub struct EventDispatcher {
  store: Arc<dyn ObjectStore>,
  resolver: Arc<dyn Resolver>,
  trigger: ExecutionTrigger,
  validator: FormatValidator,
  source_container: String,
  workflow_name: String,
  call_timeout: Duration,
  max_concurrent_records: usize,
  max_header_bytes: usize,
}

impl EventDispatcher {
  /// Create a dispatcher from a validated config and the two capabilities.
  pub fn new(
    config: &PipelineConfig,
    store: Arc<dyn ObjectStore>,
    service: Arc<dyn WorkflowService>,
  ) -> Self {
    let naming = if config.deterministic_execution_names {
      ExecutionNaming::Deterministic
    } else {
      ExecutionNaming::Generated
    };

    Self {
      store,
      resolver: Arc::new(ServiceResolver::new(service.clone(), config.call_timeout())),
      trigger: ExecutionTrigger::new(service, config.call_timeout()).with_naming(naming),
      validator: FormatValidator::new(config.expected_columns),
      source_container: config.source_container.clone(),
      workflow_name: config.workflow_name.clone(),
      call_timeout: config.call_timeout(),
      max_concurrent_records: config.max_concurrent_records.max(1),
      max_header_bytes: config.max_header_bytes,
    }
  }

  /// Replace the workflow resolver.
  pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
    self.resolver = resolver;
    self
  }

  /// Parse a JSON notification and dispatch it.
  pub async fn dispatch_json(&self, payload: &str) -> Result<BatchReport, DispatchError> {
    let notification = Notification::from_json(payload).map_err(|e| {
      error!(error = %e, "failed to parse notification");
      DispatchError::InvalidEvent(e)
    })?;
    Ok(self.dispatch(&notification).await)
  }

  /// Dispatch every record of a notification.
  ///
  /// Records are processed in order, up to `max_concurrent_records` at a
  /// time. The report holds one outcome per record, in record order.
  #[instrument(name = "dispatch", skip_all)]
  pub async fn dispatch(&self, notification: &Notification) -> BatchReport {
    let Some(records) = notification.records.as_ref() else {
      warn!("notification has no records field");
      return BatchReport::default();
    };
    if records.is_empty() {
      warn!("notification has no records");
      return BatchReport::default();
    }

    info!(records = records.len(), "notification received");

    let outcomes: Vec<RecordOutcome> = futures::stream::iter(records.iter().enumerate())
      .map(|(index, record)| {
        self
          .process(record)
          .instrument(info_span!("record", index))
      })
      .buffered(self.max_concurrent_records)
      .collect()
      .await;

    let report = BatchReport { outcomes };
    let summary = report.summary();
    info!(
      total = summary.total,
      triggered = summary.triggered,
      skipped = summary.skipped,
      failed = summary.failed,
      "notification processed"
    );
    report
  }

  async fn process(&self, record: &Value) -> RecordOutcome {
    let incoming = match IncomingObject::from_value(record) {
      Ok(incoming) => incoming,
      Err(reason) => {
        warn!(%reason, "skipping malformed record");
        return RecordOutcome::Skipped(SkipReason::Malformed(reason));
      }
    };

    let container = incoming.object.container();
    if container != self.source_container {
      info!(container, "ignoring record from non-source container");
      return RecordOutcome::Skipped(SkipReason::IgnoredSource {
        container: container.to_string(),
      });
    }

    match self.trigger_object(&incoming).await {
      Ok(Some(execution)) => RecordOutcome::Triggered {
        object: incoming.object,
        execution,
      },
      Ok(None) => {
        warn!(
          object = %incoming.object,
          workflow_name = %self.workflow_name,
          "workflow not found, skipping object"
        );
        RecordOutcome::Skipped(SkipReason::WorkflowNotFound {
          object: incoming.object,
          workflow_name: self.workflow_name.clone(),
        })
      }
      Err(e) => {
        error!(
          object = %incoming.object,
          error = %e,
          retryable = e.is_retryable(),
          "record failed"
        );
        RecordOutcome::Failed(e)
      }
    }
  }

  /// Validate the object and start its workflow.
  ///
  /// Returns `Ok(None)` when the configured workflow is not registered.
  async fn trigger_object(
    &self,
    incoming: &IncomingObject,
  ) -> Result<Option<ExecutionHandle>, DispatchError> {
    let object = &incoming.object;

    let header = tokio::time::timeout(self.call_timeout, self.read_header(object))
      .await
      .map_err(|_| DispatchError::Timeout {
        object: object.clone(),
        timeout: self.call_timeout,
      })?
      .map_err(|source| DispatchError::Storage {
        object: object.clone(),
        source,
      })?;

    self.validate_header(object, header.as_deref())?;

    let Some(workflow) = self.resolver.resolve(&self.workflow_name).await? else {
      return Ok(None);
    };

    let execution = self
      .trigger
      .start_versioned(
        &workflow.workflow_id,
        object.container(),
        object.key(),
        incoming.version.as_deref(),
      )
      .await?;

    Ok(Some(execution))
  }

  /// Only the header line is transferred; validation never looks further.
  /// `None` means the line is longer than `max_header_bytes`.
  async fn read_header(
    &self,
    object: &ObjectRef,
  ) -> Result<Option<Bytes>, ddp_storage::Error> {
    let stream = self.store.get(object).await?;
    read_first_line(stream, self.max_header_bytes).await
  }

  fn validate_header(
    &self,
    object: &ObjectRef,
    header: Option<&[u8]>,
  ) -> Result<(), DispatchError> {
    let span = info_span!(
      "csv_validation",
      %object,
      valid = field::Empty,
      reason = field::Empty
    );

    span.in_scope(|| {
      let outcome = match header {
        Some(header) => self.validator.validate_bytes(header),
        None => ValidationOutcome::Invalid {
          reason: format!("header line exceeds {} bytes", self.max_header_bytes),
        },
      };

      match outcome {
        ValidationOutcome::Valid => {
          span.record("valid", true);
          debug!("object header valid");
          Ok(())
        }
        ValidationOutcome::Invalid { reason } => {
          span.record("valid", false);
          span.record("reason", field::display(&reason));
          warn!(%reason, "object header invalid");
          Err(DispatchError::Validation {
            object: object.clone(),
            reason,
          })
        }
      }
    })
  }
}
