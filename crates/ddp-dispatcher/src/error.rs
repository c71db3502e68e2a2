use std::time::Duration;

use ddp_storage::ObjectRef;

/// Errors raised while handling a notification.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
  /// The notification payload is not valid JSON for [`crate::Notification`].
  #[error("invalid notification: {0}")]
  InvalidEvent(#[from] serde_json::Error),

  /// The object failed structural validation.
  #[error("invalid object {object}: {reason}")]
  Validation { object: ObjectRef, reason: String },

  /// Reading the object failed.
  #[error("failed to read {object}: {source}")]
  Storage {
    object: ObjectRef,
    #[source]
    source: ddp_storage::Error,
  },

  /// Reading the object did not finish in time.
  #[error("reading {object} timed out after {timeout:?}")]
  Timeout { object: ObjectRef, timeout: Duration },

  #[error(transparent)]
  Resolve(#[from] ddp_resolver::ResolveError),

  #[error(transparent)]
  Trigger(#[from] ddp_trigger::TriggerError),

  /// One or more records of a notification failed.
  #[error("{failed} of {total} records failed")]
  RecordsFailed {
    failed: usize,
    total: usize,
    retryable: bool,
  },
}

impl DispatchError {
  /// Whether redelivering the same notification may succeed.
  ///
  /// Infrastructure failures are retryable; a malformed object or
  /// notification fails the same way every time.
  pub fn is_retryable(&self) -> bool {
    match self {
      DispatchError::InvalidEvent(_) | DispatchError::Validation { .. } => false,
      DispatchError::Storage { .. }
      | DispatchError::Timeout { .. }
      | DispatchError::Resolve(_)
      | DispatchError::Trigger(_) => true,
      DispatchError::RecordsFailed { retryable, .. } => *retryable,
    }
  }
}
