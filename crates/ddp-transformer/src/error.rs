use std::time::Duration;

use ddp_storage::ObjectRef;

/// Errors that can occur during a conversion.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
  /// The step input could not be parsed.
  #[error("invalid conversion input: {0}")]
  InvalidInput(#[from] serde_json::Error),

  /// A required input field is absent or empty.
  #[error("conversion input is missing '{0}'")]
  MissingField(&'static str),

  /// Reading the source object failed.
  #[error("failed to read {object}: {source}")]
  Read {
    object: ObjectRef,
    #[source]
    source: ddp_storage::Error,
  },

  /// Writing the converted object failed.
  #[error("failed to write {object}: {source}")]
  Write {
    object: ObjectRef,
    #[source]
    source: ddp_storage::Error,
  },

  /// A storage call did not finish in time.
  #[error("{operation} of {object} timed out after {timeout:?}")]
  Timeout {
    operation: &'static str,
    object: ObjectRef,
    timeout: Duration,
  },

  /// The content could not be converted.
  #[error("failed to convert {object}: {source}")]
  Convert {
    object: ObjectRef,
    #[source]
    source: ddp_tabular::ConvertError,
  },
}
