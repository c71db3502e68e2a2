use std::path::PathBuf;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The configuration file could not be read.
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The configuration file is not valid JSON for [`crate::PipelineConfig`].
  #[error("failed to parse config: {0}")]
  Parse(#[from] serde_json::Error),

  /// A required field is empty.
  #[error("config field '{field}' must not be empty")]
  EmptyField { field: &'static str },

  /// A numeric field is outside its accepted range.
  #[error("config field '{field}' must be greater than zero")]
  NotPositive { field: &'static str },

  /// Source and destination containers are the same.
  #[error("source and destination container are both '{0}'")]
  SameContainer(String),
}
