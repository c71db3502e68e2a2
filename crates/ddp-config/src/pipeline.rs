use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How comma-delimited content is rewritten as tab-delimited content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
  /// Tokenize with quoting rules and re-emit each record with tabs.
  #[default]
  QuoteAware,
  /// Replace every comma byte with a tab byte, quoted or not.
  Naive,
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
  /// Only notification records from this container are processed.
  pub source_container: String,

  /// Converted objects are written to this container.
  pub destination_container: String,

  /// Name of the workflow started for every valid object.
  pub workflow_name: String,

  /// Root directory of the filesystem object store.
  #[serde(default = "default_storage_root")]
  pub storage_root: PathBuf,

  /// Connection string of the workflow registry database.
  #[serde(default = "default_database_url")]
  pub database_url: String,

  /// Upper bound for every remote call (listing, start, storage get/put).
  #[serde(default = "default_call_timeout_ms")]
  pub call_timeout_ms: u64,

  /// Number of header fields a valid object must have.
  #[serde(default = "default_expected_columns")]
  pub expected_columns: usize,

  #[serde(default)]
  pub conversion_mode: ConversionMode,

  /// Derive execution names from object identity so redeliveries reuse the
  /// same execution instead of starting a new one.
  #[serde(default)]
  pub deterministic_execution_names: bool,

  /// How many records of one notification are processed at the same time.
  #[serde(default = "default_max_concurrent_records")]
  pub max_concurrent_records: usize,

  /// Page size used when listing registered workflows.
  #[serde(default = "default_list_page_size")]
  pub list_page_size: u32,

  /// Longest header line read for validation; longer headers are invalid.
  #[serde(default = "default_max_header_bytes")]
  pub max_header_bytes: usize,
}

fn default_storage_root() -> PathBuf {
  PathBuf::from("data/objects")
}

fn default_database_url() -> String {
  "sqlite://data/workflows.db?mode=rwc".to_string()
}

fn default_call_timeout_ms() -> u64 {
  30_000
}

fn default_expected_columns() -> usize {
  3
}

fn default_max_concurrent_records() -> usize {
  1
}

fn default_list_page_size() -> u32 {
  100
}

fn default_max_header_bytes() -> usize {
  64 * 1024
}

impl PipelineConfig {
  /// Create a config with the three required values and defaults for the rest.
  pub fn new(
    source_container: impl Into<String>,
    destination_container: impl Into<String>,
    workflow_name: impl Into<String>,
  ) -> Self {
    Self {
      source_container: source_container.into(),
      destination_container: destination_container.into(),
      workflow_name: workflow_name.into(),
      storage_root: default_storage_root(),
      database_url: default_database_url(),
      call_timeout_ms: default_call_timeout_ms(),
      expected_columns: default_expected_columns(),
      conversion_mode: ConversionMode::default(),
      deterministic_execution_names: false,
      max_concurrent_records: default_max_concurrent_records(),
      list_page_size: default_list_page_size(),
      max_header_bytes: default_max_header_bytes(),
    }
  }

  /// Parse and validate a config from JSON text.
  pub fn from_json(content: &str) -> Result<Self, ConfigError> {
    let config: Self = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Read, parse, and validate a config file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&content)
  }

  /// Check the invariants the pipeline relies on.
  ///
  /// Source and destination must differ: converted objects written back into
  /// the source container would be picked up as new input.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let required = [
      ("source_container", &self.source_container),
      ("destination_container", &self.destination_container),
      ("workflow_name", &self.workflow_name),
      ("database_url", &self.database_url),
    ];
    for (field, value) in required {
      if value.trim().is_empty() {
        return Err(ConfigError::EmptyField { field });
      }
    }

    if self.source_container == self.destination_container {
      return Err(ConfigError::SameContainer(self.source_container.clone()));
    }

    let positive = [
      ("call_timeout_ms", self.call_timeout_ms as usize),
      ("expected_columns", self.expected_columns),
      ("max_concurrent_records", self.max_concurrent_records),
      ("list_page_size", self.list_page_size as usize),
      ("max_header_bytes", self.max_header_bytes),
    ];
    for (field, value) in positive {
      if value == 0 {
        return Err(ConfigError::NotPositive { field });
      }
    }

    Ok(())
  }

  pub fn call_timeout(&self) -> Duration {
    Duration::from_millis(self.call_timeout_ms)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = PipelineConfig::from_json(
      r#"{
        "source_container": "ddpsourcebucket",
        "destination_container": "ddpdestinationbucket",
        "workflow_name": "sfn_state_machine"
      }"#,
    )
    .expect("config should parse");

    assert_eq!(config.expected_columns, 3);
    assert_eq!(config.call_timeout(), Duration::from_secs(30));
    assert_eq!(config.conversion_mode, ConversionMode::QuoteAware);
    assert_eq!(config.max_concurrent_records, 1);
    assert_eq!(config.max_header_bytes, 65536);
    assert!(!config.deterministic_execution_names);
  }

  #[test]
  fn test_conversion_mode_is_snake_case() {
    let config = PipelineConfig::from_json(
      r#"{
        "source_container": "src",
        "destination_container": "dst",
        "workflow_name": "wf",
        "conversion_mode": "naive"
      }"#,
    )
    .expect("config should parse");

    assert_eq!(config.conversion_mode, ConversionMode::Naive);
  }

  #[test]
  fn test_missing_required_field_fails_to_parse() {
    let result = PipelineConfig::from_json(r#"{ "source_container": "src" }"#);
    assert!(matches!(result, Err(ConfigError::Parse(_))));
  }

  #[test]
  fn test_empty_workflow_name_rejected() {
    let config = PipelineConfig::new("src", "dst", "  ");
    assert!(matches!(
      config.validate(),
      Err(ConfigError::EmptyField {
        field: "workflow_name"
      })
    ));
  }

  #[test]
  fn test_same_container_rejected() {
    let config = PipelineConfig::new("bucket", "bucket", "wf");
    assert!(matches!(
      config.validate(),
      Err(ConfigError::SameContainer(name)) if name == "bucket"
    ));
  }

  #[test]
  fn test_zero_timeout_rejected() {
    let mut config = PipelineConfig::new("src", "dst", "wf");
    config.call_timeout_ms = 0;
    assert!(matches!(
      config.validate(),
      Err(ConfigError::NotPositive {
        field: "call_timeout_ms"
      })
    ));
  }

  #[test]
  fn test_load_from_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("pipeline.json");
    std::fs::write(
      &path,
      r#"{"source_container":"a","destination_container":"b","workflow_name":"c"}"#,
    )
    .expect("failed to write config");

    let config = PipelineConfig::load(&path).expect("config should load");
    assert_eq!(config.workflow_name, "c");

    let missing = PipelineConfig::load(&dir.path().join("missing.json"));
    assert!(matches!(missing, Err(ConfigError::Read { .. })));
  }
}
