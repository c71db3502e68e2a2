use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input handed to every started execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionInput {
  pub bucket: String,
  pub key: String,
}

impl ExecutionInput {
  pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
    Self {
      bucket: bucket.into(),
      key: key.into(),
    }
  }

  /// Serialize to compact JSON: `{"bucket":"...","key":"..."}`.
  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string(self)
  }
}

/// Derive a stable execution name for an object.
///
/// The same `(bucket, key, version)` always yields the same name, so a
/// redelivered notification maps onto the execution already started for it.
/// `version` identifies the object revision (event sequencer or ETag), so a
/// later upload of the same key gets a different name.
pub fn execution_name(bucket: &str, key: &str, version: &str) -> String {
  let identity = format!("ddp://{}/{}#{}", bucket, key, version);
  Uuid::new_v5(&Uuid::NAMESPACE_URL, identity.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_input_json_is_exact() {
    let json = ExecutionInput::new("bkt", "k.csv").to_json().unwrap();
    assert_eq!(json, r#"{"bucket":"bkt","key":"k.csv"}"#);
  }

  #[test]
  fn test_input_json_escapes_special_characters() {
    let json = ExecutionInput::new("b\"kt", "dir\\k\n\u{1}.csv")
      .to_json()
      .unwrap();
    assert_eq!(json, r#"{"bucket":"b\"kt","key":"dir\\k\n\u0001.csv"}"#);

    let parsed: ExecutionInput = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, ExecutionInput::new("b\"kt", "dir\\k\n\u{1}.csv"));
  }

  #[test]
  fn test_execution_name_is_stable() {
    let a = execution_name("bkt", "k.csv", "etag-1");
    let b = execution_name("bkt", "k.csv", "etag-1");
    let c = execution_name("bkt", "k.csv", "etag-2");
    let d = execution_name("bkt", "other.csv", "etag-1");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
  }
}
