use serde::{Deserialize, Serialize};

use ddp_storage::ObjectRef;

use crate::error::TransformError;

/// Input of the conversion step, as passed by the workflow.
///
/// ```json
/// { "SourceBucket": "ddpsourcebucket", "SourceKey": "incoming/data.csv" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConversionRequest {
  #[serde(default)]
  pub source_bucket: Option<String>,
  #[serde(default)]
  pub source_key: Option<String>,
}

impl ConversionRequest {
  pub fn new(source_bucket: impl Into<String>, source_key: impl Into<String>) -> Self {
    Self {
      source_bucket: Some(source_bucket.into()),
      source_key: Some(source_key.into()),
    }
  }

  pub fn from_json(input: &str) -> Result<Self, TransformError> {
    Ok(serde_json::from_str(input)?)
  }

  /// The source object, or the first missing field.
  pub fn source(&self) -> Result<ObjectRef, TransformError> {
    let bucket = non_empty(self.source_bucket.as_deref())
      .ok_or(TransformError::MissingField("SourceBucket"))?;
    let key =
      non_empty(self.source_key.as_deref()).ok_or(TransformError::MissingField("SourceKey"))?;
    ObjectRef::new(bucket, key).map_err(|_| TransformError::MissingField("SourceKey"))
  }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
  value.filter(|v| !v.is_empty())
}
