use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Identifies a single stored object.
///
/// Both fields are guaranteed non-empty; the only way to build one is
/// [`ObjectRef::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectRef {
  container: String,
  key: String,
}

impl ObjectRef {
  pub fn new(container: impl Into<String>, key: impl Into<String>) -> Result<Self, Error> {
    let container = container.into();
    let key = key.into();
    if container.is_empty() || key.is_empty() {
      return Err(Error::EmptyReference);
    }
    Ok(Self { container, key })
  }

  pub fn container(&self) -> &str {
    &self.container
  }

  pub fn key(&self) -> &str {
    &self.key
  }
}

impl fmt::Display for ObjectRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.container, self.key)
  }
}

impl<'de> Deserialize<'de> for ObjectRef {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    #[derive(Deserialize)]
    struct Raw {
      container: String,
      key: String,
    }

    let raw = Raw::deserialize(deserializer)?;
    ObjectRef::new(raw.container, raw.key).map_err(serde::de::Error::custom)
  }
}
