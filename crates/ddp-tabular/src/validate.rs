//! Structural validation of a payload's header row.

use std::fmt;

/// Result of validating a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
  Valid,
  /// The payload is malformed; `reason` is never empty.
  Invalid { reason: String },
}

impl ValidationOutcome {
  pub fn is_valid(&self) -> bool {
    matches!(self, ValidationOutcome::Valid)
  }
}

impl fmt::Display for ValidationOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationOutcome::Valid => f.write_str("valid"),
      ValidationOutcome::Invalid { reason } => write!(f, "invalid: {reason}"),
    }
  }
}

/// Checks that the header row of a payload has the expected number of
/// comma-separated fields.
///
/// Only the first row is inspected. Field values and types are not checked,
/// and quoting is not interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatValidator {
  expected_columns: usize,
}

impl Default for FormatValidator {
  fn default() -> Self {
    Self::new(3)
  }
}

impl FormatValidator {
  pub fn new(expected_columns: usize) -> Self {
    Self { expected_columns }
  }

  pub fn expected_columns(&self) -> usize {
    self.expected_columns
  }

  pub fn validate(&self, payload: &str) -> ValidationOutcome {
    self.validate_bytes(payload.as_bytes())
  }

  /// Validate raw content. Accepts either the whole payload or only its first
  /// line.
  pub fn validate_bytes(&self, payload: &[u8]) -> ValidationOutcome {
    if payload.is_empty() {
      return ValidationOutcome::Invalid {
        reason: "payload is empty".to_string(),
      };
    }

    let header = payload.split(|b| *b == b'\n').next().unwrap_or_default();
    let columns = header.split(|b| *b == b',').count();

    if columns != self.expected_columns {
      return ValidationOutcome::Invalid {
        reason: format!(
          "required columns missing: expected {}, found {}",
          self.expected_columns, columns
        ),
      };
    }

    ValidationOutcome::Valid
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn header_with(columns: usize) -> String {
    (0..columns)
      .map(|i| format!("col{i}"))
      .collect::<Vec<_>>()
      .join(",")
  }

  #[test]
  fn test_three_columns_valid() {
    let validator = FormatValidator::default();
    assert_eq!(validator.validate("a,b,c\n1,2,3\n"), ValidationOutcome::Valid);
    assert_eq!(validator.validate("a,b,c"), ValidationOutcome::Valid);
    assert_eq!(validator.validate(",,"), ValidationOutcome::Valid);
  }

  #[test]
  fn test_only_header_is_inspected() {
    let validator = FormatValidator::default();
    let outcome = validator.validate("a,b,c\n1,2\n1,2,3,4,5\n");
    assert!(outcome.is_valid());
  }

  #[test]
  fn test_wrong_column_counts_invalid() {
    let validator = FormatValidator::default();
    for columns in [1, 2, 4, 10] {
      let payload = format!("{}\nx\n", header_with(columns));
      match validator.validate(&payload) {
        ValidationOutcome::Invalid { reason } => {
          assert!(reason.contains("required columns missing"));
          assert!(reason.contains(&format!("found {columns}")));
        }
        ValidationOutcome::Valid => panic!("{columns} columns should be invalid"),
      }
    }
  }

  #[test]
  fn test_blank_header_invalid() {
    let validator = FormatValidator::default();
    assert!(!validator.validate("\na,b,c\n").is_valid());
  }

  #[test]
  fn test_empty_payload_invalid() {
    let validator = FormatValidator::default();
    match validator.validate("") {
      ValidationOutcome::Invalid { reason } => assert!(!reason.is_empty()),
      ValidationOutcome::Valid => panic!("empty payload should be invalid"),
    }
  }

  #[test]
  fn test_crlf_header() {
    let validator = FormatValidator::default();
    assert!(validator.validate("a,b,c\r\n1,2,3\r\n").is_valid());
  }

  #[test]
  fn test_custom_column_count() {
    let validator = FormatValidator::new(2);
    assert!(validator.validate("a,b\n").is_valid());
    assert!(!validator.validate("a,b,c\n").is_valid());
  }
}
