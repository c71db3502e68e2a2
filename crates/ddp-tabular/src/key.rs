//! Destination key computation for converted objects.

/// How a destination key was derived from its source key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRewrite {
  /// A trailing `.csv` was replaced with `.tsv`.
  Suffix,
  /// No `.csv` suffix; the first `.csv` inside the key was replaced.
  FirstOccurrence,
  /// The key contains no `.csv` and is used as-is.
  Unchanged,
}

/// Compute the destination key for a converted object.
///
/// A `.csv` suffix is checked first so `2024.csv.d/data.csv` becomes
/// `2024.csv.d/data.tsv`. Keys without the suffix fall back to replacing the
/// first occurrence.
pub fn destination_key(source_key: &str) -> (String, KeyRewrite) {
  if let Some(stem) = source_key.strip_suffix(".csv") {
    return (format!("{stem}.tsv"), KeyRewrite::Suffix);
  }

  if source_key.contains(".csv") {
    return (
      source_key.replacen(".csv", ".tsv", 1),
      KeyRewrite::FirstOccurrence,
    );
  }

  (source_key.to_string(), KeyRewrite::Unchanged)
}
