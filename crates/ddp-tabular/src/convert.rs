//! Comma-delimited to tab-delimited conversion.

use ddp_config::ConversionMode;

/// Errors that can occur while converting a payload.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
  /// The input could not be tokenized.
  #[error("failed to parse row {row}: {source}")]
  Parse {
    row: usize,
    #[source]
    source: csv::Error,
  },

  /// A converted row could not be written.
  #[error("failed to write row {row}: {source}")]
  Write {
    row: usize,
    #[source]
    source: csv::Error,
  },

  #[error("failed to flush converted output: {0}")]
  Flush(#[from] std::io::Error),
}

/// Converted content and the number of rows it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
  pub content: Vec<u8>,
  pub rows: usize,
}

/// Rewrite comma-delimited content as tab-delimited content.
///
/// [`ConversionMode::Naive`] replaces every comma byte, including commas
/// inside quoted fields. [`ConversionMode::QuoteAware`] tokenizes with the
/// usual double-quote rules and re-emits each record with tabs, quoting only
/// fields that need it. Both modes keep blank lines, each row's line ending
/// (`\n` or `\r\n`), and a missing trailing newline.
pub fn comma_to_tab(input: &[u8], mode: ConversionMode) -> Result<Converted, ConvertError> {
  match mode {
    ConversionMode::Naive => Ok(naive(input)),
    ConversionMode::QuoteAware => quote_aware(input),
  }
}

fn naive(input: &[u8]) -> Converted {
  let content: Vec<u8> = input
    .iter()
    .map(|b| if *b == b',' { b'\t' } else { *b })
    .collect();

  Converted {
    content,
    rows: count_lines(input),
  }
}

fn count_lines(input: &[u8]) -> usize {
  let newlines = input.iter().filter(|b| **b == b'\n').count();
  match input.last() {
    Some(b'\n') | None => newlines,
    Some(_) => newlines + 1,
  }
}

fn quote_aware(input: &[u8]) -> Result<Converted, ConvertError> {
  let mut content = Vec::with_capacity(input.len());
  let mut rows = 0;

  for line in split_rows(input) {
    if !line.body.is_empty() {
      convert_row(line.body, rows, &mut content)?;
    }
    content.extend_from_slice(line.terminator);
    rows += 1;
  }

  Ok(Converted { content, rows })
}

struct Row<'a> {
  body: &'a [u8],
  terminator: &'a [u8],
}

/// Split at line breaks outside quoted fields. Blank lines become empty rows.
fn split_rows(input: &[u8]) -> Vec<Row<'_>> {
  let mut rows = Vec::new();
  let mut start = 0;
  let mut quoted = false;

  for (i, byte) in input.iter().enumerate() {
    match byte {
      b'"' => quoted = !quoted,
      b'\n' if !quoted => {
        let end = if i > start && input[i - 1] == b'\r' {
          i - 1
        } else {
          i
        };
        rows.push(Row {
          body: &input[start..end],
          terminator: &input[end..=i],
        });
        start = i + 1;
      }
      _ => {}
    }
  }

  if start < input.len() {
    rows.push(Row {
      body: &input[start..],
      terminator: &[],
    });
  }
  rows
}

fn convert_row(body: &[u8], row: usize, out: &mut Vec<u8>) -> Result<(), ConvertError> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(false)
    .flexible(true)
    .from_reader(body);

  let mut writer = csv::WriterBuilder::new()
    .delimiter(b'\t')
    .flexible(true)
    .terminator(csv::Terminator::Any(b'\n'))
    .from_writer(Vec::with_capacity(body.len() + 1));

  let mut record = csv::ByteRecord::new();
  while reader
    .read_byte_record(&mut record)
    .map_err(|source| ConvertError::Parse { row, source })?
  {
    writer
      .write_byte_record(&record)
      .map_err(|source| ConvertError::Write { row, source })?;
  }

  let mut converted = writer
    .into_inner()
    .map_err(|e| ConvertError::Flush(e.into_error()))?;
  if converted.last() == Some(&b'\n') {
    converted.pop();
  }
  out.extend_from_slice(&converted);
  Ok(())
}
