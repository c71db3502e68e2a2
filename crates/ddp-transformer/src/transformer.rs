use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use ddp_config::{ConversionMode, PipelineConfig};
use ddp_storage::{ObjectRef, ObjectStore, read_to_end, single_chunk};
use ddp_tabular::{KeyRewrite, comma_to_tab, destination_key};

use crate::error::TransformError;
use crate::request::ConversionRequest;

/// Outcome of one conversion. Only used for logging and reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
  pub source: ObjectRef,
  pub destination: ObjectRef,
  pub bytes_written: usize,
  pub rows: usize,
}

/// Converts objects from comma-delimited to tab-delimited text.
///
/// The whole source object is buffered in memory before conversion.
pub struct ContentTransformer {
  store: Arc<dyn ObjectStore>,
  destination_container: String,
  mode: ConversionMode,
  call_timeout: Duration,
}

impl ContentTransformer {
  pub fn new(
    store: Arc<dyn ObjectStore>,
    destination_container: impl Into<String>,
    mode: ConversionMode,
    call_timeout: Duration,
  ) -> Self {
    Self {
      store,
      destination_container: destination_container.into(),
      mode,
      call_timeout,
    }
  }

  pub fn from_config(store: Arc<dyn ObjectStore>, config: &PipelineConfig) -> Self {
    Self::new(
      store,
      config.destination_container.clone(),
      config.conversion_mode,
      config.call_timeout(),
    )
  }

  /// Run the conversion step for a workflow-supplied request.
  pub async fn handle(
    &self,
    request: &ConversionRequest,
  ) -> Result<ConversionResult, TransformError> {
    let source = request.source()?;
    self.convert_object(&source).await
  }

  /// Convert the object at `bucket`/`key`.
  pub async fn convert(
    &self,
    bucket: &str,
    key: &str,
  ) -> Result<ConversionResult, TransformError> {
    let request = ConversionRequest::new(bucket, key);
    self.handle(&request).await
  }

  #[instrument(
    name = "content_convert",
    skip(self, source),
    fields(source = %source, mode = ?self.mode)
  )]
  async fn convert_object(&self, source: &ObjectRef) -> Result<ConversionResult, TransformError> {
    let result = self.convert_inner(source).await;

    match &result {
      Ok(converted) => info!(
        destination = %converted.destination,
        bytes = converted.bytes_written,
        rows = converted.rows,
        "object converted"
      ),
      Err(e) => error!(error = %e, "conversion failed"),
    }

    result
  }

  async fn convert_inner(&self, source: &ObjectRef) -> Result<ConversionResult, TransformError> {
    let content = self
      .bounded("read", source, self.read_all(source))
      .await?
      .map_err(|e| TransformError::Read {
        object: source.clone(),
        source: e,
      })?;

    let converted = comma_to_tab(&content, self.mode).map_err(|e| TransformError::Convert {
      object: source.clone(),
      source: e,
    })?;

    let (key, rewrite) = destination_key(source.key());
    if rewrite != KeyRewrite::Suffix {
      warn!(
        source_key = source.key(),
        destination_key = %key,
        ?rewrite,
        "source key has no .csv suffix"
      );
    }
    // Source key is non-empty, so the rewritten key is too.
    let destination = ObjectRef::new(self.destination_container.clone(), key).map_err(|e| {
      TransformError::Write {
        object: source.clone(),
        source: e,
      }
    })?;

    let bytes_written = converted.content.len();
    self
      .bounded(
        "write",
        &destination,
        self.store.put(&destination, single_chunk(converted.content)),
      )
      .await?
      .map_err(|e| TransformError::Write {
        object: destination.clone(),
        source: e,
      })?;

    Ok(ConversionResult {
      source: source.clone(),
      destination,
      bytes_written,
      rows: converted.rows,
    })
  }

  async fn read_all(&self, source: &ObjectRef) -> Result<Bytes, ddp_storage::Error> {
    let stream = self.store.get(source).await?;
    read_to_end(stream).await
  }

  async fn bounded<T>(
    &self,
    operation: &'static str,
    object: &ObjectRef,
    fut: impl Future<Output = T>,
  ) -> Result<T, TransformError> {
    tokio::time::timeout(self.call_timeout, fut)
      .await
      .map_err(|_| TransformError::Timeout {
        operation,
        object: object.clone(),
        timeout: self.call_timeout,
      })
  }
}
