//! Tests for ContentTransformer against an in-memory store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ddp_config::{ConversionMode, PipelineConfig};
use ddp_storage::{ByteStream, MemoryStore, ObjectRef, ObjectStore};
use ddp_transformer::{ContentTransformer, ConversionRequest, TransformError};

const TIMEOUT: Duration = Duration::from_secs(5);

fn object(container: &str, key: &str) -> ObjectRef {
  ObjectRef::new(container, key).expect("valid object ref")
}

async fn store_with(key: &str, content: &'static str) -> Arc<MemoryStore> {
  let store = Arc::new(MemoryStore::new());
  store.insert(object("src", key), content).await;
  store
}

#[tokio::test]
async fn test_convert_writes_tsv_copy() {
  let store = store_with("k.csv", "a,b,c\n1,2,3\n").await;
  let transformer =
    ContentTransformer::new(store.clone(), "dst", ConversionMode::QuoteAware, TIMEOUT);

  let result = transformer
    .convert("src", "k.csv")
    .await
    .expect("conversion should succeed");

  assert_eq!(result.destination, object("dst", "k.tsv"));
  assert_eq!(result.rows, 2);
  assert_eq!(result.bytes_written, 12);

  let written = store.contents(&object("dst", "k.tsv")).await.unwrap();
  assert_eq!(&written[..], b"a\tb\tc\n1\t2\t3\n");

  // Source is untouched.
  let source = store.contents(&object("src", "k.csv")).await.unwrap();
  assert_eq!(&source[..], b"a,b,c\n1,2,3\n");
}

#[tokio::test]
async fn test_naive_mode_matches_character_substitution() {
  let store = store_with("q.csv", "name,note\n\"Smith, J\",x\n").await;
  let transformer = ContentTransformer::new(store.clone(), "dst", ConversionMode::Naive, TIMEOUT);

  transformer.convert("src", "q.csv").await.unwrap();

  let written = store.contents(&object("dst", "q.tsv")).await.unwrap();
  assert_eq!(&written[..], b"name\tnote\n\"Smith\t J\"\tx\n");
}

#[tokio::test]
async fn test_quote_aware_mode_keeps_quoted_commas() {
  let store = store_with("q.csv", "name,note\n\"Smith, J\",x\n").await;
  let transformer =
    ContentTransformer::new(store.clone(), "dst", ConversionMode::QuoteAware, TIMEOUT);

  transformer.convert("src", "q.csv").await.unwrap();

  let written = store.contents(&object("dst", "q.tsv")).await.unwrap();
  assert_eq!(&written[..], b"name\tnote\nSmith, J\tx\n");
}

#[tokio::test]
async fn test_handle_uses_config_destination() {
  let store = store_with("in/data.csv", "a,b,c\n").await;
  let config = PipelineConfig::new("src", "ddpdestinationbucket", "wf");
  let transformer = ContentTransformer::from_config(store.clone(), &config);

  let request =
    ConversionRequest::from_json(r#"{"SourceBucket":"src","SourceKey":"in/data.csv"}"#).unwrap();
  let result = transformer.handle(&request).await.unwrap();

  assert_eq!(
    result.destination,
    object("ddpdestinationbucket", "in/data.tsv")
  );
}

#[tokio::test]
async fn test_key_without_suffix_is_kept() {
  let store = store_with("data.txt", "a,b,c\n").await;
  let transformer = ContentTransformer::new(store.clone(), "dst", ConversionMode::Naive, TIMEOUT);

  let result = transformer.convert("src", "data.txt").await.unwrap();
  assert_eq!(result.destination, object("dst", "data.txt"));
}

#[tokio::test]
async fn test_missing_input_field() {
  let store = Arc::new(MemoryStore::new());
  let transformer = ContentTransformer::new(store.clone(), "dst", ConversionMode::Naive, TIMEOUT);

  let request = ConversionRequest::from_json(r#"{"SourceBucket":"src"}"#).unwrap();
  let result = transformer.handle(&request).await;

  assert!(matches!(result, Err(TransformError::MissingField("SourceKey"))));
  assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_missing_source_object() {
  let store = Arc::new(MemoryStore::new());
  let transformer = ContentTransformer::new(store.clone(), "dst", ConversionMode::Naive, TIMEOUT);

  let result = transformer.convert("src", "absent.csv").await;

  assert!(matches!(
    result,
    Err(TransformError::Read {
      source: ddp_storage::Error::NotFound(_),
      ..
    })
  ));
  assert!(store.is_empty().await);
}

/// Store whose writes never complete.
struct StalledWrites {
  inner: MemoryStore,
}

#[async_trait]
impl ObjectStore for StalledWrites {
  async fn get(&self, object: &ObjectRef) -> Result<ByteStream, ddp_storage::Error> {
    self.inner.get(object).await
  }

  async fn put(&self, _object: &ObjectRef, _data: ByteStream) -> Result<(), ddp_storage::Error> {
    std::future::pending().await
  }
}

#[tokio::test(start_paused = true)]
async fn test_write_timeout() {
  let inner = MemoryStore::new();
  inner.insert(object("src", "k.csv"), "a,b,c\n").await;
  let store = Arc::new(StalledWrites { inner });
  let transformer =
    ContentTransformer::new(store, "dst", ConversionMode::Naive, Duration::from_millis(100));

  let result = transformer.convert("src", "k.csv").await;

  assert!(matches!(
    result,
    Err(TransformError::Timeout {
      operation: "write",
      ..
    })
  ));
}
