use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::io::{read_to_end, single_chunk};
use crate::{ByteStream, Error, ObjectRef, ObjectStore};

/// In-memory object store.
///
/// Suitable for tests and single-process use.
#[derive(Debug, Default)]
pub struct MemoryStore {
  objects: RwLock<HashMap<ObjectRef, Bytes>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert an object directly, bypassing the streaming interface.
  pub async fn insert(&self, object: ObjectRef, data: impl Into<Bytes>) {
    self.objects.write().await.insert(object, data.into());
  }

  /// Fetch an object's full content, if present.
  pub async fn contents(&self, object: &ObjectRef) -> Option<Bytes> {
    self.objects.read().await.get(object).cloned()
  }

  pub async fn len(&self) -> usize {
    self.objects.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.objects.read().await.is_empty()
  }
}

#[async_trait]
impl ObjectStore for MemoryStore {
  async fn get(&self, object: &ObjectRef) -> Result<ByteStream, Error> {
    let data = self
      .objects
      .read()
      .await
      .get(object)
      .cloned()
      .ok_or_else(|| Error::NotFound(object.clone()))?;
    Ok(single_chunk(data))
  }

  async fn put(&self, object: &ObjectRef, data: ByteStream) -> Result<(), Error> {
    let data = read_to_end(data).await?;
    self.objects.write().await.insert(object.clone(), data);
    Ok(())
  }
}
