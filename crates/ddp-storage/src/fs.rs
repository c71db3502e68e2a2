use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::{ByteStream, Error, ObjectRef, ObjectStore};

/// Filesystem-based object store.
///
/// Each object is stored at `{base_path}/{container}/{key}`. Keys may contain
/// `/` separators; parent directories are created on write. Keys that would
/// escape the container directory are rejected.
pub struct FsStore {
  base_path: PathBuf,
}

impl FsStore {
  /// Create a new filesystem store with the given base path.
  pub fn new(base_path: impl Into<PathBuf>) -> Self {
    Self {
      base_path: base_path.into(),
    }
  }

  fn object_path(&self, object: &ObjectRef) -> Result<PathBuf, Error> {
    let container = Path::new(object.container());
    if container.components().count() != 1
      || !matches!(container.components().next(), Some(Component::Normal(_)))
    {
      return Err(Error::InvalidKey {
        key: object.container().to_string(),
        reason: "container must be a single path segment",
      });
    }

    let key = Path::new(object.key());
    if !key.components().all(|c| matches!(c, Component::Normal(_))) {
      return Err(Error::InvalidKey {
        key: object.key().to_string(),
        reason: "key must be a relative path without '..' segments",
      });
    }

    Ok(self.base_path.join(container).join(key))
  }
}

#[async_trait]
impl ObjectStore for FsStore {
  async fn get(&self, object: &ObjectRef) -> Result<ByteStream, Error> {
    let path = self.object_path(object)?;
    let file = File::open(&path).await.map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        Error::NotFound(object.clone())
      } else {
        Error::Io(e)
      }
    })?;
    let stream = ReaderStream::new(file).map(|r| r.map_err(Error::Io));
    Ok(Box::pin(stream))
  }

  async fn put(&self, object: &ObjectRef, data: ByteStream) -> Result<(), Error> {
    let path = self.object_path(object)?;

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).await?;
    }

    let mut file = File::create(path).await?;
    let mut stream = std::pin::pin!(data);

    while let Some(chunk) = stream.next().await {
      let bytes = chunk?;
      file.write_all(&bytes).await?;
    }

    file.flush().await?;
    Ok(())
  }
}
