//! ddp Storage
//!
//! This crate provides the object storage capability used by the pipeline.
//! Objects are byte blobs addressed by a container name and a key, the same
//! shape as a bucket/key pair in a cloud object store.
//!
//! The [`ObjectStore`] trait is the seam between the pipeline and a concrete
//! backend. [`FsStore`] keeps objects on the local filesystem and
//! [`MemoryStore`] keeps them in memory.
//!
//! Reads and writes are streamed so large objects do not have to be buffered
//! by the store itself. Callers that need the whole object or only its first
//! line use the helpers in [`read_to_end`] and [`read_first_line`].

mod fs;
mod io;
mod memory;
mod object;

pub use fs::FsStore;
pub use io::{read_first_line, read_to_end, single_chunk};
pub use memory::MemoryStore;
pub use object::ObjectRef;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// A boxed stream of bytes for object content.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, Error>> + Send>>;

/// Error type for object storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The requested object was not found.
  #[error("object not found: {0}")]
  NotFound(ObjectRef),

  /// The key cannot be mapped onto the backend.
  #[error("invalid object key '{key}': {reason}")]
  InvalidKey { key: String, reason: &'static str },

  /// An empty container or key was supplied.
  #[error("object reference must have a non-empty container and key")]
  EmptyReference,

  /// An I/O error occurred.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Object storage trait.
///
/// Implementations provide the actual storage backend. Sources are read-only
/// from the pipeline's point of view; `put` always creates or replaces the
/// object at the given reference.
#[async_trait]
pub trait ObjectStore: Send + Sync {
  /// Retrieve an object as a stream of bytes.
  async fn get(&self, object: &ObjectRef) -> Result<ByteStream, Error>;

  /// Store an object from a stream of bytes.
  async fn put(&self, object: &ObjectRef, data: ByteStream) -> Result<(), Error>;
}
