//! Helpers for consuming and producing [`ByteStream`]s.

use bytes::{Bytes, BytesMut};
use futures::StreamExt;

use crate::{ByteStream, Error};

/// Wrap an in-memory buffer as a single-chunk stream.
pub fn single_chunk(data: impl Into<Bytes>) -> ByteStream {
  let data = data.into();
  Box::pin(futures::stream::once(async move { Ok(data) }))
}

/// Drain a stream into one buffer.
pub async fn read_to_end(mut stream: ByteStream) -> Result<Bytes, Error> {
  let mut buf = BytesMut::new();
  while let Some(chunk) = stream.next().await {
    buf.extend_from_slice(&chunk?);
  }
  Ok(buf.freeze())
}

/// Read up to (not including) the first `\n`, or the whole stream if it has
/// none.
///
/// Stops pulling chunks as soon as a newline is seen, so only the head of a
/// large object is transferred. Returns `None` once the line grows past
/// `limit` bytes.
pub async fn read_first_line(
  mut stream: ByteStream,
  limit: usize,
) -> Result<Option<Bytes>, Error> {
  let mut buf = BytesMut::new();
  while let Some(chunk) = stream.next().await {
    let chunk = chunk?;
    let newline = chunk.iter().position(|b| *b == b'\n');
    let take = newline.unwrap_or(chunk.len());
    if buf.len() + take > limit {
      return Ok(None);
    }
    buf.extend_from_slice(&chunk[..take]);
    if newline.is_some() {
      return Ok(Some(buf.freeze()));
    }
  }
  Ok(Some(buf.freeze()))
}
