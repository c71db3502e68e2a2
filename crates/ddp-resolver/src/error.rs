use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while resolving a workflow name.
///
/// Every variant is an infrastructure failure. A name that matches no
/// registered workflow is not an error; see [`crate::Resolver::resolve`].
#[derive(Debug, Error)]
pub enum ResolveError {
  /// The listing call failed.
  #[error("failed to list workflows: {0}")]
  Service(#[from] ddp_orchestrator::Error),

  /// The listing call did not finish in time.
  #[error("listing workflows timed out after {0:?}")]
  Timeout(Duration),

  /// The service handed back a token it had already returned.
  #[error("workflow listing repeated pagination token '{0}'")]
  PaginationLoop(String),
}
