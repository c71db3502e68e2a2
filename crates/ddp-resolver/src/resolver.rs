use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, instrument, warn};

use ddp_orchestrator::{WorkflowDescriptor, WorkflowService};

use crate::error::ResolveError;

/// Resolver maps a workflow name to a registered workflow.
#[async_trait]
pub trait Resolver: Send + Sync {
  /// Find the workflow registered under `name`.
  ///
  /// The match is exact and case-sensitive. When several workflows share the
  /// name, the first one in listing order is returned. `Ok(None)` means no
  /// workflow has that name.
  async fn resolve(&self, name: &str) -> Result<Option<WorkflowDescriptor>, ResolveError>;
}

/// Resolver that walks every page of a [`WorkflowService`] listing.
///
/// Nothing is cached: each call lists the service again.
pub struct ServiceResolver {
  service: Arc<dyn WorkflowService>,
  call_timeout: Duration,
}

impl ServiceResolver {
  /// Create a new resolver. Each page request is bounded by `call_timeout`.
  pub fn new(service: Arc<dyn WorkflowService>, call_timeout: Duration) -> Self {
    Self {
      service,
      call_timeout,
    }
  }

  async fn find(&self, name: &str) -> Result<Option<WorkflowDescriptor>, ResolveError> {
    let mut token: Option<String> = None;
    let mut seen_tokens = HashSet::new();
    let mut pages = 0usize;

    loop {
      let page = tokio::time::timeout(
        self.call_timeout,
        self.service.list_workflows(token.as_deref()),
      )
      .await
      .map_err(|_| ResolveError::Timeout(self.call_timeout))??;
      pages += 1;

      if let Some(found) = page.workflows.into_iter().find(|w| w.name == name) {
        debug!(pages, workflow_id = %found.workflow_id, "workflow resolved");
        return Ok(Some(found));
      }

      match page.next_token {
        Some(next) => {
          if !seen_tokens.insert(next.clone()) {
            return Err(ResolveError::PaginationLoop(next));
          }
          token = Some(next);
        }
        None => {
          debug!(pages, "workflow listing exhausted");
          return Ok(None);
        }
      }
    }
  }
}

#[async_trait]
impl Resolver for ServiceResolver {
  #[instrument(name = "workflow_resolve", skip(self))]
  async fn resolve(&self, name: &str) -> Result<Option<WorkflowDescriptor>, ResolveError> {
    let result = self.find(name).await;

    match &result {
      Ok(None) => warn!("no workflow registered under this name"),
      Err(e) => error!(error = %e, "failed to resolve workflow"),
      Ok(Some(_)) => {}
    }

    result
  }
}
