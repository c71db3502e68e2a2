use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use crate::{
  Error, Execution, ExecutionHandle, ExecutionStatus, StartExecution, WorkflowDescriptor,
  WorkflowPage, WorkflowService, execution_id,
};

/// Default number of workflows returned per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(FromRow)]
struct WorkflowRow {
  seq: i64,
  workflow_id: String,
  name: String,
}

/// SQLite-backed workflow service.
///
/// Workflows are listed in registration order. The continuation token is the
/// sequence number of the last workflow on the previous page.
pub struct SqliteWorkflowService {
  pool: SqlitePool,
  page_size: u32,
}

impl SqliteWorkflowService {
  /// Create a new service with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self {
      pool,
      page_size: DEFAULT_PAGE_SIZE,
    }
  }

  /// Set the listing page size. Values below one are treated as one.
  pub fn with_page_size(mut self, page_size: u32) -> Self {
    self.page_size = page_size.max(1);
    self
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), Error> {
    sqlx::migrate!().run(&self.pool).await?;
    Ok(())
  }

  /// Register a workflow under `name` and return its descriptor.
  ///
  /// Names are not unique; registering the same name twice yields two
  /// workflows and listings return both in registration order.
  pub async fn register_workflow(&self, name: &str) -> Result<WorkflowDescriptor, Error> {
    let workflow = WorkflowDescriptor {
      workflow_id: uuid::Uuid::new_v4().to_string(),
      name: name.to_string(),
    };

    sqlx::query(
      r#"
      INSERT INTO workflows (workflow_id, name, created_at)
      VALUES (?, ?, ?)
      "#,
    )
    .bind(&workflow.workflow_id)
    .bind(&workflow.name)
    .bind(Utc::now())
    .execute(&self.pool)
    .await?;

    info!(workflow_id = %workflow.workflow_id, name = %workflow.name, "workflow registered");
    Ok(workflow)
  }

  /// List executions of a workflow, newest first.
  pub async fn list_executions(&self, workflow_id: &str) -> Result<Vec<Execution>, Error> {
    let executions = sqlx::query_as(
      r#"
      SELECT execution_id, workflow_id, name, input, status, started_at
      FROM executions
      WHERE workflow_id = ?
      ORDER BY started_at DESC
      "#,
    )
    .bind(workflow_id)
    .fetch_all(&self.pool)
    .await?;

    Ok(executions)
  }

  async fn find_execution(&self, workflow_id: &str, name: &str) -> Result<Execution, Error> {
    let execution = sqlx::query_as(
      r#"
      SELECT execution_id, workflow_id, name, input, status, started_at
      FROM executions
      WHERE workflow_id = ? AND name = ?
      "#,
    )
    .bind(workflow_id)
    .bind(name)
    .fetch_one(&self.pool)
    .await?;

    Ok(execution)
  }
}

#[async_trait]
impl WorkflowService for SqliteWorkflowService {
  async fn list_workflows(&self, next_token: Option<&str>) -> Result<WorkflowPage, Error> {
    let after = match next_token {
      Some(token) => token
        .parse::<i64>()
        .map_err(|_| Error::InvalidToken(token.to_string()))?,
      None => 0,
    };

    // One extra row tells us whether another page follows.
    let mut rows: Vec<WorkflowRow> = sqlx::query_as(
      r#"
      SELECT seq, workflow_id, name
      FROM workflows
      WHERE seq > ?
      ORDER BY seq ASC
      LIMIT ?
      "#,
    )
    .bind(after)
    .bind(i64::from(self.page_size) + 1)
    .fetch_all(&self.pool)
    .await?;

    let has_more = rows.len() > self.page_size as usize;
    rows.truncate(self.page_size as usize);

    let next_token = if has_more {
      rows.last().map(|row| row.seq.to_string())
    } else {
      None
    };

    Ok(WorkflowPage {
      workflows: rows
        .into_iter()
        .map(|row| WorkflowDescriptor {
          workflow_id: row.workflow_id,
          name: row.name,
        })
        .collect(),
      next_token,
    })
  }

  async fn start_execution(&self, request: StartExecution) -> Result<ExecutionHandle, Error> {
    let known: Option<(String,)> =
      sqlx::query_as("SELECT workflow_id FROM workflows WHERE workflow_id = ?")
        .bind(&request.workflow_id)
        .fetch_optional(&self.pool)
        .await?;
    if known.is_none() {
      return Err(Error::WorkflowNotFound(request.workflow_id));
    }

    let name = request
      .name
      .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    // An existing (workflow_id, name) row is left untouched; the lookup below
    // then decides whether this was a duplicate start.
    sqlx::query(
      r#"
      INSERT INTO executions (execution_id, workflow_id, name, input, status, started_at)
      VALUES (?, ?, ?, ?, ?, ?)
      ON CONFLICT (workflow_id, name) DO NOTHING
      "#,
    )
    .bind(execution_id(&request.workflow_id, &name))
    .bind(&request.workflow_id)
    .bind(&name)
    .bind(&request.input)
    .bind(ExecutionStatus::Running)
    .bind(Utc::now())
    .execute(&self.pool)
    .await?;

    let execution = self.find_execution(&request.workflow_id, &name).await?;
    if execution.input != request.input {
      return Err(Error::ExecutionAlreadyExists {
        workflow_id: request.workflow_id,
        name,
      });
    }

    Ok(execution.handle())
  }
}
