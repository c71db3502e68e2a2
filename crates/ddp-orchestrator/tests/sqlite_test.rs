//! Integration tests for SqliteWorkflowService against an in-memory database.

use ddp_orchestrator::{
  Error, ExecutionStatus, SqliteWorkflowService, StartExecution, WorkflowService,
};
use sqlx::sqlite::SqlitePoolOptions;

async fn create_service(page_size: u32) -> SqliteWorkflowService {
  // A single connection keeps every query on the same in-memory database.
  let pool = SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("failed to open in-memory database");

  let service = SqliteWorkflowService::new(pool).with_page_size(page_size);
  service.migrate().await.expect("failed to run migrations");
  service
}

#[tokio::test]
async fn test_list_empty_registry() {
  let service = create_service(10).await;

  let page = service.list_workflows(None).await.unwrap();
  assert!(page.workflows.is_empty());
  assert!(page.next_token.is_none());
}

#[tokio::test]
async fn test_list_paginates_in_registration_order() {
  let service = create_service(2).await;
  let mut registered = Vec::new();
  for name in ["a", "b", "c", "d", "e"] {
    registered.push(service.register_workflow(name).await.unwrap());
  }

  let first = service.list_workflows(None).await.unwrap();
  assert_eq!(first.workflows, &registered[0..2]);
  let token = first.next_token.expect("first page should have a token");

  let second = service.list_workflows(Some(&token)).await.unwrap();
  assert_eq!(second.workflows, &registered[2..4]);
  let token = second.next_token.expect("second page should have a token");

  let third = service.list_workflows(Some(&token)).await.unwrap();
  assert_eq!(third.workflows, &registered[4..5]);
  assert!(third.next_token.is_none());
}

#[tokio::test]
async fn test_exact_page_has_no_trailing_token() {
  let service = create_service(2).await;
  service.register_workflow("a").await.unwrap();
  service.register_workflow("b").await.unwrap();

  let page = service.list_workflows(None).await.unwrap();
  assert_eq!(page.workflows.len(), 2);
  assert!(page.next_token.is_none());
}

#[tokio::test]
async fn test_invalid_token() {
  let service = create_service(10).await;
  let result = service.list_workflows(Some("not-a-number")).await;
  assert!(matches!(result, Err(Error::InvalidToken(t)) if t == "not-a-number"));
}

#[tokio::test]
async fn test_start_execution_records_input() {
  let service = create_service(10).await;
  let workflow = service.register_workflow("sfn_state_machine").await.unwrap();
  let input = r#"{"bucket":"bkt","key":"k.csv"}"#;

  let handle = service
    .start_execution(StartExecution {
      workflow_id: workflow.workflow_id.clone(),
      input: input.to_string(),
      name: None,
    })
    .await
    .expect("start should be accepted");

  assert_eq!(handle.workflow_id, workflow.workflow_id);

  let executions = service.list_executions(&workflow.workflow_id).await.unwrap();
  assert_eq!(executions.len(), 1);
  assert_eq!(executions[0].execution_id, handle.execution_id);
  assert_eq!(executions[0].input, input);
  assert_eq!(executions[0].status, ExecutionStatus::Running);
}

#[tokio::test]
async fn test_unnamed_executions_are_distinct() {
  let service = create_service(10).await;
  let workflow = service.register_workflow("wf").await.unwrap();
  let request = StartExecution {
    workflow_id: workflow.workflow_id.clone(),
    input: "{}".to_string(),
    name: None,
  };

  let first = service.start_execution(request.clone()).await.unwrap();
  let second = service.start_execution(request).await.unwrap();
  assert_ne!(first.execution_id, second.execution_id);
  assert_eq!(
    service.list_executions(&workflow.workflow_id).await.unwrap().len(),
    2
  );
}

#[tokio::test]
async fn test_named_execution_deduplicates() {
  let service = create_service(10).await;
  let workflow = service.register_workflow("wf").await.unwrap();
  let request = StartExecution {
    workflow_id: workflow.workflow_id.clone(),
    input: r#"{"bucket":"b","key":"k"}"#.to_string(),
    name: Some("object-1".to_string()),
  };

  let first = service.start_execution(request.clone()).await.unwrap();
  let second = service.start_execution(request.clone()).await.unwrap();
  assert_eq!(first.execution_id, second.execution_id);
  assert_eq!(
    service.list_executions(&workflow.workflow_id).await.unwrap().len(),
    1
  );

  let conflicting = StartExecution {
    input: r#"{"bucket":"b","key":"other"}"#.to_string(),
    ..request
  };
  assert!(matches!(
    service.start_execution(conflicting).await,
    Err(Error::ExecutionAlreadyExists { .. })
  ));
}

#[tokio::test]
async fn test_start_unknown_workflow() {
  let service = create_service(10).await;
  let result = service
    .start_execution(StartExecution {
      workflow_id: "missing".to_string(),
      input: "{}".to_string(),
      name: None,
    })
    .await;
  assert!(matches!(result, Err(Error::WorkflowNotFound(_))));
}
