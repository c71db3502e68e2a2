use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ddp_config::PipelineConfig;
use ddp_dispatcher::{BatchReport, EventDispatcher};
use ddp_orchestrator::SqliteWorkflowService;
use ddp_resolver::{Resolver, ServiceResolver};
use ddp_storage::FsStore;
use ddp_transformer::{ContentTransformer, ConversionRequest};

/// ddp - validate incoming delimited files and convert them through a workflow
#[derive(Parser)]
#[command(name = "ddp")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the pipeline config file
  #[arg(long, global = true, default_value = "ddp.json")]
  config: PathBuf,

  /// Emit logs as JSON lines
  #[arg(long, global = true)]
  log_json: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Handle an object-creation notification read from stdin
  Dispatch,

  /// Run the conversion step for a request read from stdin
  Convert,

  /// Register a workflow under a name
  RegisterWorkflow {
    /// Name the workflow is resolved by
    name: String,
  },

  /// List the executions of a workflow
  ListExecutions {
    /// Name of the workflow
    name: String,
  },
}

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();
  init_tracing(cli.log_json);

  let config = PipelineConfig::load(&cli.config)
    .with_context(|| format!("failed to load config: {}", cli.config.display()))?;

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    match cli.command {
      Commands::Dispatch => dispatch(&config).await,
      Commands::Convert => convert(&config).await,
      Commands::RegisterWorkflow { name } => register_workflow(&config, &name).await,
      Commands::ListExecutions { name } => list_executions(&config, &name).await,
    }
  })
}

fn init_tracing(json: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr);

  if json {
    builder.json().init();
  } else {
    builder.init();
  }
}

async fn connect(config: &PipelineConfig) -> Result<SqliteWorkflowService> {
  let options = SqliteConnectOptions::from_str(&config.database_url)
    .with_context(|| format!("invalid database url: {}", config.database_url))?
    .create_if_missing(true);
  if let Some(parent) = options.get_filename().parent() {
    if !parent.as_os_str().is_empty() {
      ensure_dir(parent)?;
    }
  }

  let pool = SqlitePoolOptions::new()
    .connect_with(options)
    .await
    .with_context(|| format!("failed to open workflow registry: {}", config.database_url))?;

  let service = SqliteWorkflowService::new(pool).with_page_size(config.list_page_size);
  service
    .migrate()
    .await
    .context("failed to migrate workflow registry")?;
  Ok(service)
}

fn object_store(config: &PipelineConfig) -> Result<Arc<FsStore>> {
  ensure_dir(&config.storage_root)?;
  Ok(Arc::new(FsStore::new(&config.storage_root)))
}

fn ensure_dir(path: &Path) -> Result<()> {
  std::fs::create_dir_all(path)
    .with_context(|| format!("failed to create directory: {}", path.display()))
}

async fn dispatch(config: &PipelineConfig) -> Result<ExitCode> {
  let payload = read_stdin()?;
  let service = Arc::new(connect(config).await?);
  let dispatcher = EventDispatcher::new(config, object_store(config)?, service);

  let report = dispatcher
    .dispatch_json(&payload)
    .await
    .context("failed to dispatch notification")?;

  println!("{}", serde_json::to_string_pretty(&report.summary())?);
  Ok(dispatch_exit_code(report))
}

/// Failure when any record failed, so the event source redelivers.
fn dispatch_exit_code(report: BatchReport) -> ExitCode {
  match report.into_result() {
    Ok(report) => {
      info!(records = report.outcomes.len(), "notification dispatched");
      ExitCode::SUCCESS
    }
    Err(e) => {
      error!(error = %e, retryable = e.is_retryable(), "notification failed");
      ExitCode::FAILURE
    }
  }
}

async fn convert(config: &PipelineConfig) -> Result<ExitCode> {
  let payload = read_stdin()?;
  let request = ConversionRequest::from_json(&payload).context("failed to parse request")?;

  let transformer = ContentTransformer::from_config(object_store(config)?, config);
  let result = transformer
    .handle(&request)
    .await
    .context("conversion failed")?;

  println!("{}", serde_json::to_string_pretty(&result)?);
  Ok(ExitCode::SUCCESS)
}

async fn register_workflow(config: &PipelineConfig, name: &str) -> Result<ExitCode> {
  let service = connect(config).await?;
  let workflow = service
    .register_workflow(name)
    .await
    .with_context(|| format!("failed to register workflow '{name}'"))?;

  println!("{}", serde_json::to_string_pretty(&workflow)?);
  Ok(ExitCode::SUCCESS)
}

async fn list_executions(config: &PipelineConfig, name: &str) -> Result<ExitCode> {
  let service = Arc::new(connect(config).await?);
  let resolver = ServiceResolver::new(service.clone(), config.call_timeout());

  let Some(workflow) = resolver
    .resolve(name)
    .await
    .context("failed to resolve workflow")?
  else {
    bail!("workflow '{name}' not found");
  };

  let executions = service
    .list_executions(&workflow.workflow_id)
    .await
    .context("failed to list executions")?;

  println!("{}", serde_json::to_string_pretty(&executions)?);
  Ok(ExitCode::SUCCESS)
}

fn read_stdin() -> Result<String> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    bail!("expected a JSON payload on stdin");
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read payload from stdin")?;
  Ok(input)
}
