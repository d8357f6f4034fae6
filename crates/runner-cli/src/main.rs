use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use runner_core::app::{JobBuilder, RunnerConfig, StoreErrorPolicy};
use runner_core::context::RunContext;
use runner_core::domain::{JobSpec, TaskSpec};
use runner_core::impls::{InMemoryStore, TracedStore};
use tracing_subscriber::EnvFilter;

/// Runs a batch of commands concurrently as one job.
#[derive(Debug, Parser)]
#[command(name = "runner", version)]
struct Args {
    /// JSON job description: {"tasks": [{"name", "cmd", "args"}]}. Runs the demo batch when omitted.
    #[arg(long, value_name = "FILE")]
    spec: Option<PathBuf>,

    /// Deadline for the whole job (e.g. 4s, 250ms, 1m 30s).
    #[arg(long, value_name = "DURATION", default_value = "4s", value_parser = humantime::parse_duration)]
    deadline: Duration,

    /// Per-task timeout, nested inside the job deadline.
    #[arg(long, value_name = "DURATION", default_value = "5s", value_parser = humantime::parse_duration)]
    task_timeout: Duration,

    /// Stop waiting for tasks that ignore cancellation this long after the deadline.
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    abandon_grace: Option<Duration>,

    #[arg(long, value_enum, default_value_t = StoreErrors::Log)]
    store_errors: StoreErrors,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreErrors {
    Log,
    Propagate,
}

impl From<StoreErrors> for StoreErrorPolicy {
    fn from(value: StoreErrors) -> Self {
        match value {
            StoreErrors::Log => StoreErrorPolicy::LogAndContinue,
            StoreErrors::Propagate => StoreErrorPolicy::Propagate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl Args {
    fn config(&self) -> RunnerConfig {
        let config = RunnerConfig::default()
            .with_task_timeout(self.task_timeout)
            .with_store_errors(self.store_errors.into());
        match self.abandon_grace {
            Some(grace) => config.with_abandon_grace(grace),
            None => config,
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn demo_spec() -> JobSpec {
    let convert = |name: &str, resolution: &str| {
        TaskSpec::new(name, "convert-stream").arg("-r").arg(resolution)
    };
    JobSpec {
        tasks: vec![
            convert("low-res", "420x280"),
            convert("mid-res", "1280x720"),
            convert("hi-res", "1920x1080"),
        ],
    }
}

fn load_spec(path: &Path) -> Result<JobSpec, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| format!("invalid job spec {}: {e}", path.display()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_format);

    let spec = match &args.spec {
        Some(path) => match load_spec(path) {
            Ok(spec) => spec,
            Err(e) => {
                tracing::error!(error = %e, "cannot load job spec");
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => demo_spec(),
    };

    let store = Arc::new(TracedStore::new("memory", InMemoryStore::new()));
    let mut job = match JobBuilder::new(store)
        .config(args.config())
        .spec(&spec)
        .build()
        .await
    {
        Ok(job) => job,
        Err(e) => {
            tracing::error!(error = %e, "cannot build job");
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let ctx = RunContext::with_root_timeout(args.deadline);
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling job");
            interrupt.cancel();
        }
    });

    match job.run(&ctx).await {
        Ok(()) => {
            tracing::info!(job_id = %job.id(), "job succeeded");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(job_id = %job.id(), error = %e, "job failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
