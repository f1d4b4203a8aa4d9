use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use uuid::Uuid;

use lifeadmin::config::LogStoreConfig;
use lifeadmin::db::{log_repo, Database};
use lifeadmin::logstore::resolve_database_path;
use lifeadmin::worker::{DirectoryScanner, JobResult, WorkerPool};
use lifeadmin::{Config, Pipeline, PipelineState};

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    lifeadmin::load_config_or_default(path).context("Failed to load configuration")
}

pub fn run(config: &Config, file: &Path) -> Result<()> {
    let pipeline = Pipeline::from_config(config).context("Failed to build pipeline")?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let state = runtime.block_on(pipeline.run(file))?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

pub fn batch(config: &Config, directory: &Path, workers: Option<usize>) -> Result<()> {
    let jobs = DirectoryScanner::new(directory).scan()?;
    if jobs.is_empty() {
        println!("No supported files in {}", directory.display());
        return Ok(());
    }

    let pipeline = Arc::new(Pipeline::from_config(config).context("Failed to build pipeline")?);
    let worker_count = workers.unwrap_or(config.worker_count).min(jobs.len());
    let pool = WorkerPool::new(pipeline, worker_count)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&interrupted);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .context("Failed to install Ctrl-C handler")?;
    }

    let total = jobs.len();
    let mut rejected = 0;
    let mut received = 0;

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for job in jobs {
                if interrupted.load(Ordering::SeqCst) || pool.submit(job).is_err() {
                    break;
                }
            }
        });

        while received < total {
            if interrupted.load(Ordering::SeqCst) {
                warn!("Interrupted, waiting for running documents to finish");
                pool.shutdown();
                break;
            }
            if let Some(result) = pool.recv_result_timeout(Duration::from_millis(200)) {
                received += 1;
                if result.state.is_none() {
                    rejected += 1;
                }
                println!("{}", summarize(&result));
            }
        }
    });

    pool.shutdown();
    pool.wait();
    info!(total, received, rejected, "Batch finished");

    if rejected > 0 {
        bail!("{} of {} files could not be processed", rejected, total);
    }
    Ok(())
}

pub fn logs(config: &Config, run_id: Option<&str>, limit: u32) -> Result<()> {
    let path = match &config.log_store {
        LogStoreConfig::Sqlite { path } => resolve_database_path(path.as_deref())?,
        _ => bail!("The logs command reads the SQLite log store only"),
    };
    let db = Database::open(&path)
        .with_context(|| format!("Failed to open log database {}", path.display()))?;

    match run_id {
        Some(run_id) => {
            let run_id = Uuid::parse_str(run_id).context("Invalid run id")?;
            let entries = log_repo::list_by_run(&db, &run_id)?;
            if entries.is_empty() {
                bail!("No log entries for run {}", run_id);
            }
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        None => {
            for run in log_repo::list_recent_runs(&db, limit)? {
                println!(
                    "{}  {} entries  {} errors  {} .. {}",
                    run.run_id, run.entries, run.errors, run.first_at, run.last_at
                );
            }
        }
    }
    Ok(())
}

fn summarize(result: &JobResult) -> String {
    let name = result
        .source_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| result.source_path.display().to_string());

    match (&result.state, &result.error) {
        (Some(state), _) => format!("{}: {}", name, describe(state)),
        (None, Some(error)) => format!("{}: not processed ({})", name, error),
        (None, None) => format!("{}: not processed", name),
    }
}

fn describe(state: &PipelineState) -> String {
    let action = state
        .next_action
        .map(|a| format!("{:?}", a).to_uppercase())
        .unwrap_or_else(|| "NONE".to_string());
    if state.has_failures() {
        let stages: Vec<_> = state
            .failed_stages()
            .iter()
            .map(|s| s.as_str())
            .collect();
        format!("{} (failed: {})", action, stages.join(", "))
    } else {
        format!("{} (ok)", action)
    }
}
