// crates/worker/src/main.rs
//! Atrium batch worker binary.
//!
//! Spawned by the container runner with one job id as its argument. Drives
//! the job to a terminal state and exits; the job's own failure is a normal
//! exit here because the record carries the error.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use atrium_core::AppConfig;
use atrium_db::Database;
use atrium_runner::HttpJobLauncher;
use atrium_worker::run_job;

#[derive(Debug, Parser)]
#[command(name = "atrium-worker", about = "Run one atrium batch job to completion")]
struct Args {
    /// Id of the job record to execute.
    job_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    // The only place the process environment is read.
    let config = AppConfig::from_env()?;
    let db = Database::new(&config.database_path).await?;
    let launcher = HttpJobLauncher::new(config.runner_url.clone(), config.runner_token.clone());

    let status = run_job(&db, &launcher, &config, &args.job_id).await?;
    tracing::info!(job_id = %args.job_id, status = %status, "job finished");
    Ok(())
}
