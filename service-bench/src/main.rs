mod config;
mod contract_sim;
mod report;
mod runner;
mod stats;
mod types;

use anyhow::Result;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "service_bench=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;
    let artifact_path = config.artifact_path.clone();
    let suite = runner::BenchmarkSuite::new(config)?;

    tokio::select! {
        outcome = suite.run() => {
            match outcome {
                Ok(results) => {
                    report::print_report(&results);
                    report::write_artifact(&artifact_path, &results)?;
                    info!(path = %artifact_path.display(), "Detailed results saved");
                    info!("Benchmark suite completed");
                    Ok(())
                }
                Err(e) => {
                    error!(error = %e, "Benchmark failed");
                    std::process::exit(1);
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Benchmark interrupted");
            std::process::exit(1);
        }
    }
}
