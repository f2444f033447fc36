mod config;
mod patcher;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use patcher::RuleOutcome;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dockerfile_fixer=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;
    info!(
        root = %config.platform_root.display(),
        services = config.services.len(),
        "Fixing Dockerfiles for workspace builds"
    );

    let mut incomplete = 0;
    for service in &config.services {
        let path = config.dockerfile_path(service);
        if !path.exists() {
            warn!(service = %service, path = %path.display(), "Dockerfile not found");
            incomplete += 1;
            continue;
        }

        match patch_file(&path, service) {
            Ok(true) => info!(service = %service, path = %path.display(), "Dockerfile patched"),
            Ok(false) => {
                warn!(service = %service, path = %path.display(), "Dockerfile only partially patched");
                incomplete += 1;
            }
            Err(e) => {
                warn!(service = %service, error = %e, "Failed to patch Dockerfile");
                incomplete += 1;
            }
        }
    }

    if incomplete > 0 {
        warn!(incomplete, "Some Dockerfiles were not fully patched");
        std::process::exit(1);
    }

    info!("All Dockerfiles patched");
    Ok(())
}

/// Patch one Dockerfile in place. Unmatched anchors are reported but never
/// block the substitutions that did match; the file is written back either
/// way, exactly as it came out of the rules.
fn patch_file(path: &Path, service: &str) -> Result<bool> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let (patched, report) = patcher::patch_dockerfile(&content, service)?;

    for rule in &report.rules {
        match rule.outcome {
            RuleOutcome::Applied => {
                info!(service = %service, rule = rule.rule, "anchor rewritten")
            }
            RuleOutcome::AlreadyPatched => {
                info!(service = %service, rule = rule.rule, "already patched")
            }
            RuleOutcome::NotFound => {
                warn!(service = %service, rule = rule.rule, "anchor not found")
            }
        }
    }

    std::fs::write(path, &patched)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(report.fully_patched())
}
