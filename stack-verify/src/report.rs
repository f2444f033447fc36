use std::path::Path;

use anyhow::{Context, Result};

use crate::types::TestResults;

/// Minimum aggregate success rate (percent) for a passing run. Rates below
/// this, even 69.9, fail.
pub const SUCCESS_THRESHOLD_PCT: f64 = 70.0;

pub fn healthy_service_count(results: &TestResults) -> usize {
    results
        .health_checks
        .values()
        .filter(|r| r.status == "healthy")
        .count()
}

pub fn working_infra_count(results: &TestResults) -> usize {
    results
        .infrastructure
        .values()
        .filter(|r| r.is_working())
        .count()
}

/// Successful probes over total probes, as a percentage. Only health checks
/// and infrastructure probes participate; DNS and crypto-mode checks are
/// informational.
pub fn aggregate_success_rate(results: &TestResults) -> f64 {
    let total = results.health_checks.len() + results.infrastructure.len();
    if total == 0 {
        return 0.0;
    }
    let passed = healthy_service_count(results) + working_infra_count(results);
    (passed as f64 / total as f64) * 100.0
}

pub fn meets_threshold(rate: f64) -> bool {
    rate >= SUCCESS_THRESHOLD_PCT
}

pub fn print_report(results: &TestResults) {
    println!();
    println!("{}", "=".repeat(60));
    println!("PLATFORM ENVIRONMENT TEST REPORT");
    println!("{}", "=".repeat(60));

    println!();
    println!("Service health checks:");
    for (service, result) in &results.health_checks {
        if result.status == "healthy" {
            println!(
                "  [ok]   {}: {} ({:.0}ms)",
                service,
                result.status,
                result.response_time_ms.unwrap_or(0.0)
            );
        } else {
            println!(
                "  [fail] {}: {} - {}",
                service,
                result.status,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    let healthy = healthy_service_count(results);
    let total_services = results.health_checks.len();
    if total_services > 0 {
        println!(
            "  Service health: {}/{} ({:.1}%)",
            healthy,
            total_services,
            (healthy as f64 / total_services as f64) * 100.0
        );
    }

    println!();
    println!("Infrastructure components:");
    for (component, result) in &results.infrastructure {
        if result.is_working() {
            println!("  [ok]   {}: {}", component, result.status);
            if let Some(version) = &result.version {
                println!("         version: {}", version);
            }
            if let Some(chain_id) = &result.chain_id {
                println!("         chain id: {}", chain_id);
            }
        } else {
            println!(
                "  [fail] {}: {} - {}",
                component,
                result.status,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    let working = working_infra_count(results);
    let total_infra = results.infrastructure.len();
    if total_infra > 0 {
        println!(
            "  Infrastructure health: {}/{} ({:.1}%)",
            working,
            total_infra,
            (working as f64 / total_infra as f64) * 100.0
        );
    }

    println!();
    println!("Network & DNS:");
    for (name, result) in &results.dns_tests {
        let marker = if result.status == "working" { "ok" } else { "fail" };
        println!("  [{}] {}: {}", marker, name, result.status);
    }

    println!();
    println!("Crypto mode:");
    for (name, result) in &results.crypto_mode_tests {
        if result.verified {
            println!(
                "  [ok]   {}: crypto_enabled = {}",
                name,
                result.crypto_enabled.unwrap_or(false)
            );
        } else {
            println!("  [fail] {}: verification failed", name);
        }
    }

    println!();
    let rate = aggregate_success_rate(results);
    let passed = healthy + working;
    let total = total_services + total_infra;
    println!("Overall: {:.1}% ({}/{})", rate, passed, total);
    if rate >= 90.0 {
        println!("  EXCELLENT - environment is fully operational");
    } else if rate >= SUCCESS_THRESHOLD_PCT {
        println!("  GOOD - environment is mostly operational");
    } else if rate >= 50.0 {
        println!("  FAIR - environment has significant issues");
    } else {
        println!("  POOR - environment has major problems");
    }
    println!("{}", "=".repeat(60));
}

pub fn write_artifact(path: &Path, results: &TestResults) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
