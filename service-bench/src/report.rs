use std::path::Path;

use anyhow::{Context, Result};

use crate::types::BenchmarkResults;

/// Human-readable summary, printed after the suite finishes. The full data
/// goes to the JSON artifact; this is the at-a-glance version.
pub fn print_report(results: &BenchmarkResults) {
    println!();
    println!("{}", "=".repeat(60));
    println!("PLATFORM PERFORMANCE REPORT");
    println!("{}", "=".repeat(60));

    println!();
    println!("System configuration:");
    println!("  CPU cores: {}", results.system.cpu_count);
    println!("  Platform:  {}/{}", results.system.os, results.system.arch);

    println!();
    println!("Service health:");
    for (service, health) in &results.health {
        match health.response_time_ms {
            Some(ms) => println!("  [ok]   {}: {:.0}ms", service, ms),
            None => println!(
                "  [fail] {}: {}",
                service,
                health.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    println!();
    println!("Performance summary:");

    let identity = &results.identity_service;
    println!(
        "  identity:        {:.2}ms avg, {:.1}% success",
        identity.avg_response_time_ms, identity.success_rate
    );

    let accounts = &results.player_account_service;
    println!(
        "  player accounts: {:.2}ms create, {:.2}ms query",
        accounts.account_creation.avg_response_time_ms,
        accounts.account_queries.avg_response_time_ms
    );

    let ai = &results.ai_data_service;
    println!(
        "  ai data:         {:.2}ms generation, {:.2}ms model info",
        ai.generation.avg_response_time_ms, ai.model_info.avg_response_time_ms
    );

    let contracts = &results.smart_contracts;
    println!(
        "  contracts (sim): {:.2}ms deploy, {:.2}ms mint, {:.2}ms transfer",
        contracts.deployment.avg_time_ms,
        contracts.nft_mint.avg_time_ms,
        contracts.nft_transfer.avg_time_ms
    );

    println!("{}", "=".repeat(60));
}

pub fn write_artifact(path: &Path, results: &BenchmarkResults) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use std::collections::BTreeMap;

    fn stub_stats() -> EndpointStats {
        EndpointStats {
            avg_response_time_ms: 12.5,
            min_response_time_ms: 10.0,
            max_response_time_ms: 15.0,
            median_response_time_ms: 12.0,
            success_rate: 100.0,
            total_requests: 4,
            successful_requests: 4,
            failed_requests: 0,
        }
    }

    fn stub_results() -> BenchmarkResults {
        let mut health = BTreeMap::new();
        health.insert(
            "identity".to_string(),
            HealthResult {
                status: "healthy".to_string(),
                response_time_ms: Some(3.2),
                details: None,
                error: None,
            },
        );

        BenchmarkResults {
            generated_at: 1_700_000_000,
            system: SystemInfo {
                cpu_count: 8,
                os: "linux",
                arch: "x86_64",
                tool_version: "0.1.0",
            },
            health,
            identity_service: stub_stats(),
            player_account_service: PlayerAccountResults {
                account_creation: stub_stats(),
                account_queries: stub_stats(),
            },
            ai_data_service: AiDataResults {
                generation: stub_stats(),
                model_info: stub_stats(),
            },
            smart_contracts: SmartContractResults {
                deployment: OperationTiming {
                    avg_time_ms: 245.0,
                    min_time_ms: 200.0,
                    max_time_ms: 290.0,
                },
                nft_mint: OperationTiming {
                    avg_time_ms: 122.5,
                    min_time_ms: 100.0,
                    max_time_ms: 145.0,
                },
                nft_transfer: OperationTiming {
                    avg_time_ms: 93.5,
                    min_time_ms: 80.0,
                    max_time_ms: 107.0,
                },
            },
        }
    }

    #[test]
    fn test_artifact_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("benchmark_results.json");

        write_artifact(&path, &stub_results()).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(parsed["system"]["cpu_count"], 8);
        assert_eq!(parsed["health"]["identity"]["status"], "healthy");
        assert_eq!(parsed["identity_service"]["success_rate"], 100.0);
        assert_eq!(
            parsed["player_account_service"]["account_creation"]["total_requests"],
            4
        );
        assert_eq!(parsed["smart_contracts"]["deployment"]["avg_time_ms"], 245.0);
        // Optional fields absent, not null.
        assert!(parsed["health"]["identity"].get("error").is_none());
    }
}
