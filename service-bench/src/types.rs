use std::collections::BTreeMap;

use serde::Serialize;

/// Full benchmark artifact, written pretty-printed to `benchmark_results.json`.
#[derive(Debug, Serialize)]
pub struct BenchmarkResults {
    pub generated_at: i64,
    pub system: SystemInfo,
    pub health: BTreeMap<String, HealthResult>,
    pub identity_service: EndpointStats,
    pub player_account_service: PlayerAccountResults,
    pub ai_data_service: AiDataResults,
    pub smart_contracts: SmartContractResults,
}

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub cpu_count: usize,
    pub os: &'static str,
    pub arch: &'static str,
    pub tool_version: &'static str,
}

impl SystemInfo {
    pub fn collect() -> Self {
        Self {
            cpu_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            tool_version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated statistics for one benchmarked operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointStats {
    pub avg_response_time_ms: f64,
    pub min_response_time_ms: f64,
    pub max_response_time_ms: f64,
    pub median_response_time_ms: f64,
    pub success_rate: f64,
    pub total_requests: u32,
    pub successful_requests: u32,
    pub failed_requests: u32,
}

#[derive(Debug, Serialize)]
pub struct PlayerAccountResults {
    pub account_creation: EndpointStats,
    pub account_queries: EndpointStats,
}

#[derive(Debug, Serialize)]
pub struct AiDataResults {
    pub generation: EndpointStats,
    pub model_info: EndpointStats,
}

#[derive(Debug, Serialize)]
pub struct SmartContractResults {
    pub deployment: OperationTiming,
    pub nft_mint: OperationTiming,
    pub nft_transfer: OperationTiming,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationTiming {
    pub avg_time_ms: f64,
    pub min_time_ms: f64,
    pub max_time_ms: f64,
}
