use std::collections::BTreeMap;

use serde::Serialize;

/// Per-run accumulator, written once to `test_results.json` after the suite.
/// Each key is written at most once per run.
#[derive(Debug, Default, Serialize)]
pub struct TestResults {
    pub generated_at: i64,
    pub services: BTreeMap<String, ApiEndpointResult>,
    pub infrastructure: BTreeMap<String, InfraResult>,
    pub health_checks: BTreeMap<String, HealthCheckResult>,
    pub dns_tests: BTreeMap<String, DnsResult>,
    pub crypto_mode_tests: BTreeMap<String, CryptoModeResult>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthCheckResult {
    /// healthy | unhealthy | unreachable | error
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    /// First 200 characters of the response body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct InfraResult {
    /// connected | accessible | failed
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_nodes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InfraResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: "failed".to_string(),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn is_working(&self) -> bool {
        self.status == "connected" || self.status == "accessible"
    }
}

#[derive(Debug, Serialize)]
pub struct ApiEndpointResult {
    pub accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DnsResult {
    /// working | failed | timeout | error
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CryptoModeResult {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crypto_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
