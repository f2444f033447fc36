use std::path::PathBuf;

use anyhow::Result;

#[derive(Clone)]
pub struct Config {
    pub identity_url: String,
    pub player_account_url: String,
    pub ai_data_url: String,

    pub request_timeout_seconds: u64,
    pub health_timeout_seconds: u64,
    /// Latency recorded for a failed request so aggregates stay computable.
    pub penalty_latency_ms: f64,

    pub artifact_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            identity_url: std::env::var("BENCH_IDENTITY_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            player_account_url: std::env::var("BENCH_PLAYER_ACCOUNT_URL")
                .unwrap_or_else(|_| "http://localhost:3002".to_string()),
            ai_data_url: std::env::var("BENCH_AI_DATA_URL")
                .unwrap_or_else(|_| "http://localhost:3004".to_string()),

            request_timeout_seconds: std::env::var("BENCH_REQUEST_TIMEOUT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            health_timeout_seconds: std::env::var("BENCH_HEALTH_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            penalty_latency_ms: std::env::var("BENCH_PENALTY_LATENCY_MS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()?,

            artifact_path: PathBuf::from(
                std::env::var("BENCH_RESULTS_PATH")
                    .unwrap_or_else(|_| "benchmark_results.json".to_string()),
            ),
        })
    }

    /// Services probed by the health pass, in report order.
    pub fn services(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("identity", self.identity_url.as_str()),
            ("player_account", self.player_account_url.as_str()),
            ("ai_data", self.ai_data_url.as_str()),
        ]
    }
}
