use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::json;
use tracing::{debug, info};

use crate::config::Config;
use crate::contract_sim;
use crate::stats;
use crate::types::{
    AiDataResults, BenchmarkResults, EndpointStats, HealthResult, PlayerAccountResults, SystemInfo,
};

const IDENTITY_ITERATIONS: u32 = 50;
const ACCOUNT_CREATE_ITERATIONS: u32 = 20;
const ACCOUNT_QUERY_ITERATIONS: u32 = 100;
const AI_GENERATE_ITERATIONS: u32 = 20;
const AI_MODEL_INFO_ITERATIONS: u32 = 50;
const CONTRACT_SIM_ROUNDS: u32 = 10;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

pub struct BenchmarkSuite {
    client: reqwest::Client,
    config: Config,
}

impl BenchmarkSuite {
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    /// Run the whole suite in program order: health pass, per-service
    /// request loops, contract timing simulation.
    pub async fn run(&self) -> Result<BenchmarkResults> {
        info!("Starting platform performance benchmarks");

        let system = SystemInfo::collect();
        info!(cpu_count = system.cpu_count, os = system.os, "System information collected");

        let health = self.check_service_health().await;

        let identity_service = self.benchmark_identity_service().await;
        let player_account_service = self.benchmark_player_account_service().await;
        let ai_data_service = self.benchmark_ai_data_service().await;

        info!("Benchmarking smart contract operations (simulated)");
        let smart_contracts = contract_sim::benchmark_contract_operations(CONTRACT_SIM_ROUNDS).await;

        Ok(BenchmarkResults {
            generated_at: chrono::Utc::now().timestamp(),
            system,
            health,
            identity_service,
            player_account_service,
            ai_data_service,
            smart_contracts,
        })
    }

    async fn check_service_health(&self) -> BTreeMap<String, HealthResult> {
        info!("Checking service health");
        let mut results = BTreeMap::new();

        for (name, base_url) in self.config.services() {
            let url = format!("{}/health", base_url);
            let started = Instant::now();

            let outcome = async {
                let resp = self
                    .client
                    .get(&url)
                    .timeout(Duration::from_secs(self.config.health_timeout_seconds))
                    .send()
                    .await?;
                let status = resp.status();
                let body: serde_json::Value = resp.json().await?;
                Ok::<_, anyhow::Error>((status, body))
            }
            .await;

            let result = match outcome {
                Ok((status, body)) => {
                    let elapsed_ms = stats::round2(started.elapsed().as_secs_f64() * 1000.0);
                    info!(service = name, latency_ms = elapsed_ms, "health check passed");
                    HealthResult {
                        status: if status == reqwest::StatusCode::OK {
                            "healthy".to_string()
                        } else {
                            "unhealthy".to_string()
                        },
                        response_time_ms: Some(elapsed_ms),
                        details: Some(body),
                        error: None,
                    }
                }
                Err(e) => {
                    info!(service = name, error = %e, "health check failed");
                    HealthResult {
                        status: "error".to_string(),
                        response_time_ms: None,
                        details: None,
                        error: Some(e.to_string()),
                    }
                }
            };

            results.insert(name.to_string(), result);
        }

        results
    }

    async fn benchmark_identity_service(&self) -> EndpointStats {
        info!("Benchmarking identity service");

        let payloads = vec![
            json!({
                "oauth_provider": "google",
                "oauth_token": "mock_google_token_123",
                "user_identifier": "test_user_1"
            }),
            json!({
                "oauth_provider": "github",
                "oauth_token": "mock_github_token_456",
                "user_identifier": "test_user_2"
            }),
        ];

        let results = self
            .run_endpoint_benchmark(
                &self.config.identity_url,
                "/zklogin",
                &payloads,
                Method::Post,
                IDENTITY_ITERATIONS,
            )
            .await;

        info!(
            avg_ms = results.avg_response_time_ms,
            success_rate = results.success_rate,
            "identity benchmark done"
        );
        results
    }

    async fn benchmark_player_account_service(&self) -> PlayerAccountResults {
        info!("Benchmarking player account service");

        let create_payloads: Vec<serde_json::Value> = (0..20)
            .map(|i| {
                json!({
                    "username": format!("player_{}", i),
                    "identity_hash": format!("hash_{}_mock", i),
                    "metadata": {"level": 1, "region": "test"}
                })
            })
            .collect();

        let account_creation = self
            .run_endpoint_benchmark(
                &self.config.player_account_url,
                "/account/create",
                &create_payloads,
                Method::Post,
                ACCOUNT_CREATE_ITERATIONS,
            )
            .await;

        let account_queries = self
            .run_endpoint_benchmark(
                &self.config.player_account_url,
                "/account/player_1/stats",
                &[],
                Method::Get,
                ACCOUNT_QUERY_ITERATIONS,
            )
            .await;

        info!(
            create_avg_ms = account_creation.avg_response_time_ms,
            query_avg_ms = account_queries.avg_response_time_ms,
            "player account benchmark done"
        );

        PlayerAccountResults {
            account_creation,
            account_queries,
        }
    }

    async fn benchmark_ai_data_service(&self) -> AiDataResults {
        info!("Benchmarking AI data service");

        let prompts = vec![
            json!({
                "prompt": "Hello, how are you?",
                "max_tokens": 50,
                "temperature": 0.7
            }),
            json!({
                "prompt": "Explain quantum computing briefly",
                "max_tokens": 100,
                "temperature": 0.5
            }),
            json!({
                "prompt": "Write a short poem about technology",
                "max_tokens": 75,
                "context": "Creative writing context"
            }),
        ];

        let generation = self
            .run_endpoint_benchmark(
                &self.config.ai_data_url,
                "/ai/generate",
                &prompts,
                Method::Post,
                AI_GENERATE_ITERATIONS,
            )
            .await;

        let model_info = self
            .run_endpoint_benchmark(
                &self.config.ai_data_url,
                "/model/info",
                &[],
                Method::Get,
                AI_MODEL_INFO_ITERATIONS,
            )
            .await;

        info!(
            generation_avg_ms = generation.avg_response_time_ms,
            info_avg_ms = model_info.avg_response_time_ms,
            "AI data benchmark done"
        );

        AiDataResults {
            generation,
            model_info,
        }
    }

    /// Sequential request loop against one endpoint. Payloads rotate per
    /// iteration; success means HTTP 200 with a parseable JSON body. A failed
    /// request contributes the configured penalty latency instead of a
    /// measured one.
    pub async fn run_endpoint_benchmark(
        &self,
        base_url: &str,
        endpoint: &str,
        payloads: &[serde_json::Value],
        method: Method,
        iterations: u32,
    ) -> EndpointStats {
        let url = format!("{}{}", base_url, endpoint);

        let mut latencies = Vec::with_capacity(iterations as usize);
        let mut successes = 0u32;
        let mut failures = 0u32;

        for i in 0..iterations {
            let started = Instant::now();

            let outcome = async {
                let request = match method {
                    Method::Post => {
                        let payload = &payloads[i as usize % payloads.len()];
                        self.client.post(&url).json(payload)
                    }
                    Method::Get => self.client.get(&url),
                };
                let resp = request.send().await?;
                let status = resp.status();
                let _body: serde_json::Value = resp.json().await?;
                Ok::<_, anyhow::Error>(status)
            }
            .await;

            match outcome {
                Ok(status) => {
                    latencies.push(started.elapsed().as_secs_f64() * 1000.0);
                    if status == reqwest::StatusCode::OK {
                        successes += 1;
                    } else {
                        failures += 1;
                    }
                }
                Err(e) => {
                    debug!(url = %url, iteration = i, error = %e, "request failed");
                    failures += 1;
                    latencies.push(self.config.penalty_latency_ms);
                }
            }
        }

        stats::summarize(&latencies, successes, failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> Config {
        Config {
            identity_url: "http://localhost:3001".to_string(),
            player_account_url: "http://localhost:3002".to_string(),
            ai_data_url: "http://localhost:3004".to_string(),
            request_timeout_seconds: 2,
            health_timeout_seconds: 1,
            penalty_latency_ms: 10_000.0,
            artifact_path: PathBuf::from("benchmark_results.json"),
        }
    }

    #[tokio::test]
    async fn test_benchmark_counts_successes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let suite = BenchmarkSuite::new(test_config()).unwrap();
        let payloads = vec![serde_json::json!({"n": 1}), serde_json::json!({"n": 2})];
        let stats = suite
            .run_endpoint_benchmark(&server.uri(), "/echo", &payloads, Method::Post, 4)
            .await;

        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.successful_requests, 4);
        assert_eq!(stats.failed_requests, 0);
        assert_eq!(stats.success_rate, 100.0);
        assert!(stats.max_response_time_ms < 10_000.0);
    }

    #[tokio::test]
    async fn test_non_200_counts_as_failure_with_real_latency() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "boom"})),
            )
            .mount(&server)
            .await;

        let suite = BenchmarkSuite::new(test_config()).unwrap();
        let stats = suite
            .run_endpoint_benchmark(&server.uri(), "/status", &[], Method::Get, 3)
            .await;

        assert_eq!(stats.successful_requests, 0);
        assert_eq!(stats.failed_requests, 3);
        assert_eq!(stats.success_rate, 0.0);
        // The response arrived, so latency is measured, not the penalty.
        assert!(stats.max_response_time_ms < 10_000.0);
    }

    #[tokio::test]
    async fn test_connection_error_takes_penalty_latency() {
        let suite = BenchmarkSuite::new(test_config()).unwrap();
        // Nothing listens on port 9.
        let stats = suite
            .run_endpoint_benchmark("http://127.0.0.1:9", "/health", &[], Method::Get, 2)
            .await;

        assert_eq!(stats.failed_requests, 2);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.min_response_time_ms, 10_000.0);
        assert_eq!(stats.max_response_time_ms, 10_000.0);
    }

    #[tokio::test]
    async fn test_health_pass_classifies_unreachable_service() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})),
            )
            .mount(&server)
            .await;

        let mut config = test_config();
        config.identity_url = server.uri();
        config.player_account_url = "http://127.0.0.1:9".to_string();
        config.ai_data_url = server.uri();

        let suite = BenchmarkSuite::new(config).unwrap();
        let health = suite.check_service_health().await;

        assert_eq!(health["identity"].status, "healthy");
        assert_eq!(health["player_account"].status, "error");
        assert!(health["player_account"].error.is_some());
        assert_eq!(health["ai_data"].status, "healthy");
    }
}
