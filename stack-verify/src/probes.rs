use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::json;
use sqlx::{Connection, PgConnection};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::types::{
    ApiEndpointResult, CryptoModeResult, DnsResult, HealthCheckResult, InfraResult,
};

/// Endpoints tried in order by the basic API scan. 404/405 still count as
/// reachable for services that don't implement a given path.
const SCAN_ENDPOINTS: &[&str] = &["/health", "/", "/api/v1/status"];
const ACCEPTABLE_SCAN_CODES: &[u16] = &[200, 404, 405];

const DNS_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Prober {
    client: reqwest::Client,
    config: Config,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

impl Prober {
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    /// Poll postgres and redis on a fixed interval until both answer or the
    /// startup timeout runs out. Returns false on timeout; the caller decides
    /// whether to proceed anyway.
    pub async fn wait_for_core_infra(&self) -> bool {
        info!(
            timeout_secs = self.config.startup_timeout_seconds,
            "Waiting for core infrastructure to come up"
        );
        let started = Instant::now();
        let timeout = Duration::from_secs(self.config.startup_timeout_seconds);
        let interval = Duration::from_secs(self.config.startup_poll_interval_seconds);

        loop {
            let postgres = self.probe_postgres().await;
            let redis = self.probe_redis().await;
            if postgres.is_working() && redis.is_working() {
                info!("Core infrastructure is ready");
                return true;
            }

            if started.elapsed() >= timeout {
                warn!("Timed out waiting for core infrastructure");
                return false;
            }

            info!(
                elapsed_secs = started.elapsed().as_secs(),
                "Services still starting..."
            );
            tokio::time::sleep(interval).await;
        }
    }

    pub async fn probe_service_health(&self, base_url: &str) -> HealthCheckResult {
        let url = format!("{}/health", base_url);
        let started = Instant::now();

        match self.client.get(&url).send().await {
            Ok(resp) => {
                let elapsed_ms = round2(started.elapsed().as_secs_f64() * 1000.0);
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();

                if status == reqwest::StatusCode::OK {
                    HealthCheckResult {
                        status: "healthy".to_string(),
                        response_time_ms: Some(elapsed_ms),
                        response: Some(snippet(&body)),
                        error: None,
                    }
                } else {
                    HealthCheckResult {
                        status: "unhealthy".to_string(),
                        response_time_ms: Some(elapsed_ms),
                        response: Some(snippet(&body)),
                        error: Some(format!("HTTP {}", status.as_u16())),
                    }
                }
            }
            Err(e) if e.is_connect() => HealthCheckResult {
                status: "unreachable".to_string(),
                response_time_ms: None,
                response: None,
                error: Some("Connection refused".to_string()),
            },
            Err(e) => HealthCheckResult {
                status: "error".to_string(),
                response_time_ms: None,
                response: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub async fn probe_postgres(&self) -> InfraResult {
        match PgConnection::connect(&self.config.database_url).await {
            Ok(mut conn) => {
                let result = sqlx::query_scalar::<_, String>("SELECT version()")
                    .fetch_one(&mut conn)
                    .await;
                let _ = conn.close().await;
                match result {
                    Ok(version) => InfraResult {
                        status: "connected".to_string(),
                        version: Some(version),
                        ..Default::default()
                    },
                    Err(e) => InfraResult::failed(e.to_string()),
                }
            }
            Err(e) => {
                debug!(error = %e, "postgres probe failed");
                InfraResult::failed(e.to_string())
            }
        }
    }

    pub async fn probe_redis(&self) -> InfraResult {
        let client = match redis::Client::open(self.config.redis_url.as_str()) {
            Ok(client) => client,
            Err(e) => return InfraResult::failed(e.to_string()),
        };

        match client.get_multiplexed_async_connection().await {
            Ok(mut conn) => {
                if let Err(e) = redis::cmd("PING")
                    .query_async::<_, String>(&mut conn)
                    .await
                {
                    return InfraResult::failed(e.to_string());
                }

                let info: String = redis::cmd("INFO")
                    .query_async(&mut conn)
                    .await
                    .unwrap_or_default();

                InfraResult {
                    status: "connected".to_string(),
                    version: parse_info_field(&info, "redis_version"),
                    used_memory: parse_info_field(&info, "used_memory_human"),
                    ..Default::default()
                }
            }
            Err(e) => {
                debug!(error = %e, "redis probe failed");
                InfraResult::failed(e.to_string())
            }
        }
    }

    pub async fn probe_elasticsearch(&self) -> InfraResult {
        let url = format!("{}/_cluster/health", self.config.elasticsearch_url);

        let outcome = async {
            let resp = self.client.get(&url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                anyhow::bail!("HTTP {}", status.as_u16());
            }
            let body: serde_json::Value = resp.json().await?;
            Ok::<_, anyhow::Error>(body)
        }
        .await;

        match outcome {
            Ok(body) => InfraResult {
                status: "connected".to_string(),
                cluster_status: body
                    .get("status")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string()),
                number_of_nodes: body.get("number_of_nodes").and_then(|v| v.as_i64()),
                ..Default::default()
            },
            Err(e) => {
                debug!(error = %e, "elasticsearch probe failed");
                InfraResult::failed(e.to_string())
            }
        }
    }

    /// Single `eth_chainId` JSON-RPC round trip. An envelope without a
    /// `result` field counts as a failure even on HTTP 200.
    pub async fn probe_chain_rpc(&self, rpc_url: &str) -> InfraResult {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": "eth_chainId",
            "params": [],
            "id": 1
        });

        let outcome = async {
            let resp = self.client.post(rpc_url).json(&payload).send().await?;
            let status = resp.status();
            if !status.is_success() {
                anyhow::bail!("HTTP {}", status.as_u16());
            }
            let body: serde_json::Value = resp.json().await?;
            match body.get("result").and_then(|v| v.as_str()) {
                Some(chain_id) => Ok::<_, anyhow::Error>(chain_id.to_string()),
                None => anyhow::bail!("Invalid RPC response"),
            }
        }
        .await;

        match outcome {
            Ok(chain_id) => InfraResult {
                status: "connected".to_string(),
                chain_id: Some(chain_id),
                rpc_url: Some(rpc_url.to_string()),
                ..Default::default()
            },
            Err(e) => {
                debug!(rpc_url, error = %e, "chain probe failed");
                InfraResult::failed(e.to_string())
            }
        }
    }

    pub async fn probe_storage_mock(&self, url: &str) -> InfraResult {
        let outcome = async {
            let resp = self.client.get(url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                anyhow::bail!("HTTP {}", status.as_u16());
            }
            let body = resp.text().await?;
            Ok::<_, anyhow::Error>(body.len())
        }
        .await;

        match outcome {
            Ok(response_length) => InfraResult {
                status: "accessible".to_string(),
                response_length: Some(response_length),
                ..Default::default()
            },
            Err(e) => {
                debug!(url, error = %e, "storage mock probe failed");
                InfraResult::failed(e.to_string())
            }
        }
    }

    /// Try the well-known endpoints in order until one of them answers with
    /// an acceptable status code.
    pub async fn scan_api_endpoints(&self, base_url: &str) -> ApiEndpointResult {
        for endpoint in SCAN_ENDPOINTS {
            let url = format!("{}{}", base_url, endpoint);
            let started = Instant::now();

            let resp = match self
                .client
                .get(&url)
                .timeout(Duration::from_secs(5))
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(_) => continue,
            };

            let code = resp.status().as_u16();
            if ACCEPTABLE_SCAN_CODES.contains(&code) {
                return ApiEndpointResult {
                    accessible: true,
                    endpoint: Some(endpoint.to_string()),
                    status_code: Some(code),
                    response_time_ms: Some(round2(started.elapsed().as_secs_f64() * 1000.0)),
                    error: None,
                };
            }
        }

        ApiEndpointResult {
            accessible: false,
            endpoint: None,
            status_code: None,
            response_time_ms: None,
            error: Some("no accessible endpoints found".to_string()),
        }
    }

    /// Container-to-container DNS check, run through the docker CLI the same
    /// way an operator would from the host.
    pub async fn probe_dns(&self) -> DnsResult {
        let mut command = tokio::process::Command::new("docker");
        command.args([
            "exec",
            self.config.dns_probe_container.as_str(),
            "nslookup",
            self.config.dns_probe_target.as_str(),
        ]);

        match tokio::time::timeout(DNS_PROBE_TIMEOUT, command.output()).await {
            Ok(Ok(output)) if output.status.success() => DnsResult {
                status: "working".to_string(),
                error: None,
            },
            Ok(Ok(output)) => DnsResult {
                status: "failed".to_string(),
                error: Some(String::from_utf8_lossy(&output.stderr).trim().to_string()),
            },
            Ok(Err(e)) => DnsResult {
                status: "error".to_string(),
                error: Some(e.to_string()),
            },
            Err(_) => DnsResult {
                status: "timeout".to_string(),
                error: None,
            },
        }
    }

    /// Read the crypto feature flag off a service health body.
    pub async fn probe_crypto_mode(&self, base_url: &str) -> CryptoModeResult {
        let url = format!("{}/health", base_url);

        let outcome = async {
            let resp = self.client.get(&url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                anyhow::bail!("HTTP {}", status.as_u16());
            }
            let body: serde_json::Value = resp.json().await?;
            Ok::<_, anyhow::Error>(body)
        }
        .await;

        match outcome {
            Ok(body) => CryptoModeResult {
                verified: true,
                crypto_enabled: Some(
                    body.get("crypto_enabled")
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false),
                ),
                error: None,
            },
            Err(e) => CryptoModeResult {
                verified: false,
                crypto_enabled: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Pull one `key:value` line out of a redis INFO dump.
fn parse_info_field(info: &str, key: &str) -> Option<String> {
    info.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_field() {
        let info = "# Server\r\nredis_version:7.2.4\r\nused_memory_human:1.05M\r\n";
        assert_eq!(
            parse_info_field(info, "redis_version"),
            Some("7.2.4".to_string())
        );
        assert_eq!(
            parse_info_field(info, "used_memory_human"),
            Some("1.05M".to_string())
        );
        assert_eq!(parse_info_field(info, "uptime_in_seconds"), None);
    }

    #[test]
    fn test_snippet_truncates_to_200_chars() {
        let long = "x".repeat(500);
        assert_eq!(snippet(&long).len(), 200);
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(3.14159), 3.14);
    }
}
