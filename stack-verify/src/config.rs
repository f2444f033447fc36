use std::path::PathBuf;

use anyhow::Result;

/// Service name / host port pairs as exposed by the local compose file.
const DEFAULT_SERVICES: &[(&str, u16)] = &[
    ("marketplace", 8081),
    ("indexer", 8082),
    ("identity", 8083),
    ("ai-data", 8084),
    ("account", 8085),
    ("feedback", 8086),
    ("mission", 8087),
    ("payment", 8088),
    ("social", 8089),
];

#[derive(Clone)]
pub struct ServiceTarget {
    pub name: String,
    pub url: String,
}

#[derive(Clone)]
pub struct Config {
    pub services: Vec<ServiceTarget>,

    // Infrastructure endpoints
    pub database_url: String,
    pub redis_url: String,
    pub elasticsearch_url: String,
    pub ethereum_rpc_url: String,
    pub arbitrum_rpc_url: String,
    pub ipfs_mock_url: String,
    pub arweave_mock_url: String,

    // Timeouts
    pub request_timeout_seconds: u64,
    pub startup_poll_interval_seconds: u64,
    pub startup_timeout_seconds: u64,

    // DNS probe runs inside a compose container
    pub dns_probe_container: String,
    pub dns_probe_target: String,

    pub artifact_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let host = std::env::var("STACK_HOST").unwrap_or_else(|_| "localhost".to_string());

        let services = DEFAULT_SERVICES
            .iter()
            .map(|(name, port)| ServiceTarget {
                name: name.to_string(),
                url: format!("http://{}:{}", host, port),
            })
            .collect();

        Ok(Self {
            services,

            database_url: std::env::var("STACK_DATABASE_URL").unwrap_or_else(|_| {
                format!("postgres://platform:dev123@{}:5432/platform", host)
            }),
            redis_url: std::env::var("STACK_REDIS_URL")
                .unwrap_or_else(|_| format!("redis://:dev123@{}:6379", host)),
            elasticsearch_url: std::env::var("STACK_ELASTICSEARCH_URL")
                .unwrap_or_else(|_| format!("http://{}:9200", host)),
            ethereum_rpc_url: std::env::var("STACK_ETHEREUM_RPC_URL")
                .unwrap_or_else(|_| format!("http://{}:8545", host)),
            arbitrum_rpc_url: std::env::var("STACK_ARBITRUM_RPC_URL")
                .unwrap_or_else(|_| format!("http://{}:8547", host)),
            ipfs_mock_url: std::env::var("STACK_IPFS_MOCK_URL")
                .unwrap_or_else(|_| format!("http://{}:8080", host)),
            arweave_mock_url: std::env::var("STACK_ARWEAVE_MOCK_URL")
                .unwrap_or_else(|_| format!("http://{}:1984", host)),

            request_timeout_seconds: std::env::var("STACK_REQUEST_TIMEOUT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            startup_poll_interval_seconds: std::env::var("STACK_STARTUP_POLL_INTERVAL")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            startup_timeout_seconds: std::env::var("STACK_STARTUP_TIMEOUT")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,

            dns_probe_container: std::env::var("STACK_DNS_CONTAINER")
                .unwrap_or_else(|_| "marketplace-service".to_string()),
            dns_probe_target: std::env::var("STACK_DNS_TARGET")
                .unwrap_or_else(|_| "postgres".to_string()),

            artifact_path: PathBuf::from(
                std::env::var("STACK_RESULTS_PATH")
                    .unwrap_or_else(|_| "test_results.json".to_string()),
            ),
        })
    }

    pub fn marketplace_url(&self) -> Option<&str> {
        self.services
            .iter()
            .find(|s| s.name == "marketplace")
            .map(|s| s.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_table() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.services.len(), 9);
        assert_eq!(config.services[0].name, "marketplace");
        assert!(config.services[0].url.ends_with(":8081"));
        assert_eq!(config.services[8].name, "social");
        assert!(config.services[8].url.ends_with(":8089"));
    }

    #[test]
    fn test_marketplace_lookup() {
        let config = Config::from_env().unwrap();
        assert!(config.marketplace_url().is_some());
    }
}
