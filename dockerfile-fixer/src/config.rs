use std::path::PathBuf;

use anyhow::{bail, Result};

/// Services whose Dockerfiles still follow the per-crate build template.
/// feedback was migrated by hand; ipfs-mock has a different build shape.
pub const DEFAULT_SERVICES: &[&str] = &[
    "marketplace",
    "indexer",
    "identity",
    "ai_data",
    "account",
    "mission",
    "payment",
    "social",
];

pub struct Config {
    /// Repository root containing `infra/dockerfiles/<service>/Dockerfile`.
    pub platform_root: PathBuf,
    pub services: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let platform_root = PathBuf::from(
            std::env::var("PLATFORM_ROOT").unwrap_or_else(|_| ".".to_string()),
        );

        let services: Vec<String> = match std::env::var("FIXER_SERVICES") {
            Ok(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => DEFAULT_SERVICES.iter().map(|s| s.to_string()).collect(),
        };

        if services.is_empty() {
            bail!("FIXER_SERVICES must contain at least one service name");
        }

        Ok(Self {
            platform_root,
            services,
        })
    }

    pub fn dockerfile_path(&self, service: &str) -> PathBuf {
        self.platform_root
            .join("infra")
            .join("dockerfiles")
            .join(service)
            .join("Dockerfile")
    }
}
