use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tokio::fs;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub bind: String,
    pub path: String,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        debug!(?config, "Parsed configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let server_addr = self.server.bind_addr()?;

        if self.metrics.enabled {
            let metrics_addr: SocketAddr = self
                .metrics
                .bind
                .parse()
                .map_err(|e| anyhow!("Invalid metrics bind address '{}': {}", self.metrics.bind, e))?;

            if metrics_addr == server_addr {
                return Err(anyhow!(
                    "Metrics bind address {} collides with the server bind address",
                    metrics_addr
                ));
            }

            if !self.metrics.path.starts_with('/') {
                return Err(anyhow!("Metrics path '{}' must start with '/'", self.metrics.path));
            }
        }

        Ok(())
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| anyhow!("Invalid server bind address '{}': {}", self.bind, e))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind: "127.0.0.1:9090".to_string(),
            path: "/metrics".to_string(),
        }
    }
}
