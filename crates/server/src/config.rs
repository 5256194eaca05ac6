use embedding::EmbeddingConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Rows per dispatched batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Ceiling on concurrent batch workers per request
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Rate limit: requests per minute per API key
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    /// API keys. Empty means the endpoint is open, which matches how the
    /// service is deployed next to the database it serves.
    #[serde(default)]
    pub api_keys: HashSet<String>,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Backend settings for both embedding paths
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            batch_size: default_batch_size(),
            max_workers: default_max_workers(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            api_keys: HashSet::new(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config files
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("embedrelay").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("EMBEDRELAY").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with. Called at startup so a
    /// bad batch size fails the boot, not the first request.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("batch_size must be at least 1");
        }
        if self.max_workers == 0 {
            anyhow::bail!("max_workers must be at least 1");
        }
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_batch_size() -> usize {
    1024
}

fn default_max_workers() -> usize {
    16
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    10
}

fn default_rate_limit_per_minute() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.batch_size, 1024);
        assert_eq!(cfg.max_workers, 16);
        assert_eq!(cfg.timeout_secs, 30);
        assert!(cfg.api_keys.is_empty());
        assert!(cfg.enable_cors);
        cfg.validate().expect("defaults must validate");
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let cfg = ServerConfig {
            batch_size: 0,
            ..ServerConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_max_workers_rejected() {
        let cfg = ServerConfig {
            max_workers: 0,
            ..ServerConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_embedding_section_deserializes() {
        let cfg: ServerConfig = serde_json::from_str(
            r#"{"port": 6000, "embedding": {"local": {"mode": "stub"}}}"#,
        )
        .unwrap();
        assert_eq!(cfg.port, 6000);
        assert_eq!(cfg.embedding.local.mode, "stub");
        assert_eq!(cfg.batch_size, 1024);
    }
}
