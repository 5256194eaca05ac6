use crate::config::ServerConfig;
use crate::error::ServerResult;
use dashmap::DashMap;
use embedding::EmbedderSet;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Rate limit tracking: API key -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, std::time::Instant)>>,

    /// Both embedding backends, constructed once and shared across requests
    pub embedders: Arc<EmbedderSet>,
}

impl ServerState {
    /// Create new server state
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let embedders = Arc::new(EmbedderSet::new(&config.embedding)?);

        Ok(Self {
            config: Arc::new(config),
            rate_limiter: Arc::new(DashMap::new()),
            embedders,
        })
    }

    /// Whether the API key boundary is active at all
    pub fn auth_enabled(&self) -> bool {
        !self.config.api_keys.is_empty()
    }

    /// Check if API key is valid
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.contains(key)
    }

    /// Check rate limit for API key
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = std::time::Instant::now();
        let window = std::time::Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        // Check limit
        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}
