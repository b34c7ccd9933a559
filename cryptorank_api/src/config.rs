use std::time::Duration;

use cryptorank_util::{ConfigContext, ConfigError};

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.coingecko.com/api/v3";

pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub backlog: i32,
    pub upstream_url: String,
    pub cache_ttl: Duration,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn from_env() -> Result<ApiConfig, ConfigError> {
        ApiConfig::with_prefix("CRYPTORANK_API")
    }

    pub fn with_prefix(prefix: &str) -> Result<ApiConfig, ConfigError> {
        let config = ConfigContext::new(prefix);

        Ok(ApiConfig {
            host: config.var_or("HOST", "127.0.0.1"),
            port: config.port_or("PORT", 3000)?,
            backlog: 2048,
            upstream_url: config.var_or("UPSTREAM_URL", DEFAULT_UPSTREAM_URL),
            cache_ttl: config.duration_or("CACHE_TTL", Duration::from_secs(60)),
            timeout: config.duration_or("TIMEOUT", Duration::from_secs(15)),
        })
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
