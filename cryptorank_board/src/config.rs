use std::time::Duration;

use cryptorank_util::ConfigContext;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

pub struct BoardConfig {
    pub base_url: String,
    pub interval: Duration,
    pub timeout: Duration,
}

impl BoardConfig {
    pub fn from_env() -> BoardConfig {
        BoardConfig::with_prefix("CRYPTORANK_BOARD")
    }

    pub fn with_prefix(prefix: &str) -> BoardConfig {
        let config = ConfigContext::new(prefix);

        BoardConfig {
            base_url: resolve_base_url(config.var_opt("PUBLIC_HOST"), config.var_opt("URL")),
            interval: config.duration_or("INTERVAL", Duration::from_secs(60)),
            timeout: config.duration_or("TIMEOUT", Duration::from_secs(15)),
        }
    }
}

/// A deployment's public host wins, then an explicit URL, then the local
/// development server. The public host is always served over https, whatever
/// scheme it was given with.
pub fn resolve_base_url(public_host: Option<String>, explicit: Option<String>) -> String {
    if let Some(host) = public_host {
        let host = host.trim();
        let host = host.find("://").map_or(host, |idx| &host[idx + 3..]);
        return format!("https://{}", host.trim_end_matches('/'));
    }

    match explicit {
        Some(url) => url.trim().trim_end_matches('/').to_owned(),
        None => DEFAULT_BASE_URL.to_owned(),
    }
}
