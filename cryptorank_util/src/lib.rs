pub mod tcp;

use std::env;
use std::time::Duration;

use log::{warn, error};
use snafu::{Snafu, ResultExt};

/// Installs `pretty_env_logger`, preferring `RUST_LOG` over `default_filters`.
pub fn init_logging(default_filters: &str) {
    let log_env_raw = env::var("RUST_LOG");
    let filters = match &log_env_raw {
        Ok(s) if !s.is_empty() => s.as_str(),
        _ => default_filters,
    };

    pretty_env_logger::formatted_timed_builder()
        .parse_filters(filters)
        .init();

    match &log_env_raw {
        Err(env::VarError::NotUnicode(..)) =>
            error!("Failed to read 'RUST_LOG' due to invalid Unicode. Using default instead: '{}'", default_filters),

        Err(env::VarError::NotPresent) =>
            warn!("Missing 'RUST_LOG'. Using default instead: '{}'", default_filters),

        Ok(s) if s.is_empty() =>
            warn!("Got empty 'RUST_LOG'. Using default instead: '{}'", default_filters),

        Ok(_) => (),
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("'{}' missing or unset in '.env' file: {}", name, source))]
    BadVariable {
        name: String,
        source: env::VarError,
    },

    #[snafu(display("'{}' has an invalid value '{}': {}", name, input, reason))]
    InvalidValue {
        name: String,
        input: String,
        reason: String,
    },
}

/// Reads environment variables sharing a common prefix, e.g. `CRYPTORANK_API_PORT`.
pub struct ConfigContext {
    prefix: String,
}

impl ConfigContext {
    pub fn new(prefix: impl AsRef<str>) -> ConfigContext {
        ConfigContext {
            prefix: prefix.as_ref().to_owned(),
        }
    }

    pub fn name_of(&self, name: impl AsRef<str>) -> String {
        format!("{}_{}", self.prefix, name.as_ref())
    }

    pub fn var(&self, name: impl AsRef<str>) -> Result<String, ConfigError> {
        env::var(self.name_of(name.as_ref()))
            .context(BadVariable { name: self.name_of(name.as_ref()) })
    }

    /// Like [`var`](Self::var) but treats a missing or empty variable as absent.
    pub fn var_opt(&self, name: impl AsRef<str>) -> Option<String> {
        self.var(name).ok().filter(|s| !s.trim().is_empty())
    }

    pub fn var_or(&self, name: impl AsRef<str>, default: impl Into<String>) -> String {
        self.var_opt(name).unwrap_or_else(|| default.into())
    }

    /// Parses a human duration such as `60s` or `1m 30s`. Missing or malformed
    /// values fall back to `default`; malformed ones are logged.
    pub fn duration_or(&self, name: impl AsRef<str>, default: Duration) -> Duration {
        let full_name = self.name_of(name.as_ref());
        let raw = match self.var_opt(name) {
            None => return default,
            Some(x) => x,
        };

        match parse_duration::parse(&raw) {
            Err(err) => {
                warn!("Failed to parse '{}'. Using default value instead of '{:#?}'. Cause: {}",
                      full_name, default, err);
                default
            }
            Ok(dur) => dur,
        }
    }

    pub fn port_or(&self, name: impl AsRef<str>, default: u16) -> Result<u16, ConfigError> {
        let full_name = self.name_of(name.as_ref());
        match self.var_opt(name) {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: full_name,
                    input: raw.clone(),
                    reason: e.to_string(),
                }),
        }
    }
}
