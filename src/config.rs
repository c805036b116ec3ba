use std::time::Duration;

use tracing::level_filters::LevelFilter;

use crate::errors::ConfigError;

/// Longest accepted expiration: one year.
pub const MAX_MESSAGE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Which store implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP port to listen on.
    pub port: u16,

    pub redis_hostname: String,
    pub redis_port: u16,

    pub store_backend: StoreBackend,

    /// Log level for tracing (e.g. "info", "debug").
    pub log_level: String,

    /// Expiration applied to every saved key, reset on each save.
    pub message_ttl: Duration,

    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub idle_timeout: Duration,

    /// How long in-flight requests may run once shutdown is requested.
    pub shutdown_grace: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            redis_hostname: "localhost".to_string(),
            redis_port: 6379,
            store_backend: StoreBackend::Redis,
            log_level: "info".to_string(),
            message_ttl: Duration::from_secs(60),
            read_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(20),
            idle_timeout: Duration::from_secs(60),
            shutdown_grace: Duration::from_secs(1),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from a variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let mut cfg = AppConfig::default();

        if let Some(v) = get("PORT") {
            cfg.port = parse_positive("PORT", &v)?;
        }
        if let Some(v) = get("REDIS_HOSTNAME") {
            cfg.redis_hostname = v;
        }
        if let Some(v) = get("REDIS_PORT") {
            cfg.redis_port = parse_positive("REDIS_PORT", &v)?;
        }
        if let Some(v) = get("STORE_BACKEND") {
            cfg.store_backend = match v.to_lowercase().as_str() {
                "redis" => StoreBackend::Redis,
                "memory" => StoreBackend::Memory,
                _ => return Err(ConfigError::UnknownBackend(v)),
            };
        }
        if let Some(v) = get("LOG_LEVEL") {
            cfg.log_level = v;
        }
        if let Some(v) = get("MESSAGE_TTL_SECONDS") {
            let secs: u64 = parse_positive("MESSAGE_TTL_SECONDS", &v)?;
            if secs > MAX_MESSAGE_TTL_SECS {
                return Err(ConfigError::TtlTooLarge {
                    name: "MESSAGE_TTL_SECONDS",
                    value: secs,
                    max: MAX_MESSAGE_TTL_SECS,
                });
            }
            cfg.message_ttl = Duration::from_secs(secs);
        }

        Ok(cfg)
    }

    /// `host:port` of the Redis server.
    pub fn redis_addr(&self) -> String {
        format!("{}:{}", self.redis_hostname, self.redis_port)
    }

    pub fn level_filter(&self) -> LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "trace" => LevelFilter::TRACE,
            "debug" => LevelFilter::DEBUG,
            "info" => LevelFilter::INFO,
            "warn" => LevelFilter::WARN,
            "error" => LevelFilter::ERROR,
            _ => LevelFilter::INFO,
        }
    }
}

fn parse_positive<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    match value.trim().parse::<T>() {
        Ok(n) if n != T::default() => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.redis_addr(), "localhost:6379");
        assert_eq!(cfg.store_backend, StoreBackend::Redis);
        assert_eq!(cfg.message_ttl, Duration::from_secs(60));
        assert_eq!(cfg.shutdown_grace, Duration::from_secs(1));
    }

    #[test]
    fn reads_overrides_and_ignores_empty_values() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("PORT", "8081"),
            ("REDIS_HOSTNAME", "cache"),
            ("REDIS_PORT", ""),
            ("STORE_BACKEND", "Memory"),
            ("MESSAGE_TTL_SECONDS", "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.redis_addr(), "cache:6379");
        assert_eq!(cfg.store_backend, StoreBackend::Memory);
        assert_eq!(cfg.message_ttl, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = AppConfig::from_lookup(lookup(&[("REDIS_PORT", "abc")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                name: "REDIS_PORT",
                value: "abc".to_string()
            }
        );
        assert!(AppConfig::from_lookup(lookup(&[("MESSAGE_TTL_SECONDS", "0")])).is_err());
    }

    #[test]
    fn rejects_ttl_above_one_year() {
        let max = MAX_MESSAGE_TTL_SECS.to_string();
        let cfg = AppConfig::from_lookup(lookup(&[("MESSAGE_TTL_SECONDS", max.as_str())])).unwrap();
        assert_eq!(cfg.message_ttl, Duration::from_secs(MAX_MESSAGE_TTL_SECS));

        let huge = u64::MAX.to_string();
        let err = AppConfig::from_lookup(lookup(&[("MESSAGE_TTL_SECONDS", huge.as_str())])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::TtlTooLarge {
                name: "MESSAGE_TTL_SECONDS",
                value: u64::MAX,
                max: MAX_MESSAGE_TTL_SECS,
            }
        );
    }

    #[test]
    fn rejects_unknown_backend() {
        let err = AppConfig::from_lookup(lookup(&[("STORE_BACKEND", "etcd")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownBackend("etcd".to_string()));
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let cfg = AppConfig::from_lookup(lookup(&[("LOG_LEVEL", "loud")])).unwrap();
        assert_eq!(cfg.level_filter(), LevelFilter::INFO);
    }
}
