//! Configuration types.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use axum::http::HeaderValue;

use crate::error::ConfigError;

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind: IpAddr,
    pub port: u16,
    /// JSON catalog to load instead of the built-in one.
    pub catalog_path: Option<PathBuf>,
    /// Directory for daily-rotated log files (stderr only when unset).
    pub log_dir: Option<PathBuf>,
    /// Allowed CORS origins; empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            catalog_path: None,
            log_dir: None,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Build config from `FUNNEL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind = match lookup("FUNNEL_BIND") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "FUNNEL_BIND".to_string(),
                message: format!("'{raw}' is not an IP address"),
            })?,
            None => defaults.bind,
        };

        let port = match lookup("FUNNEL_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "FUNNEL_PORT".to_string(),
                message: format!("'{raw}' is not a port number"),
            })?,
            None => defaults.port,
        };

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let cors_origins: Vec<String> = lookup("FUNNEL_CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        // Reject bad entries; dropping them could leave an empty, allow-any list.
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| HeaderValue::from_str(o).is_err())
        {
            return Err(ConfigError::InvalidValue {
                key: "FUNNEL_CORS_ORIGINS".to_string(),
                message: format!("'{bad}' is not a valid origin header value"),
            });
        }

        Ok(Self {
            bind,
            port,
            catalog_path: non_empty("FUNNEL_CATALOG_PATH").map(PathBuf::from),
            log_dir: non_empty("FUNNEL_LOG_DIR").map(PathBuf::from),
            cors_origins,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn reads_all_keys() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("FUNNEL_BIND", "127.0.0.1"),
            ("FUNNEL_PORT", "9000"),
            ("FUNNEL_CATALOG_PATH", "/etc/funnel/catalog.json"),
            ("FUNNEL_LOG_DIR", ""),
            ("FUNNEL_CORS_ORIGINS", "http://a.test, ,http://b.test"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/etc/funnel/catalog.json"))
        );
        assert_eq!(config.log_dir, None);
        assert_eq!(config.cors_origins, ["http://a.test", "http://b.test"]);
    }

    #[test]
    fn rejects_bad_port() {
        let err = ServerConfig::from_lookup(lookup(&[("FUNNEL_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("FUNNEL_PORT"));
    }

    #[test]
    fn rejects_invalid_cors_origin() {
        let err = ServerConfig::from_lookup(lookup(&[(
            "FUNNEL_CORS_ORIGINS",
            "http://a.test,http://bad\norigin",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("FUNNEL_CORS_ORIGINS"));
    }

    #[test]
    fn rejects_bad_bind() {
        assert!(ServerConfig::from_lookup(lookup(&[("FUNNEL_BIND", "localhost")])).is_err());
    }
}
