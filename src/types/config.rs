//! Configuration structures.
//!
//! Defaults match what a plugin host expects; [`Config::from_env`] overlays
//! the environment variables the host sets when it launches a plugin.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Error, Result};

/// Environment variable with the lowest port the plugin may bind.
pub const ENV_MIN_PORT: &str = "PLUGIN_MIN_PORT";
/// Environment variable with the highest port the plugin may bind.
pub const ENV_MAX_PORT: &str = "PLUGIN_MAX_PORT";
/// Environment variable listing app protocol versions the host accepts.
pub const ENV_PROTOCOL_VERSIONS: &str = "PLUGIN_PROTOCOL_VERSIONS";
/// Environment variable overriding the bind host.
pub const ENV_BIND_HOST: &str = "SERVICE_SDK_BIND_HOST";
/// Environment variable selecting the log format (`json` or `compact`).
pub const ENV_LOG_FORMAT: &str = "SERVICE_SDK_LOG_FORMAT";

/// Global configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Plugin handshake configuration.
    #[serde(default)]
    pub handshake: HandshakeConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host the gRPC listener binds to.
    pub bind_host: String,

    /// Lowest port tried when binding.
    pub min_port: u16,

    /// Highest port tried when binding (inclusive).
    pub max_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".to_string(),
            min_port: 10000,
            max_port: 25000,
        }
    }
}

/// Handshake values shared with the host process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeConfig {
    /// Version of the handshake line format itself.
    pub core_protocol_version: u32,

    /// Version of the service protocol spoken over the channel.
    pub app_protocol_version: u32,

    /// Environment variable the host sets to mark a legitimate launch.
    pub magic_cookie_key: String,

    /// Expected value of `magic_cookie_key`.
    pub magic_cookie_value: String,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            core_protocol_version: 1,
            app_protocol_version: 1,
            magic_cookie_key: "PLUGIN_MAGIC_COOKIE".to_string(),
            magic_cookie_value: "7468697320697320616e20696d706f7274616e7420737472696e67"
                .to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error) used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Config {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::default().with_env(&env)
    }

    /// Overlay values from an explicit environment map.
    pub fn with_env(mut self, env: &HashMap<String, String>) -> Result<Self> {
        if let Some(port) = env.get(ENV_MIN_PORT) {
            self.server.min_port = parse_port(ENV_MIN_PORT, port)?;
        }
        if let Some(port) = env.get(ENV_MAX_PORT) {
            self.server.max_port = parse_port(ENV_MAX_PORT, port)?;
        }
        if let Some(host) = env.get(ENV_BIND_HOST) {
            self.server.bind_host = host.clone();
        }
        if let Some(format) = env.get(ENV_LOG_FORMAT) {
            self.observability.json_logs = format.eq_ignore_ascii_case("json");
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.min_port > self.server.max_port {
            return Err(Error::config(format!(
                "{} ({}) is greater than {} ({})",
                ENV_MIN_PORT, self.server.min_port, ENV_MAX_PORT, self.server.max_port
            )));
        }
        if self.handshake.magic_cookie_key.is_empty() {
            return Err(Error::config("magic cookie key cannot be empty"));
        }
        Ok(())
    }
}

fn parse_port(name: &str, value: &str) -> Result<u16> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|e| Error::config(format!("{} must be a port number, got {:?}: {}", name, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.bind_host, "127.0.0.1");
        assert_eq!(config.server.min_port, 10000);
        assert_eq!(config.server.max_port, 25000);
        assert_eq!(config.handshake.core_protocol_version, 1);
        assert_eq!(config.handshake.magic_cookie_key, "PLUGIN_MAGIC_COOKIE");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overlay() {
        let config = Config::default()
            .with_env(&env(&[
                (ENV_MIN_PORT, "30000"),
                (ENV_MAX_PORT, "30010"),
                (ENV_BIND_HOST, "0.0.0.0"),
                (ENV_LOG_FORMAT, "JSON"),
            ]))
            .unwrap();
        assert_eq!(config.server.min_port, 30000);
        assert_eq!(config.server.max_port, 30010);
        assert_eq!(config.server.bind_host, "0.0.0.0");
        assert!(config.observability.json_logs);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = Config::default()
            .with_env(&env(&[(ENV_MIN_PORT, "lots")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = Config::default()
            .with_env(&env(&[(ENV_MIN_PORT, "2000"), (ENV_MAX_PORT, "1000")]))
            .unwrap_err();
        assert!(err.to_string().contains("greater than"));
    }

    #[test]
    fn test_serde_partial_config() {
        let config: Config =
            serde_json::from_str(r#"{"observability": {"log_level": "debug", "json_logs": true}}"#)
                .unwrap();
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.server.min_port, 10000);
    }
}
