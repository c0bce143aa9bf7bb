//! Desk configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::DeskError;

/// Configuration for a registration desk server.
///
/// Can be loaded from a TOML file via [`DeskConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// HTTP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the audit journal. When unset the audit log lives in memory
    /// only and is lost on restart.
    #[serde(default)]
    pub audit_journal: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to serve Prometheus metrics at `/metrics`.
    #[serde(default)]
    pub enable_metrics: bool,

    /// Whether to answer CORS preflights from any origin (admin dashboard
    /// served from a different host).
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Recorded as `performedBy` when a request does not name an actor.
    #[serde(default = "default_performed_by")]
    pub default_performed_by: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7080
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_performed_by() -> String {
    "admin".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DeskConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, DeskError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DeskError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, DeskError> {
        toml::from_str(s).map_err(|e| DeskError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, DeskError> {
        toml::to_string_pretty(self).map_err(|e| DeskError::Config(e.to_string()))
    }

    /// `listen_addr:port`, ready for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.port)
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            audit_journal: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_metrics: false,
            enable_cors: default_true(),
            default_performed_by: default_performed_by(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = DeskConfig {
            audit_journal: Some(PathBuf::from("/var/lib/regdesk/audit.jsonl")),
            ..DeskConfig::default()
        };
        let toml_str = config.to_toml_string().expect("serializable");
        let parsed = DeskConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = DeskConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.port, 7080);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.default_performed_by, "admin");
        assert!(config.audit_journal.is_none());
        assert!(config.enable_cors);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            port = 9999
            audit_journal = "data/audit.jsonl"
            enable_metrics = true
        "#;
        let config = DeskConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.port, 9999);
        assert_eq!(config.audit_journal, Some(PathBuf::from("data/audit.jsonl")));
        assert!(config.enable_metrics);
        assert_eq!(config.bind_addr(), "0.0.0.0:9999");
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = DeskConfig::from_toml_file("/nonexistent/regdesk.toml");
        assert!(matches!(result, Err(DeskError::Config(_))));
    }
}
