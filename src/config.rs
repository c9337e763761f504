//! Forwarder configuration module
//!
//! Loads the JSON configuration file colocated with the running executable.
//! The file is read exactly once at startup; any load failure is fatal.

use crate::error::ForwarderError;
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

/// Name of the configuration file, resolved next to the executable.
pub const CONFIG_FILENAME: &str = "config.json";

fn default_http_port() -> u16 {
    9090
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Forwarder configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ForwarderConfig {
    /// JetStream stream the log subject is bound to
    pub cluster_id: String,

    /// Connection name reported to the NATS server
    pub client_id: String,

    /// NATS server addresses
    pub servers: Vec<String>,

    /// Optional username/password authentication
    pub username: Option<String>,
    pub password: Option<String>,

    /// Optional mTLS client certificate, key, and root CA paths
    pub client_cert_path: Option<String>,
    pub client_key_path: Option<String>,
    pub root_ca_path: Option<String>,

    /// Subject that is both subscribed to and republished to
    pub log_subject: String,

    /// Ingestion API access token
    pub ingest_token: String,

    /// Ingestion endpoint override (hosted endpoint when absent)
    pub ingest_endpoint: Option<String>,

    /// Health/metrics HTTP port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ForwarderConfig {
    /// Load configuration from `config.json` next to the running executable.
    pub fn load() -> Result<Self, ForwarderError> {
        let exe = std::env::current_exe().map_err(|e| {
            ForwarderError::Config(format!("cannot resolve executable path: {e}"))
        })?;
        let dir = exe.parent().ok_or_else(|| {
            ForwarderError::Config("executable has no parent directory".to_string())
        })?;

        Self::from_path(&dir.join(CONFIG_FILENAME))
    }

    /// Load configuration from an explicit path.
    pub fn from_path(path: &Path) -> Result<Self, ForwarderError> {
        let settings = Config::builder()
            .add_source(File::from(path.to_path_buf()).format(FileFormat::Json))
            .build()
            .map_err(|e| {
                ForwarderError::Config(format!("failed to read {}: {e}", path.display()))
            })?;

        settings.try_deserialize().map_err(|e| {
            ForwarderError::Config(format!("invalid configuration in {}: {e}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_full_config_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "cluster_id": "logs",
                "client_id": "transporter-1",
                "servers": ["nats://10.0.0.1:4222", "nats://10.0.0.2:4222"],
                "username": "svc",
                "password": "hunter2",
                "client_cert_path": "/etc/certs/client.pem",
                "client_key_path": "/etc/certs/client.key",
                "root_ca_path": "/etc/certs/ca.pem",
                "log_subject": "logs.app",
                "ingest_token": "tok-123",
                "ingest_endpoint": "https://intake.example.com",
                "http_port": 8088,
                "log_level": "debug"
            }"#,
        );

        let config = ForwarderConfig::from_path(&path).unwrap();
        assert_eq!(config.cluster_id, "logs");
        assert_eq!(config.client_id, "transporter-1");
        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.username.as_deref(), Some("svc"));
        assert_eq!(config.log_subject, "logs.app");
        assert_eq!(config.ingest_token, "tok-123");
        assert_eq!(
            config.ingest_endpoint.as_deref(),
            Some("https://intake.example.com")
        );
        assert_eq!(config.http_port, 8088);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn optional_fields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "cluster_id": "logs",
                "client_id": "transporter-1",
                "servers": ["nats://localhost:4222"],
                "log_subject": "logs.app",
                "ingest_token": "tok-123"
            }"#,
        );

        let config = ForwarderConfig::from_path(&path).unwrap();
        assert!(config.username.is_none());
        assert!(config.password.is_none());
        assert!(config.client_cert_path.is_none());
        assert!(config.ingest_endpoint.is_none());
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ForwarderConfig::from_path(&dir.path().join(CONFIG_FILENAME)).unwrap_err();
        assert!(matches!(err, ForwarderError::Config(_)));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "{ not json");
        let err = ForwarderConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, ForwarderError::Config(_)));
    }

    #[test]
    fn missing_required_field_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "cluster_id": "logs",
                "client_id": "transporter-1",
                "servers": ["nats://localhost:4222"],
                "log_subject": "logs.app"
            }"#,
        );
        let err = ForwarderConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, ForwarderError::Config(_)));
    }
}
