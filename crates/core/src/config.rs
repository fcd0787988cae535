// crates/core/src/config.rs
//! Application configuration.
//!
//! Built exactly once at process start (`AppConfig::from_env` in each
//! binary's `main`) and passed by reference into components. Nothing outside
//! this module reads the process environment.

use std::path::PathBuf;

use thiserror::Error;

/// Default HTTP port for the API server.
pub const DEFAULT_PORT: u16 = 8080;

/// Default cap on a submitted job payload, in bytes.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    Invalid { var: String, value: String },
}

/// Process-wide configuration, shared by the server and worker binaries.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port (`ATRIUM_PORT`).
    pub port: u16,
    /// SQLite database file (`ATRIUM_DB_PATH`).
    pub database_path: PathBuf,
    /// Base URL of the container runner API (`ATRIUM_RUNNER_URL`).
    pub runner_url: String,
    /// Bearer token for the runner API (`ATRIUM_RUNNER_TOKEN`), if any.
    pub runner_token: Option<String>,
    /// Base URL of the ML inference endpoint (`ATRIUM_ML_URL`).
    pub ml_endpoint_url: String,
    /// HS256 secret for admin tokens (`ATRIUM_AUTH_SECRET`). When unset,
    /// admin routes fail closed with an unauthorized envelope.
    pub auth_secret: Option<String>,
    /// Cap on submitted job payloads (`ATRIUM_MAX_PAYLOAD_BYTES`).
    pub max_payload_bytes: usize,
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// The single sanctioned call site is a binary's `main`; components
    /// receive the constructed object and never consult the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary lookup function. Tests pass closures instead
    /// of mutating global environment state.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match get("ATRIUM_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "ATRIUM_PORT".into(),
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let max_payload_bytes = match get("ATRIUM_MAX_PAYLOAD_BYTES") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "ATRIUM_MAX_PAYLOAD_BYTES".into(),
                value: raw,
            })?,
            None => DEFAULT_MAX_PAYLOAD_BYTES,
        };

        Ok(Self {
            port,
            database_path: get("ATRIUM_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("atrium.db")),
            runner_url: get("ATRIUM_RUNNER_URL")
                .unwrap_or_else(|| "http://localhost:9090".to_string()),
            runner_token: get("ATRIUM_RUNNER_TOKEN"),
            ml_endpoint_url: get("ATRIUM_ML_URL")
                .unwrap_or_else(|| "http://localhost:9191".to_string()),
            auth_secret: get("ATRIUM_AUTH_SECRET"),
            max_payload_bytes,
        })
    }
}
