//! Data source configuration.
//!
//! Configuration is loaded from environment variables with defaults that
//! work against the current kubectl context.

use rbac_model::SystemFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// How the tool reaches the cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    /// kubectl binary to run.
    pub kubectl: String,

    /// kubeconfig context to use instead of the current one.
    pub context: Option<String>,

    /// kubeconfig file to use instead of the default.
    pub kubeconfig: Option<PathBuf>,

    /// Per-request timeout passed to kubectl, in seconds.
    pub request_timeout_secs: Option<u64>,

    /// Name prefixes hidden by `--nosys`. `None` uses the built-in list.
    pub system_prefixes: Option<Vec<String>>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kubectl: "kubectl".to_string(),
            context: None,
            kubeconfig: None,
            request_timeout_secs: None,
            system_prefixes: None,
        }
    }
}

impl SourceConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RBAC_TOOL_KUBECTL`: kubectl binary (default: kubectl)
    /// - `RBAC_TOOL_CONTEXT`: kubeconfig context
    /// - `KUBECONFIG`: kubeconfig file
    /// - `RBAC_TOOL_REQUEST_TIMEOUT`: request timeout in seconds
    /// - `RBAC_TOOL_SYSTEM_PREFIXES`: comma-separated system name prefixes
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let request_timeout_secs = match non_empty("RBAC_TOOL_REQUEST_TIMEOUT") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                key: "RBAC_TOOL_REQUEST_TIMEOUT".to_string(),
                message: e.to_string(),
            })?),
            None => None,
        };

        let config = Self {
            kubectl: non_empty("RBAC_TOOL_KUBECTL").unwrap_or(default.kubectl),
            context: non_empty("RBAC_TOOL_CONTEXT"),
            kubeconfig: non_empty("KUBECONFIG").map(PathBuf::from),
            request_timeout_secs,
            system_prefixes: non_empty("RBAC_TOOL_SYSTEM_PREFIXES")
                .map(|raw| raw.split(',').map(|p| p.trim().to_string()).collect()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kubectl.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "RBAC_TOOL_KUBECTL".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "RBAC_TOOL_REQUEST_TIMEOUT".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// The request timeout as a Duration.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// The filter used to hide platform-managed objects.
    pub fn system_filter(&self) -> SystemFilter {
        match &self.system_prefixes {
            Some(prefixes) => SystemFilter::from_prefixes(prefixes.iter().cloned()),
            None => SystemFilter::default(),
        }
    }
}
