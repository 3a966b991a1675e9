//! Error types for loading RBAC records
//!
//! Every variant here is fatal for the run: a snapshot that failed to load
//! part of the graph is never rendered.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::kinds::ResourceKind;

/// Data source error types.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The external command could not be started
    #[error("Failed to run {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The external command exited unsuccessfully
    #[error("Command `{command}` failed (exit status {}): {stderr}", .status.map_or_else(|| "unknown".to_string(), |c| c.to_string()))]
    CommandFailed {
        /// Command line that was run.
        command: String,
        /// Exit code, if the process exited normally.
        status: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// The records returned for a kind could not be parsed
    #[error("Malformed {kind} records: {source}")]
    Parse {
        /// Kind being parsed.
        kind: ResourceKind,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A snapshot file could not be read
    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The source cannot serve this request
    #[error("Unsupported by this source: {0}")]
    Unsupported(String),
}

/// Result type for data source operations.
pub type SourceResult<T> = Result<T, SourceError>;

impl SourceError {
    /// Check if the failure came from the external command rather than data.
    pub fn is_command_failure(&self) -> bool {
        matches!(self, SourceError::Spawn { .. } | SourceError::CommandFailed { .. })
    }

    /// Get a stable error code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            SourceError::Spawn { .. } => "SPAWN_FAILED",
            SourceError::CommandFailed { .. } => "COMMAND_FAILED",
            SourceError::Parse { .. } => "MALFORMED_RECORDS",
            SourceError::Io { .. } => "IO_ERROR",
            SourceError::Config(_) => "CONFIG_ERROR",
            SourceError::Unsupported(_) => "UNSUPPORTED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display() {
        let err = SourceError::CommandFailed {
            command: "kubectl get roles -A -o json".to_string(),
            status: Some(1),
            stderr: "error: You must be logged in to the server".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command `kubectl get roles -A -o json` failed (exit status 1): error: You must be logged in to the server"
        );
        assert!(err.is_command_failure());
        assert_eq!(err.error_code(), "COMMAND_FAILED");
    }

    #[test]
    fn test_command_killed_display() {
        let err = SourceError::CommandFailed {
            command: "kubectl get clusterroles -o json".to_string(),
            status: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("exit status unknown"));
    }

    #[test]
    fn test_parse_error_is_not_command_failure() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SourceError::Parse {
            kind: ResourceKind::ClusterRoles,
            source,
        };
        assert!(!err.is_command_failure());
        assert!(err.to_string().starts_with("Malformed clusterroles records"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: SourceError = ConfigError::InvalidValue {
            key: "RBAC_TOOL_REQUEST_TIMEOUT".to_string(),
            message: "must be greater than zero".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
