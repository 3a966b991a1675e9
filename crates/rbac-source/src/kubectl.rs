//! Live cluster access through the kubectl binary.

use std::process::Command;
use tracing::{debug, instrument, warn};

use crate::config::SourceConfig;
use crate::error::{SourceError, SourceResult};
use crate::kinds::ResourceKind;
use crate::source::RecordSource;

/// Reads RBAC records by running `kubectl get <kind> -o json`.
///
/// Namespaced kinds are fetched across all namespaces. Context,
/// kubeconfig and request timeout from the configuration are passed on
/// every invocation.
#[derive(Debug, Clone)]
pub struct KubectlSource {
    config: SourceConfig,
}

impl KubectlSource {
    /// Create a source from configuration.
    pub fn new(config: SourceConfig) -> SourceResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Flags that select the cluster, shared by every command.
    fn connection_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(context) = &self.config.context {
            args.push(format!("--context={context}"));
        }
        if let Some(kubeconfig) = &self.config.kubeconfig {
            args.push(format!("--kubeconfig={}", kubeconfig.display()));
        }
        if let Some(timeout) = self.config.request_timeout() {
            args.push(format!("--request-timeout={}s", timeout.as_secs()));
        }
        args
    }

    /// Arguments for listing a kind.
    pub fn get_args(&self, kind: ResourceKind) -> Vec<String> {
        let mut args = vec!["get".to_string(), kind.as_str().to_string()];
        if kind.is_namespaced() {
            args.push("-A".to_string());
        }
        args.extend(["-o".to_string(), "json".to_string()]);
        args.extend(self.connection_args());
        args
    }

    /// Arguments for a discovery command such as `api-resources`.
    pub(crate) fn discovery_args(&self, extra: &[&str]) -> Vec<String> {
        let mut args: Vec<String> = extra.iter().map(|a| a.to_string()).collect();
        args.extend(self.connection_args());
        args
    }

    /// Run kubectl and return its standard output.
    #[instrument(skip(self), fields(kubectl = %self.config.kubectl))]
    pub(crate) fn run(&self, args: &[String]) -> SourceResult<Vec<u8>> {
        let command = format!("{} {}", self.config.kubectl, args.join(" "));
        debug!(command = %command, "Running kubectl");

        let output = Command::new(&self.config.kubectl)
            .args(args)
            .output()
            .map_err(|source| SourceError::Spawn {
                program: self.config.kubectl.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(command = %command, status = ?output.status.code(), "kubectl failed");
            return Err(SourceError::CommandFailed {
                command,
                status: output.status.code(),
                stderr,
            });
        }

        debug!(bytes = output.stdout.len(), "kubectl succeeded");
        Ok(output.stdout)
    }
}

impl RecordSource for KubectlSource {
    fn fetch_raw(&self, kind: ResourceKind) -> SourceResult<Vec<u8>> {
        self.run(&self.get_args(kind))
    }
}
