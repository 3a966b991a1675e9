//! # RBAC Source
//!
//! Loading of Kubernetes RBAC records for the rbac-tool.
//!
//! ## Overview
//!
//! Records come from one of two places:
//! - **kubectl**: `kubectl get <kind> -o json` against the configured context
//! - **Snapshot directories**: one `<kind>.json` list document per kind,
//!   as written by `kubectl get <kind> -o json > <kind>.json`
//!
//! Both implement [`RecordSource`]. [`ClusterSnapshot::load`] pulls every
//! kind through a source, failing on the first error, and consolidates
//! role rules so the rest of the tool only sees canonical rules.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rbac_source::{ClusterSnapshot, KubectlSource, SourceConfig};
//!
//! # fn main() -> Result<(), rbac_source::SourceError> {
//! let source = KubectlSource::new(SourceConfig::from_env()?)?;
//! let snapshot = ClusterSnapshot::load(&source, false)?;
//! println!("{} cluster roles", snapshot.cluster_roles.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod directory;
pub mod discovery;
pub mod error;
pub mod kinds;
pub mod kubectl;
pub mod snapshot;
pub mod source;

// Re-export main types for convenience
pub use config::{ConfigError, SourceConfig};
pub use directory::DirectorySource;
pub use discovery::{parse_core_kinds, parse_verbs, Discovery};
pub use error::{SourceError, SourceResult};
pub use kinds::ResourceKind;
pub use kubectl::KubectlSource;
pub use snapshot::ClusterSnapshot;
pub use source::{parse_list, RecordSource};
