//! Offline snapshots: one `kubectl get <kind> -o json` dump per file.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::discovery::Discovery;
use crate::error::{SourceError, SourceResult};
use crate::kinds::ResourceKind;
use crate::source::RecordSource;

/// Reads `<root>/<kind>.json` for each requested kind.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at a directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The file holding a kind.
    pub fn path_for(&self, kind: ResourceKind) -> PathBuf {
        self.root.join(format!("{}.json", kind.as_str()))
    }
}

impl RecordSource for DirectorySource {
    fn fetch_raw(&self, kind: ResourceKind) -> SourceResult<Vec<u8>> {
        let path = self.path_for(kind);
        tracing::debug!(path = %path.display(), "Reading snapshot file");
        std::fs::read(&path).map_err(|source| SourceError::Io { path, source })
    }
}

impl Discovery for DirectorySource {
    fn core_kinds(&self) -> SourceResult<Vec<String>> {
        Err(SourceError::Unsupported(
            "core kind discovery needs a live cluster".to_string(),
        ))
    }

    fn verbs(&self) -> SourceResult<BTreeSet<String>> {
        Err(SourceError::Unsupported(
            "verb discovery needs a live cluster".to_string(),
        ))
    }
}
