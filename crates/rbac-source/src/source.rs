//! The seam between the tool and wherever RBAC records come from.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{SourceError, SourceResult};
use crate::kinds::ResourceKind;

/// A supplier of raw RBAC record lists.
///
/// Implementations return the bytes of a Kubernetes `List` document
/// (`{"items": [...]}`) for the requested kind. Decoding is shared.
pub trait RecordSource {
    /// Fetch the list document for a kind.
    fn fetch_raw(&self, kind: ResourceKind) -> SourceResult<Vec<u8>>;

    /// Fetch and decode every record of a kind.
    fn fetch<T>(&self, kind: ResourceKind) -> SourceResult<Vec<T>>
    where
        T: DeserializeOwned,
        Self: Sized,
    {
        let raw = self.fetch_raw(kind)?;
        parse_list(kind, &raw)
    }
}

#[derive(Deserialize)]
struct ListDocument<T> {
    items: Option<Vec<Option<T>>>,
}

/// Decode a `List` document into its items.
///
/// A document whose `items` is `null` or absent yields no records.
pub fn parse_list<T: DeserializeOwned>(kind: ResourceKind, raw: &[u8]) -> SourceResult<Vec<T>> {
    let document: ListDocument<T> =
        serde_json::from_slice(raw).map_err(|source| SourceError::Parse { kind, source })?;
    let items: Vec<T> = document.items.unwrap_or_default().into_iter().flatten().collect();
    tracing::debug!(kind = %kind, count = items.len(), "Decoded record list");
    Ok(items)
}
