//! API discovery: which kinds live in the core group, and which verbs the
//! cluster serves.

use std::collections::BTreeSet;

use crate::error::SourceResult;
use crate::kubectl::KubectlSource;

/// Answers discovery questions about the cluster's API surface.
pub trait Discovery {
    /// Kinds served by the core (empty-named) API group, in listing order.
    fn core_kinds(&self) -> SourceResult<Vec<String>>;

    /// Every verb served by any API resource, deduplicated and sorted.
    fn verbs(&self) -> SourceResult<BTreeSet<String>>;
}

/// Extract the KIND column from `kubectl api-resources --no-headers`.
///
/// SHORTNAMES may be blank, so the column count varies; KIND is always
/// the last column of the default output.
pub fn parse_core_kinds(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().last())
        .map(str::to_string)
        .collect()
}

/// Extract the verb list from `kubectl api-resources --no-headers -o wide`.
///
/// The verbs are the first bracketed group on each line. A later group,
/// when present, holds categories and is ignored.
pub fn parse_verbs(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .filter_map(|line| {
            let start = line.find('[')?;
            let rest = &line[start + 1..];
            let end = rest.find(']')?;
            Some(&rest[..end])
        })
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect()
}

impl Discovery for KubectlSource {
    fn core_kinds(&self) -> SourceResult<Vec<String>> {
        let args = self.discovery_args(&["api-resources", "--api-group=", "--no-headers"]);
        let output = self.run(&args)?;
        let kinds = parse_core_kinds(&String::from_utf8_lossy(&output));
        tracing::debug!(count = kinds.len(), "Discovered core kinds");
        Ok(kinds)
    }

    fn verbs(&self) -> SourceResult<BTreeSet<String>> {
        let args = self.discovery_args(&["api-resources", "--no-headers", "--sort-by", "name", "-o", "wide"]);
        let output = self.run(&args)?;
        let verbs = parse_verbs(&String::from_utf8_lossy(&output));
        tracing::debug!(count = verbs.len(), "Discovered verbs");
        Ok(verbs)
    }
}
