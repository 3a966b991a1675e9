//! # Verbs
//!
//! The verb vocabulary used by Kubernetes RBAC rules.
//! Verbs are the actions a rule permits on a resource type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The token a rule uses to grant every verb.
pub const WILDCARD: &str = "*";

/// Standard verbs understood by the Kubernetes API server.
///
/// A verb set covering all of these is rendered as [`WILDCARD`].
/// Custom verbs (`bind`, `escalate`, `impersonate`, ...) are carried as
/// plain strings and are not part of this vocabulary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    /// Read a single object.
    Get,
    /// Read a collection of objects.
    List,
    /// Stream changes to objects.
    Watch,
    /// Create new objects.
    Create,
    /// Delete a single object.
    Delete,
    /// Delete a collection of objects.
    DeleteCollection,
    /// Partially modify an object.
    Patch,
    /// Replace an object.
    Update,
}

impl Verb {
    /// Get the string representation of the verb.
    ///
    /// # Returns
    ///
    /// The verb as it appears in a rule's `verbs` list.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::List => "list",
            Verb::Watch => "watch",
            Verb::Create => "create",
            Verb::Delete => "delete",
            Verb::DeleteCollection => "deletecollection",
            Verb::Patch => "patch",
            Verb::Update => "update",
        }
    }

    /// Parse a verb from its string representation.
    ///
    /// Matching is exact: the API server treats verbs as case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// use rbac_model::verbs::Verb;
    ///
    /// assert_eq!(Verb::parse("deletecollection"), Some(Verb::DeleteCollection));
    /// assert_eq!(Verb::parse("escalate"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        Verb::all().into_iter().find(|verb| verb.as_str() == s)
    }

    /// Get all standard verbs.
    pub fn all() -> [Verb; 8] {
        [
            Verb::Get,
            Verb::List,
            Verb::Watch,
            Verb::Create,
            Verb::Delete,
            Verb::DeleteCollection,
            Verb::Patch,
            Verb::Update,
        ]
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An accumulating, ordered set of verb tokens.
///
/// `VerbSet` keeps verbs sorted lexicographically so that rendering is
/// deterministic, and knows when it covers the full standard vocabulary.
///
/// # Example
///
/// ```
/// use rbac_model::verbs::VerbSet;
///
/// let mut verbs = VerbSet::new();
/// verbs.extend(["list", "get", "get"]);
/// assert_eq!(verbs.to_rule_verbs(), vec!["get", "list"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerbSet {
    verbs: BTreeSet<String>,
}

impl VerbSet {
    /// Create an empty verb set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single verb.
    pub fn insert(&mut self, verb: impl Into<String>) {
        self.verbs.insert(verb.into());
    }

    /// Add every verb from an iterator.
    pub fn extend<I, S>(&mut self, verbs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for verb in verbs {
            self.insert(verb);
        }
    }

    /// Check if the set grants everything.
    ///
    /// True when the set holds the literal [`WILDCARD`] or every standard
    /// verb. Extra custom verbs do not prevent the collapse.
    pub fn covers_all(&self) -> bool {
        self.verbs.contains(WILDCARD)
            || Verb::all()
                .iter()
                .all(|verb| self.verbs.contains(verb.as_str()))
    }

    /// Render the set as a rule's verb list.
    ///
    /// # Returns
    ///
    /// `["*"]` when the set covers all verbs, otherwise the verbs in
    /// lexicographic order.
    pub fn to_rule_verbs(&self) -> Vec<String> {
        if self.covers_all() {
            vec![WILDCARD.to_string()]
        } else {
            self.verbs.iter().cloned().collect()
        }
    }

    /// Number of distinct verbs.
    pub fn len(&self) -> usize {
        self.verbs.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for VerbSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = VerbSet::new();
        set.extend(iter);
        set
    }
}
