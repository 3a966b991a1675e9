//! # Permission Rules
//!
//! A permission rule is one grant clause of a role: a set of verbs allowed on
//! the cartesian product of its api groups and resources.
//!
//! Raw rules are frequently redundant. [`consolidate`] folds them into one
//! rule per `(api group, resource)` pair, each with exactly one group, one
//! resource and either the sorted verb list or `["*"]`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::objects::null_as_default;
use crate::verbs::VerbSet;

/// Label used for the built-in core API group.
///
/// Kubernetes writes the core group as the empty string; the tool never
/// shows or compares that empty string directly.
pub const CORE_API_GROUP: &str = "CORE";

/// Map the empty api group to [`CORE_API_GROUP`].
///
/// # Example
///
/// ```
/// use rbac_model::rules::normalize_api_group;
///
/// assert_eq!(normalize_api_group(""), "CORE");
/// assert_eq!(normalize_api_group("CORE"), "CORE");
/// assert_eq!(normalize_api_group("apps"), "apps");
/// ```
pub fn normalize_api_group(group: &str) -> &str {
    if group.is_empty() {
        CORE_API_GROUP
    } else {
        group
    }
}

fn is_core_group(group: &str) -> bool {
    group.is_empty() || group == CORE_API_GROUP
}

/// One grant clause of a role.
///
/// # Example
///
/// ```
/// use rbac_model::PermissionRule;
///
/// let rule = PermissionRule::new([""], ["pods", "services"], ["get"])
///     .with_resource_names(["frontend"]);
/// assert_eq!(rule.normalized_api_groups(), vec!["CORE"]);
/// assert_eq!(rule.resource_names, vec!["frontend"]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRule {
    /// API groups. Empty (or `[""]`) means the core group.
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_groups: Vec<String>,

    /// Resource types.
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: Vec<String>,

    /// Optional names restricting the rule to specific objects.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub resource_names: Vec<String>,

    /// Allowed verbs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub verbs: Vec<String>,

    /// Non-resource URLs (only meaningful on cluster roles).
    #[serde(
        rename = "nonResourceURLs",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub non_resource_urls: Vec<String>,
}

impl PermissionRule {
    /// Create a rule from groups, resources and verbs.
    pub fn new<G, R, V>(api_groups: G, resources: R, verbs: V) -> Self
    where
        G: IntoIterator,
        G::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        Self {
            api_groups: api_groups.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
            resource_names: Vec::new(),
            verbs: verbs.into_iter().map(Into::into).collect(),
            non_resource_urls: Vec::new(),
        }
    }

    /// Restrict the rule to named objects.
    pub fn with_resource_names<N>(mut self, names: N) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
    {
        self.resource_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// The first api group, as written.
    pub fn first_api_group(&self) -> Option<&str> {
        self.api_groups.first().map(String::as_str)
    }

    /// The api groups with the core group spelled as [`CORE_API_GROUP`].
    ///
    /// A rule with no api groups at all is treated as a core-group rule.
    pub fn normalized_api_groups(&self) -> Vec<String> {
        if self.api_groups.is_empty() {
            return vec![CORE_API_GROUP.to_string()];
        }
        self.api_groups
            .iter()
            .map(|group| normalize_api_group(group).to_string())
            .collect()
    }

    /// Check if the rule's verbs grant everything.
    pub fn is_wildcard(&self) -> bool {
        self.verbs.iter().collect::<VerbSet>().covers_all()
    }
}

/// Grouping key of a consolidated rule.
///
/// Ordered core group first, then by api group and resource. Equality
/// follows the ordering, so an empty group and `CORE` name the same key.
#[derive(Debug, Clone)]
struct GrantKey {
    api_group: String,
    resource: String,
}

impl Ord for GrantKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_api_groups(Some(&self.api_group), Some(&other.api_group))
            .then_with(|| self.resource.cmp(&other.resource))
    }
}

impl PartialEq for GrantKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GrantKey {}

impl PartialOrd for GrantKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Order two api groups: missing or core first, then lexicographic.
fn compare_api_groups(a: Option<&str>, b: Option<&str>) -> Ordering {
    fn rank(group: Option<&str>) -> (bool, &str) {
        match group {
            None => (false, ""),
            Some(g) if is_core_group(g) => (false, ""),
            Some(g) => (true, g),
        }
    }
    rank(a).cmp(&rank(b))
}

/// Fold a role's rules into their canonical form.
///
/// Every `(api group, resource)` pair drawn from each rule's cartesian
/// product accumulates that rule's verbs. When a rule names resources, the
/// resource is qualified as `resource.firstName`; further names are dropped
/// from the key. Pairs whose verbs cover the standard vocabulary collapse
/// to `["*"]`.
///
/// Output holds one rule per observed pair, ordered core group first, then
/// by api group and resource. Rules without resources (non-resource URL
/// rules) or without verbs contribute nothing.
///
/// # Example
///
/// ```
/// use rbac_model::{consolidate, PermissionRule};
///
/// let rules = vec![
///     PermissionRule::new([""], ["pods"], ["get"]),
///     PermissionRule::new([""], ["pods"], ["list"]),
/// ];
/// let merged = consolidate(&rules);
/// assert_eq!(merged.len(), 1);
/// assert_eq!(merged[0].api_groups, vec!["CORE"]);
/// assert_eq!(merged[0].verbs, vec!["get", "list"]);
/// ```
pub fn consolidate(rules: &[PermissionRule]) -> Vec<PermissionRule> {
    let mut grouped: BTreeMap<GrantKey, VerbSet> = BTreeMap::new();

    for rule in rules {
        if rule.verbs.is_empty() {
            continue;
        }

        // TODO: emit one key per resource name instead of keeping the first.
        let qualifier = rule.resource_names.first();

        for api_group in rule.normalized_api_groups() {
            for resource in &rule.resources {
                let resource = match qualifier {
                    Some(name) => format!("{}.{}", resource, name),
                    None => resource.clone(),
                };
                grouped
                    .entry(GrantKey {
                        api_group: api_group.clone(),
                        resource,
                    })
                    .or_default()
                    .extend(rule.verbs.iter().cloned());
            }
        }
    }

    grouped
        .into_iter()
        .map(|(key, verbs)| PermissionRule {
            api_groups: vec![key.api_group],
            resources: vec![key.resource],
            resource_names: Vec::new(),
            verbs: verbs.to_rule_verbs(),
            non_resource_urls: Vec::new(),
        })
        .collect()
}

/// Stable sort by first api group.
///
/// A rule with no api group (or the core group) sorts before any rule with
/// a named group. Rules with equal keys keep their relative order.
pub fn sort_by_api_group(rules: &mut [PermissionRule]) {
    rules.sort_by(|a, b| compare_api_groups(a.first_api_group(), b.first_api_group()));
}
