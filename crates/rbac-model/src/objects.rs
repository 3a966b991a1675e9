//! # RBAC Objects
//!
//! Roles, bindings and subjects as exported by `kubectl get -o json`.
//! Field names follow the Kubernetes wire format; metadata the core never
//! inspects (timestamps, UIDs, resource versions) is still carried so that
//! records survive a round trip through the tool unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::rules::{consolidate, sort_by_api_group, PermissionRule};

/// Label KubeSphere puts on workspace-scoped objects.
pub const WORKSPACE_LABEL: &str = "kubesphere.io/workspace";

/// Subject kind for human users.
pub const SUBJECT_USER: &str = "User";
/// Subject kind for in-cluster service accounts.
pub const SUBJECT_SERVICE_ACCOUNT: &str = "ServiceAccount";
/// Subject kind for groups.
pub const SUBJECT_GROUP: &str = "Group";

/// Kubernetes emits `null` for some empty collections; treat it as empty.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Object metadata shared by roles and bindings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Object name.
    pub name: String,

    /// Namespace, absent for cluster-scoped objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Labels.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Annotations.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// When the object was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,

    /// Opaque resource version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,

    /// Object UID, kept as written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// Owning objects (KubeSphere sets these on its bindings).
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,
}

impl ObjectMeta {
    /// Create metadata carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The KubeSphere workspace this object belongs to, if labelled.
    pub fn workspace(&self) -> Option<&str> {
        self.labels.get(WORKSPACE_LABEL).map(String::as_str)
    }

    /// The scope shown next to the object in tables.
    ///
    /// The workspace label wins over the namespace because KubeSphere
    /// workspace objects do not record their workspace as a namespace.
    pub fn scope_label(&self) -> &str {
        self.workspace()
            .or(self.namespace.as_deref())
            .unwrap_or("")
    }
}

/// A reference to an owning object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    /// API version of the owner.
    #[serde(default)]
    pub api_version: String,
    /// Kind of the owner.
    #[serde(default)]
    pub kind: String,
    /// Name of the owner.
    #[serde(default)]
    pub name: String,
    /// UID of the owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Whether the owner is the managing controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<bool>,
    /// Whether the owner blocks deletion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_owner_deletion: Option<bool>,
}

/// Kinds of role a binding can reference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoleKind {
    /// Namespace-scoped Kubernetes role.
    Role,
    /// Cluster-scoped Kubernetes role.
    ClusterRole,
    /// KubeSphere workspace role.
    WorkspaceRole,
    /// KubeSphere global role.
    GlobalRole,
}

impl RoleKind {
    /// Get the kind as written in `roleRef.kind`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Role => "Role",
            RoleKind::ClusterRole => "ClusterRole",
            RoleKind::WorkspaceRole => "WorkspaceRole",
            RoleKind::GlobalRole => "GlobalRole",
        }
    }

    /// Parse a `roleRef.kind` value. Matching is exact.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Role" => Some(RoleKind::Role),
            "ClusterRole" => Some(RoleKind::ClusterRole),
            "WorkspaceRole" => Some(RoleKind::WorkspaceRole),
            "GlobalRole" => Some(RoleKind::GlobalRole),
            _ => None,
        }
    }
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named bundle of permission rules.
///
/// Both namespace-scoped and cluster-scoped variants share this type; they
/// differ only in whether `metadata.namespace` is set.
///
/// # Example
///
/// ```
/// use rbac_model::{PermissionRule, Role, RoleKind};
///
/// let role = Role::new(RoleKind::Role, "pod-reader")
///     .with_namespace("dev")
///     .with_rule(PermissionRule::new([""], ["pods"], ["get", "list"]));
/// assert_eq!(role.namespace(), Some("dev"));
/// assert_eq!(role.rules.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// API version of the record.
    #[serde(default)]
    pub api_version: String,
    /// Record kind (`Role`, `ClusterRole`, ...).
    #[serde(default)]
    pub kind: String,
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Permission rules. Aggregated cluster roles may have none.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<PermissionRule>,
}

impl Role {
    /// Create an empty role of the given kind.
    pub fn new(kind: RoleKind, name: impl Into<String>) -> Self {
        Self {
            api_version: "rbac.authorization.k8s.io/v1".to_string(),
            kind: kind.as_str().to_string(),
            metadata: ObjectMeta::named(name),
            rules: Vec::new(),
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.metadata.namespace = Some(namespace.into());
        self
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: PermissionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Role name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Namespace, if namespace-scoped.
    pub fn namespace(&self) -> Option<&str> {
        self.metadata.namespace.as_deref()
    }

    /// Replace the rules with their consolidated, api-group ordered form.
    pub fn consolidate_rules(&mut self) {
        let mut rules = consolidate(&self.rules);
        sort_by_api_group(&mut rules);
        self.rules = rules;
    }
}

/// The role a binding grants.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
    /// API group of the referenced role.
    #[serde(default)]
    pub api_group: String,
    /// Kind of the referenced role (`Role` or `ClusterRole`, or a KubeSphere kind).
    pub kind: String,
    /// Name of the referenced role.
    pub name: String,
}

impl RoleRef {
    /// Create a reference to a role.
    pub fn new(kind: RoleKind, name: impl Into<String>) -> Self {
        Self {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: kind.as_str().to_string(),
            name: name.into(),
        }
    }
}

/// An identity named by a binding.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// API group of the subject kind.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_group: String,
    /// `User`, `ServiceAccount` or `Group`.
    pub kind: String,
    /// Subject name.
    pub name: String,
    /// Namespace of a service account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Subject {
    /// A user subject.
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: SUBJECT_USER.to_string(),
            name: name.into(),
            namespace: None,
        }
    }

    /// A service account subject.
    pub fn service_account(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_group: String::new(),
            kind: SUBJECT_SERVICE_ACCOUNT.to_string(),
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }

    /// A group subject.
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: SUBJECT_GROUP.to_string(),
            name: name.into(),
            namespace: None,
        }
    }

    /// Check if the subject is a user.
    pub fn is_user(&self) -> bool {
        self.kind == SUBJECT_USER
    }

    /// Check if the subject is a service account.
    pub fn is_service_account(&self) -> bool {
        self.kind == SUBJECT_SERVICE_ACCOUNT
    }
}

/// A grant attaching a role to a list of subjects.
///
/// # Example
///
/// ```
/// use rbac_model::{Binding, RoleKind, RoleRef, Subject};
///
/// let binding = Binding::new("RoleBinding", "read-pods", RoleRef::new(RoleKind::Role, "pod-reader"))
///     .with_namespace("dev")
///     .with_subject(Subject::user("alice"));
/// assert_eq!(binding.subjects.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// API version of the record.
    #[serde(default)]
    pub api_version: String,
    /// Record kind (`RoleBinding`, `ClusterRoleBinding`, ...).
    #[serde(default)]
    pub kind: String,
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// The granted role.
    pub role_ref: RoleRef,
    /// Subjects, in declaration order. May repeat.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subjects: Vec<Subject>,
}

impl Binding {
    /// Create a binding with no subjects.
    pub fn new(kind: impl Into<String>, name: impl Into<String>, role_ref: RoleRef) -> Self {
        Self {
            api_version: "rbac.authorization.k8s.io/v1".to_string(),
            kind: kind.into(),
            metadata: ObjectMeta::named(name),
            role_ref,
            subjects: Vec::new(),
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.metadata.namespace = Some(namespace.into());
        self
    }

    /// Append a subject.
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }

    /// Binding name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Namespace, if namespace-scoped.
    pub fn namespace(&self) -> Option<&str> {
        self.metadata.namespace.as_deref()
    }
}
