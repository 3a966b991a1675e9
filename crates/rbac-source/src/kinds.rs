//! Resource kinds that can be fetched from the cluster.

use serde::{Deserialize, Serialize};

/// A kind of RBAC record, as named on the `kubectl get` command line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Namespaced roles.
    Roles,
    /// Cluster roles.
    ClusterRoles,
    /// Namespaced role bindings.
    RoleBindings,
    /// Cluster role bindings.
    ClusterRoleBindings,
    /// KubeSphere workspace roles.
    WorkspaceRoles,
    /// KubeSphere global roles.
    GlobalRoles,
    /// KubeSphere workspace role bindings.
    WorkspaceRoleBindings,
    /// KubeSphere global role bindings.
    GlobalRoleBindings,
}

impl ResourceKind {
    /// The plural resource name passed to `kubectl get`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Roles => "roles",
            ResourceKind::ClusterRoles => "clusterroles",
            ResourceKind::RoleBindings => "rolebindings",
            ResourceKind::ClusterRoleBindings => "clusterrolebindings",
            ResourceKind::WorkspaceRoles => "workspaceroles",
            ResourceKind::GlobalRoles => "globalroles",
            ResourceKind::WorkspaceRoleBindings => "workspacerolebindings",
            ResourceKind::GlobalRoleBindings => "globalrolebindings",
        }
    }

    /// The `kind` field carried by records of this resource.
    pub fn record_kind(&self) -> &'static str {
        match self {
            ResourceKind::Roles => "Role",
            ResourceKind::ClusterRoles => "ClusterRole",
            ResourceKind::RoleBindings => "RoleBinding",
            ResourceKind::ClusterRoleBindings => "ClusterRoleBinding",
            ResourceKind::WorkspaceRoles => "WorkspaceRole",
            ResourceKind::GlobalRoles => "GlobalRole",
            ResourceKind::WorkspaceRoleBindings => "WorkspaceRoleBinding",
            ResourceKind::GlobalRoleBindings => "GlobalRoleBinding",
        }
    }

    /// Parse a resource name. Singular and plural forms are accepted.
    ///
    /// # Example
    ///
    /// ```
    /// use rbac_source::ResourceKind;
    ///
    /// assert_eq!(ResourceKind::parse("clusterrole"), Some(ResourceKind::ClusterRoles));
    /// assert_eq!(ResourceKind::parse("RoleBindings"), Some(ResourceKind::RoleBindings));
    /// assert_eq!(ResourceKind::parse("pods"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        let singular = lower.strip_suffix('s').unwrap_or(&lower);
        ResourceKind::all()
            .into_iter()
            .find(|kind| kind.as_str().strip_suffix('s') == Some(singular))
    }

    /// All kinds, Kubernetes first.
    pub fn all() -> [ResourceKind; 8] {
        [
            ResourceKind::Roles,
            ResourceKind::ClusterRoles,
            ResourceKind::RoleBindings,
            ResourceKind::ClusterRoleBindings,
            ResourceKind::WorkspaceRoles,
            ResourceKind::GlobalRoles,
            ResourceKind::WorkspaceRoleBindings,
            ResourceKind::GlobalRoleBindings,
        ]
    }

    /// Check if records live in namespaces and must be fetched with `-A`.
    pub fn is_namespaced(&self) -> bool {
        matches!(
            self,
            ResourceKind::Roles
                | ResourceKind::RoleBindings
                | ResourceKind::WorkspaceRoles
                | ResourceKind::WorkspaceRoleBindings
        )
    }

    /// Check if the kind is a KubeSphere extension.
    pub fn is_kubesphere(&self) -> bool {
        matches!(
            self,
            ResourceKind::WorkspaceRoles
                | ResourceKind::GlobalRoles
                | ResourceKind::WorkspaceRoleBindings
                | ResourceKind::GlobalRoleBindings
        )
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
