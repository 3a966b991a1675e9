//! A fully materialized view of the cluster's RBAC graph.

use rbac_model::{Binding, BindingUniverse, Role, RoleCatalog};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SourceResult;
use crate::kinds::ResourceKind;
use crate::source::RecordSource;

/// Every role and binding, loaded once before any processing.
///
/// Role rules are consolidated at load time. KubeSphere collections stay
/// empty unless they were requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSnapshot {
    /// Namespaced roles.
    pub roles: Vec<Role>,
    /// Cluster roles.
    pub cluster_roles: Vec<Role>,
    /// Namespaced role bindings.
    pub role_bindings: Vec<Binding>,
    /// Cluster role bindings.
    pub cluster_role_bindings: Vec<Binding>,
    /// KubeSphere workspace roles.
    pub workspace_roles: Vec<Role>,
    /// KubeSphere global roles.
    pub global_roles: Vec<Role>,
    /// KubeSphere workspace role bindings.
    pub workspace_role_bindings: Vec<Binding>,
    /// KubeSphere global role bindings.
    pub global_role_bindings: Vec<Binding>,
    /// Whether the KubeSphere collections were loaded.
    pub kubesphere: bool,
}

impl ClusterSnapshot {
    /// Load every kind from a source.
    ///
    /// The first failure aborts the load; no partial snapshot is returned.
    pub fn load<S: RecordSource>(source: &S, include_kubesphere: bool) -> SourceResult<Self> {
        let mut snapshot = Self {
            kubesphere: include_kubesphere,
            ..Self::default()
        };

        for kind in ResourceKind::all() {
            if kind.is_kubesphere() && !include_kubesphere {
                continue;
            }
            snapshot.load_kind(source, kind)?;
        }

        info!(
            roles = snapshot.roles.len(),
            cluster_roles = snapshot.cluster_roles.len(),
            role_bindings = snapshot.role_bindings.len(),
            cluster_role_bindings = snapshot.cluster_role_bindings.len(),
            kubesphere = include_kubesphere,
            "Loaded RBAC snapshot"
        );
        Ok(snapshot)
    }

    fn load_kind<S: RecordSource>(&mut self, source: &S, kind: ResourceKind) -> SourceResult<()> {
        match kind {
            ResourceKind::Roles => self.roles = load_roles(source, kind)?,
            ResourceKind::ClusterRoles => self.cluster_roles = load_roles(source, kind)?,
            ResourceKind::WorkspaceRoles => self.workspace_roles = load_roles(source, kind)?,
            ResourceKind::GlobalRoles => self.global_roles = load_roles(source, kind)?,
            ResourceKind::RoleBindings => self.role_bindings = load_bindings(source, kind)?,
            ResourceKind::ClusterRoleBindings => {
                self.cluster_role_bindings = load_bindings(source, kind)?
            }
            ResourceKind::WorkspaceRoleBindings => {
                self.workspace_role_bindings = load_bindings(source, kind)?
            }
            ResourceKind::GlobalRoleBindings => {
                self.global_role_bindings = load_bindings(source, kind)?
            }
        }
        Ok(())
    }

    /// The bindings the resolver walks.
    pub fn bindings(&self) -> BindingUniverse<'_> {
        BindingUniverse::new(&self.cluster_role_bindings, &self.role_bindings)
            .with_kubesphere(&self.workspace_role_bindings, &self.global_role_bindings)
    }

    /// The roles available for rule attachment.
    pub fn catalog(&self) -> RoleCatalog<'_> {
        RoleCatalog::new(&self.roles, &self.cluster_roles)
            .with_kubesphere(&self.workspace_roles, &self.global_roles)
    }
}

fn load_roles<S: RecordSource>(source: &S, kind: ResourceKind) -> SourceResult<Vec<Role>> {
    let mut roles: Vec<Role> = source.fetch(kind)?;
    for role in &mut roles {
        if role.kind.is_empty() {
            role.kind = kind.record_kind().to_string();
        }
        role.consolidate_rules();
    }
    debug!(kind = %kind, count = roles.len(), "Consolidated role rules");
    Ok(roles)
}

fn load_bindings<S: RecordSource>(source: &S, kind: ResourceKind) -> SourceResult<Vec<Binding>> {
    let mut bindings: Vec<Binding> = source.fetch(kind)?;
    for binding in &mut bindings {
        if binding.kind.is_empty() {
            binding.kind = kind.record_kind().to_string();
        }
    }
    Ok(bindings)
}
