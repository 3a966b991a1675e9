//! # Accounts
//!
//! The identity-centric view of the RBAC graph: one [`AccountRecord`] per
//! principal, listing every binding that names it.
//!
//! Resolution runs in three phases over fully loaded bindings:
//!
//! 1. **Collect** admitted subjects from the selected binding categories.
//! 2. **Sort** records by name, and each record's bindings by
//!    `(kind, namespace, role ref name, role ref kind)`.
//! 3. **Merge** records sharing a name, concatenating their bindings.
//!
//! [`attach_rules`] optionally annotates each binding with the consolidated
//! rules of the role it references.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::objects::{Binding, Role, RoleKind, Subject, SUBJECT_SERVICE_ACCOUNT};
use crate::rules::PermissionRule;

/// Category of binding an account grant can come from.
///
/// Variants are declared in collection order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BindingCategory {
    /// Cluster-wide Kubernetes bindings.
    ClusterRoleBinding,
    /// Namespaced Kubernetes bindings.
    RoleBinding,
    /// KubeSphere workspace bindings.
    WorkspaceRoleBinding,
    /// KubeSphere global bindings.
    GlobalRoleBinding,
}

impl BindingCategory {
    /// Get the category as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingCategory::ClusterRoleBinding => "clusterrolebinding",
            BindingCategory::RoleBinding => "rolebinding",
            BindingCategory::WorkspaceRoleBinding => "workspacerolebinding",
            BindingCategory::GlobalRoleBinding => "globalrolebinding",
        }
    }

    /// Parse a category, ignoring surrounding whitespace and case.
    ///
    /// # Example
    ///
    /// ```
    /// use rbac_model::BindingCategory;
    ///
    /// assert_eq!(BindingCategory::parse(" rolebinding"), Some(BindingCategory::RoleBinding));
    /// assert_eq!(BindingCategory::parse("binding"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "clusterrolebinding" => Some(BindingCategory::ClusterRoleBinding),
            "rolebinding" => Some(BindingCategory::RoleBinding),
            "workspacerolebinding" => Some(BindingCategory::WorkspaceRoleBinding),
            "globalrolebinding" => Some(BindingCategory::GlobalRoleBinding),
            _ => None,
        }
    }

    /// All categories, in collection order.
    pub fn all() -> [BindingCategory; 4] {
        [
            BindingCategory::ClusterRoleBinding,
            BindingCategory::RoleBinding,
            BindingCategory::WorkspaceRoleBinding,
            BindingCategory::GlobalRoleBinding,
        ]
    }

    /// The record kind bindings of this category carry.
    pub fn record_kind(&self) -> &'static str {
        match self {
            BindingCategory::ClusterRoleBinding => "ClusterRoleBinding",
            BindingCategory::RoleBinding => "RoleBinding",
            BindingCategory::WorkspaceRoleBinding => "WorkspaceRoleBinding",
            BindingCategory::GlobalRoleBinding => "GlobalRoleBinding",
        }
    }

    /// Check if the binding's namespace is recorded on account grants.
    ///
    /// Cluster and global bindings have no namespace.
    pub fn is_namespaced(&self) -> bool {
        matches!(
            self,
            BindingCategory::RoleBinding | BindingCategory::WorkspaceRoleBinding
        )
    }
}

impl std::fmt::Display for BindingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One grant held by an account: a binding and the role it references.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BindingReference {
    /// Kind of the binding (`RoleBinding`, `ClusterRoleBinding`, ...).
    pub kind: String,
    /// Namespace of the binding; empty for cluster-scoped bindings.
    pub namespace: String,
    /// Name of the referenced role.
    pub role_ref_name: String,
    /// Kind of the referenced role.
    pub role_ref_kind: String,
    /// Consolidated rules of the referenced role, once attached.
    #[serde(rename = "rules", default)]
    pub attached_rules: Vec<PermissionRule>,
}

impl BindingReference {
    /// Build the reference a binding contributes for one of its subjects.
    pub fn from_binding(binding: &Binding, category: BindingCategory) -> Self {
        let kind = if binding.kind.is_empty() {
            category.record_kind().to_string()
        } else {
            binding.kind.clone()
        };
        let namespace = if category.is_namespaced() {
            binding.metadata.scope_label().to_string()
        } else {
            String::new()
        };

        Self {
            kind,
            namespace,
            role_ref_name: binding.role_ref.name.clone(),
            role_ref_kind: binding.role_ref.kind.clone(),
            attached_rules: Vec::new(),
        }
    }

    /// Composite sort key: kind, namespace, role name, role kind.
    pub fn sort_key(&self) -> (&str, &str, &str, &str) {
        (
            self.kind.as_str(),
            self.namespace.as_str(),
            self.role_ref_name.as_str(),
            self.role_ref_kind.as_str(),
        )
    }
}

/// Everything a single principal is bound to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountRecord {
    /// Principal name. Unique across the record collection.
    pub name: String,
    /// Subject kind recorded on first sight (`User` or `ServiceAccount`).
    #[serde(rename = "kind")]
    pub principal_kind: String,
    /// Grants, one per (binding, matching subject) pair.
    pub bindings: Vec<BindingReference>,
}

impl AccountRecord {
    /// Create a record with no bindings.
    pub fn new(name: impl Into<String>, principal_kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            principal_kind: principal_kind.into(),
            bindings: Vec::new(),
        }
    }

    /// Check if the principal was first seen as a service account.
    pub fn is_service_account(&self) -> bool {
        self.principal_kind == SUBJECT_SERVICE_ACCOUNT
    }

    /// Short kind label for tables (`ServiceAccount` becomes `Service`).
    pub fn display_kind(&self) -> &str {
        if self.is_service_account() {
            "Service"
        } else {
            &self.principal_kind
        }
    }

    /// Sort bindings by their composite key. Stable.
    pub fn sort_bindings(&mut self) {
        self.bindings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }
}

/// The bindings an account view is resolved from, by category.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindingUniverse<'a> {
    /// Cluster role bindings.
    pub cluster: &'a [Binding],
    /// Namespaced role bindings.
    pub namespaced: &'a [Binding],
    /// KubeSphere workspace role bindings.
    pub workspace: &'a [Binding],
    /// KubeSphere global role bindings.
    pub global: &'a [Binding],
}

impl<'a> BindingUniverse<'a> {
    /// Kubernetes bindings only.
    pub fn new(cluster: &'a [Binding], namespaced: &'a [Binding]) -> Self {
        Self {
            cluster,
            namespaced,
            workspace: &[],
            global: &[],
        }
    }

    /// Add KubeSphere bindings.
    pub fn with_kubesphere(mut self, workspace: &'a [Binding], global: &'a [Binding]) -> Self {
        self.workspace = workspace;
        self.global = global;
        self
    }

    /// Bindings of one category.
    pub fn category(&self, category: BindingCategory) -> &'a [Binding] {
        match category {
            BindingCategory::ClusterRoleBinding => self.cluster,
            BindingCategory::RoleBinding => self.namespaced,
            BindingCategory::WorkspaceRoleBinding => self.workspace,
            BindingCategory::GlobalRoleBinding => self.global,
        }
    }
}

/// The roles bindings are resolved against, by kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleCatalog<'a> {
    /// Namespaced roles.
    pub roles: &'a [Role],
    /// Cluster roles.
    pub cluster_roles: &'a [Role],
    /// KubeSphere workspace roles.
    pub workspace_roles: &'a [Role],
    /// KubeSphere global roles.
    pub global_roles: &'a [Role],
}

impl<'a> RoleCatalog<'a> {
    /// Kubernetes roles only.
    pub fn new(roles: &'a [Role], cluster_roles: &'a [Role]) -> Self {
        Self {
            roles,
            cluster_roles,
            workspace_roles: &[],
            global_roles: &[],
        }
    }

    /// Add KubeSphere roles.
    pub fn with_kubesphere(mut self, workspace_roles: &'a [Role], global_roles: &'a [Role]) -> Self {
        self.workspace_roles = workspace_roles;
        self.global_roles = global_roles;
        self
    }

    /// Find a role by `roleRef` kind and exact name. First match wins.
    pub fn find(&self, kind: &str, name: &str) -> Option<&'a Role> {
        let pool = match RoleKind::parse(kind)? {
            RoleKind::Role => self.roles,
            RoleKind::ClusterRole => self.cluster_roles,
            RoleKind::WorkspaceRole => self.workspace_roles,
            RoleKind::GlobalRole => self.global_roles,
        };
        pool.iter().find(|role| role.name() == name)
    }
}

/// Options controlling which grants an account view includes.
///
/// # Example
///
/// ```
/// use rbac_model::{BindingCategory, ResolveOptions};
///
/// let options = ResolveOptions::new()
///     .with_service_accounts(true)
///     .only([BindingCategory::RoleBinding]);
/// assert!(options.includes(BindingCategory::RoleBinding));
/// assert!(!options.includes(BindingCategory::ClusterRoleBinding));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Also aggregate `ServiceAccount` subjects.
    pub include_service_accounts: bool,
    /// Categories to collect from. Empty means all.
    pub categories: BTreeSet<BindingCategory>,
}

impl ResolveOptions {
    /// Users only, every category.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether service accounts are aggregated.
    pub fn with_service_accounts(mut self, include: bool) -> Self {
        self.include_service_accounts = include;
        self
    }

    /// Restrict collection to the given categories.
    pub fn only<I>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = BindingCategory>,
    {
        self.categories.extend(categories);
        self
    }

    /// Check if a category is collected.
    pub fn includes(&self, category: BindingCategory) -> bool {
        self.categories.is_empty() || self.categories.contains(&category)
    }

    /// Check if a subject becomes an account.
    ///
    /// Groups are never admitted.
    pub fn admits(&self, subject: &Subject) -> bool {
        subject.is_user() || (self.include_service_accounts && subject.is_service_account())
    }
}

/// Resolve bindings into one record per principal.
///
/// The returned records are sorted by name and each record's bindings by
/// their composite key. Nothing is attached; see [`attach_rules`].
///
/// # Example
///
/// ```
/// use rbac_model::{resolve, Binding, BindingUniverse, ResolveOptions, RoleKind, RoleRef, Subject};
///
/// let namespaced = vec![
///     Binding::new("RoleBinding", "dev-readers", RoleRef::new(RoleKind::Role, "reader"))
///         .with_namespace("dev")
///         .with_subject(Subject::user("alice"))
///         .with_subject(Subject::group("devs")),
/// ];
/// let accounts = resolve(&BindingUniverse::new(&[], &namespaced), &ResolveOptions::new());
/// assert_eq!(accounts.len(), 1);
/// assert_eq!(accounts[0].name, "alice");
/// assert_eq!(accounts[0].bindings[0].namespace, "dev");
/// ```
pub fn resolve(bindings: &BindingUniverse<'_>, options: &ResolveOptions) -> Vec<AccountRecord> {
    let mut accounts = collect(bindings, options);
    sort_accounts(&mut accounts);
    let accounts = merge_accounts(accounts);
    tracing::debug!(accounts = accounts.len(), "resolved account view");
    accounts
}

/// Resolve bindings and attach each referenced role's rules.
pub fn resolve_with_rules(
    bindings: &BindingUniverse<'_>,
    roles: &RoleCatalog<'_>,
    options: &ResolveOptions,
) -> Vec<AccountRecord> {
    attach_rules(resolve(bindings, options), roles)
}

/// Collect admitted subjects into records keyed by name.
fn collect(bindings: &BindingUniverse<'_>, options: &ResolveOptions) -> Vec<AccountRecord> {
    let mut accounts: Vec<AccountRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for category in BindingCategory::all() {
        if !options.includes(category) {
            continue;
        }
        for binding in bindings.category(category) {
            for subject in &binding.subjects {
                if !options.admits(subject) {
                    continue;
                }
                let reference = BindingReference::from_binding(binding, category);
                let slot = *index.entry(subject.name.clone()).or_insert_with(|| {
                    accounts.push(AccountRecord::new(subject.name.clone(), subject.kind.clone()));
                    accounts.len() - 1
                });
                accounts[slot].bindings.push(reference);
            }
        }
    }

    accounts
}

/// Sort records by name, and each record's bindings by composite key.
pub fn sort_accounts(accounts: &mut [AccountRecord]) {
    for account in accounts.iter_mut() {
        account.sort_bindings();
    }
    accounts.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Coalesce adjacent records sharing a name.
///
/// Expects records sorted by name. Bindings are concatenated in order, so
/// running it on already merged records changes nothing.
pub fn merge_accounts(accounts: Vec<AccountRecord>) -> Vec<AccountRecord> {
    let mut merged: Vec<AccountRecord> = Vec::with_capacity(accounts.len());
    for account in accounts {
        match merged.last_mut() {
            Some(last) if last.name == account.name => last.bindings.extend(account.bindings),
            _ => merged.push(account),
        }
    }
    merged
}

/// Attach the consolidated rules of each binding's referenced role.
///
/// Roles are looked up by `roleRef` kind and exact name; the first match
/// wins. A missing role leaves the binding's rules empty. Any rules attached
/// by an earlier call are replaced.
pub fn attach_rules(mut accounts: Vec<AccountRecord>, roles: &RoleCatalog<'_>) -> Vec<AccountRecord> {
    for account in &mut accounts {
        for binding in &mut account.bindings {
            binding.attached_rules = match roles.find(&binding.role_ref_kind, &binding.role_ref_name) {
                Some(role) => role.rules.clone(),
                None => {
                    tracing::debug!(
                        account = %account.name,
                        role_kind = %binding.role_ref_kind,
                        role = %binding.role_ref_name,
                        "referenced role not found"
                    );
                    Vec::new()
                }
            };
        }
    }
    accounts
}
