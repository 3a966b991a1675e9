//! # RBAC Model
//!
//! Object model and join engine for inspecting a Kubernetes RBAC graph.
//!
//! ## Overview
//!
//! The rbac-model crate handles:
//! - **Objects**: Roles, cluster roles, bindings and subjects as exported by `kubectl`
//! - **Verbs**: The standard verb vocabulary and wildcard collapsing
//! - **Rules**: Consolidation of redundant rules into one canonical rule per
//!   `(api group, resource)` pair
//! - **Accounts**: Resolution of bindings into one record per principal, optionally
//!   annotated with the rules of the referenced roles
//!
//! ## Architecture
//!
//! ```text
//! raw rules ──► consolidate ──► Role.rules (canonical)
//!                                   │
//! bindings ──► resolve ──► AccountRecord[] ──► attach_rules ──► AccountRecord[] (with rules)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use rbac_model::{
//!     resolve_with_rules, Binding, BindingUniverse, PermissionRule, ResolveOptions, Role,
//!     RoleCatalog, RoleKind, RoleRef, Subject,
//! };
//!
//! let mut reader = Role::new(RoleKind::ClusterRole, "reader")
//!     .with_rule(PermissionRule::new([""], ["pods"], ["get"]))
//!     .with_rule(PermissionRule::new([""], ["pods"], ["list"]));
//! reader.consolidate_rules();
//!
//! let cluster_roles = vec![reader];
//! let cluster_bindings = vec![
//!     Binding::new("ClusterRoleBinding", "readers", RoleRef::new(RoleKind::ClusterRole, "reader"))
//!         .with_subject(Subject::user("alice")),
//! ];
//!
//! let accounts = resolve_with_rules(
//!     &BindingUniverse::new(&cluster_bindings, &[]),
//!     &RoleCatalog::new(&[], &cluster_roles),
//!     &ResolveOptions::new(),
//! );
//! assert_eq!(accounts[0].bindings[0].attached_rules[0].verbs, vec!["get", "list"]);
//! ```
//!
//! ## Scope
//!
//! The crate aggregates declared grants. It does not decide whether a
//! principal may perform an action, and it never mutates cluster state.

pub mod accounts;
pub mod filter;
pub mod objects;
pub mod rules;
pub mod verbs;

// Re-export main types for convenience
pub use accounts::{
    attach_rules, merge_accounts, resolve, resolve_with_rules, sort_accounts, AccountRecord,
    BindingCategory, BindingReference, BindingUniverse, ResolveOptions, RoleCatalog,
};
pub use filter::{SystemFilter, DEFAULT_SYSTEM_PREFIXES};
pub use objects::{Binding, ObjectMeta, OwnerReference, Role, RoleKind, RoleRef, Subject};
pub use rules::{consolidate, sort_by_api_group, PermissionRule, CORE_API_GROUP};
pub use verbs::{Verb, VerbSet, WILDCARD};
