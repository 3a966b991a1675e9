//! Account view tests over a small but realistic cluster.

use rbac_model::{
    attach_rules, resolve, resolve_with_rules, Binding, BindingCategory, BindingUniverse,
    PermissionRule, ResolveOptions, Role, RoleCatalog, RoleKind, RoleRef, Subject,
};

/// Roles and bindings modelled on a kubeadm cluster with two teams.
struct Fixture {
    roles: Vec<Role>,
    cluster_roles: Vec<Role>,
    role_bindings: Vec<Binding>,
    cluster_bindings: Vec<Binding>,
}

impl Fixture {
    fn new() -> Self {
        let mut roles = vec![
            Role::new(RoleKind::Role, "pod-reader")
                .with_namespace("team-a")
                .with_rule(PermissionRule::new([""], ["pods"], ["get"]))
                .with_rule(PermissionRule::new([""], ["pods", "pods/log"], ["list", "watch"])),
            Role::new(RoleKind::Role, "deployer")
                .with_namespace("team-b")
                .with_rule(PermissionRule::new(["apps"], ["deployments"], ["*"])),
        ];
        let mut cluster_roles = vec![
            Role::new(RoleKind::ClusterRole, "cluster-admin")
                .with_rule(PermissionRule::new(["*"], ["*"], ["*"])),
            Role::new(RoleKind::ClusterRole, "view").with_rule(PermissionRule::new(
                ["", "apps"],
                ["configmaps", "deployments"],
                ["get", "list", "watch"],
            )),
        ];
        for role in roles.iter_mut().chain(cluster_roles.iter_mut()) {
            role.consolidate_rules();
        }

        let role_bindings = vec![
            Binding::new("RoleBinding", "read-pods", RoleRef::new(RoleKind::Role, "pod-reader"))
                .with_namespace("team-a")
                .with_subject(Subject::user("alice"))
                .with_subject(Subject::group("team-a-devs"))
                .with_subject(Subject::service_account("team-a", "ci")),
            Binding::new("RoleBinding", "deploy", RoleRef::new(RoleKind::Role, "deployer"))
                .with_namespace("team-b")
                .with_subject(Subject::user("bob")),
            Binding::new("RoleBinding", "stale", RoleRef::new(RoleKind::Role, "deleted-role"))
                .with_namespace("team-b")
                .with_subject(Subject::user("bob")),
        ];
        let cluster_bindings = vec![
            Binding::new("ClusterRoleBinding", "admins", RoleRef::new(RoleKind::ClusterRole, "cluster-admin"))
                .with_subject(Subject::group("system:masters")),
            Binding::new("ClusterRoleBinding", "viewers", RoleRef::new(RoleKind::ClusterRole, "view"))
                .with_subject(Subject::user("bob"))
                .with_subject(Subject::user("alice")),
        ];

        Self {
            roles,
            cluster_roles,
            role_bindings,
            cluster_bindings,
        }
    }

    fn universe(&self) -> BindingUniverse<'_> {
        BindingUniverse::new(&self.cluster_bindings, &self.role_bindings)
    }

    fn catalog(&self) -> RoleCatalog<'_> {
        RoleCatalog::new(&self.roles, &self.cluster_roles)
    }
}

#[test]
fn every_admitted_subject_has_a_matching_reference() {
    let fixture = Fixture::new();
    let options = ResolveOptions::new().with_service_accounts(true);
    let accounts = resolve(&fixture.universe(), &options);

    for binding in fixture.cluster_bindings.iter().chain(fixture.role_bindings.iter()) {
        for subject in binding.subjects.iter().filter(|s| options.admits(s)) {
            let account = accounts
                .iter()
                .find(|a| a.name == subject.name)
                .unwrap_or_else(|| panic!("no account for {}", subject.name));
            assert!(account.bindings.iter().any(|b| {
                b.role_ref_kind == binding.role_ref.kind && b.role_ref_name == binding.role_ref.name
            }));
        }
    }
}

#[test]
fn groups_never_become_accounts() {
    let fixture = Fixture::new();
    let accounts = resolve(&fixture.universe(), &ResolveOptions::new().with_service_accounts(true));
    assert!(accounts.iter().all(|a| a.name != "system:masters" && a.name != "team-a-devs"));
}

#[test]
fn service_accounts_are_opt_in() {
    let fixture = Fixture::new();

    let users = resolve(&fixture.universe(), &ResolveOptions::new());
    let names: Vec<&str> = users.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);

    let everyone = resolve(&fixture.universe(), &ResolveOptions::new().with_service_accounts(true));
    let names: Vec<&str> = everyone.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob", "ci"]);
}

#[test]
fn bob_sees_cluster_grant_first_and_missing_role_as_empty() {
    let fixture = Fixture::new();
    let accounts = resolve_with_rules(&fixture.universe(), &fixture.catalog(), &ResolveOptions::new());
    let bob = accounts.iter().find(|a| a.name == "bob").unwrap();

    let keys: Vec<_> = bob.bindings.iter().map(|b| b.sort_key()).collect();
    assert_eq!(
        keys,
        vec![
            ("ClusterRoleBinding", "", "view", "ClusterRole"),
            ("RoleBinding", "team-b", "deleted-role", "Role"),
            ("RoleBinding", "team-b", "deployer", "Role"),
        ]
    );

    assert_eq!(bob.bindings[0].attached_rules.len(), 4);
    assert!(bob.bindings[1].attached_rules.is_empty());
    assert_eq!(bob.bindings[2].attached_rules[0].verbs, vec!["*"]);
}

#[test]
fn attached_rules_are_the_consolidated_role_rules() {
    let fixture = Fixture::new();
    let accounts = resolve_with_rules(&fixture.universe(), &fixture.catalog(), &ResolveOptions::new());
    let alice = accounts.iter().find(|a| a.name == "alice").unwrap();
    let read_pods = alice
        .bindings
        .iter()
        .find(|b| b.role_ref_name == "pod-reader")
        .unwrap();

    let rendered: Vec<(String, String, Vec<String>)> = read_pods
        .attached_rules
        .iter()
        .map(|r| (r.api_groups[0].clone(), r.resources[0].clone(), r.verbs.clone()))
        .collect();
    assert_eq!(
        rendered,
        vec![
            ("CORE".into(), "pods".into(), vec!["get".into(), "list".into(), "watch".into()]),
            ("CORE".into(), "pods/log".into(), vec!["list".into(), "watch".into()]),
        ]
    );
}

#[test]
fn only_filter_limits_collection() {
    let fixture = Fixture::new();
    let accounts = resolve(
        &fixture.universe(),
        &ResolveOptions::new().only([BindingCategory::ClusterRoleBinding]),
    );
    for account in &accounts {
        assert!(account.bindings.iter().all(|b| b.kind == "ClusterRoleBinding"));
    }
    assert_eq!(accounts.len(), 2);
}

#[test]
fn resolving_twice_yields_identical_output() {
    let fixture = Fixture::new();
    let first = resolve(&fixture.universe(), &ResolveOptions::new());
    let second = resolve(&fixture.universe(), &ResolveOptions::new());
    assert_eq!(first, second);

    let attached = attach_rules(first, &fixture.catalog());
    assert_eq!(attach_rules(attached.clone(), &fixture.catalog()), attached);
}
