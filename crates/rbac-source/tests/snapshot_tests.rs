//! Snapshot loading from exported directories and a scripted kubectl.

use rbac_model::{resolve_with_rules, ResolveOptions};
use rbac_source::{ClusterSnapshot, DirectorySource, ResourceKind, SourceError};
use std::path::Path;

const ROLES: &str = r#"{
  "apiVersion": "v1",
  "kind": "List",
  "items": [
    {
      "apiVersion": "rbac.authorization.k8s.io/v1",
      "kind": "Role",
      "metadata": {"name": "pod-reader", "namespace": "dev", "uid": "6c1c4ac2-7d0a-4a8e-9b59-1f0b7a0b8d61"},
      "rules": [
        {"apiGroups": [""], "resources": ["pods"], "verbs": ["get", "list"]},
        {"apiGroups": [""], "resources": ["pods"], "verbs": ["watch"]}
      ]
    }
  ]
}"#;

const CLUSTER_ROLES: &str = r#"{
  "items": [
    {
      "kind": "ClusterRole",
      "metadata": {"name": "admin-all", "creationTimestamp": "2024-03-01T12:00:00Z"},
      "rules": [
        {"apiGroups": ["apps"], "resources": ["deployments"],
         "verbs": ["get", "list", "watch", "create", "delete", "deletecollection", "patch", "update"]}
      ]
    },
    {"kind": "ClusterRole", "metadata": {"name": "aggregated"}, "rules": null}
  ]
}"#;

const ROLE_BINDINGS: &str = r#"{
  "items": [
    {
      "kind": "RoleBinding",
      "metadata": {"name": "read-pods", "namespace": "dev"},
      "roleRef": {"apiGroup": "rbac.authorization.k8s.io", "kind": "Role", "name": "pod-reader"},
      "subjects": [
        {"kind": "User", "name": "alice", "apiGroup": "rbac.authorization.k8s.io"},
        {"kind": "ServiceAccount", "name": "builder", "namespace": "dev"}
      ]
    }
  ]
}"#;

const CLUSTER_ROLE_BINDINGS: &str = r#"{
  "items": [
    {
      "kind": "ClusterRoleBinding",
      "metadata": {"name": "admins"},
      "roleRef": {"kind": "ClusterRole", "name": "admin-all"},
      "subjects": [{"kind": "User", "name": "alice"}]
    },
    {
      "kind": "ClusterRoleBinding",
      "metadata": {"name": "orphaned"},
      "roleRef": {"kind": "ClusterRole", "name": "aggregated"},
      "subjects": null
    }
  ]
}"#;

fn write_kubernetes_files(dir: &Path) {
    for (kind, body) in [
        (ResourceKind::Roles, ROLES),
        (ResourceKind::ClusterRoles, CLUSTER_ROLES),
        (ResourceKind::RoleBindings, ROLE_BINDINGS),
        (ResourceKind::ClusterRoleBindings, CLUSTER_ROLE_BINDINGS),
    ] {
        std::fs::write(dir.join(format!("{kind}.json")), body).unwrap();
    }
}

#[test]
fn test_directory_snapshot_loads_and_resolves() {
    let dir = tempfile::tempdir().unwrap();
    write_kubernetes_files(dir.path());

    let snapshot = ClusterSnapshot::load(&DirectorySource::new(dir.path()), false).unwrap();
    assert_eq!(snapshot.cluster_roles.len(), 2);
    assert_eq!(snapshot.cluster_roles[0].rules[0].verbs, vec!["*"]);
    assert!(snapshot.cluster_roles[1].rules.is_empty());
    assert!(snapshot.cluster_role_bindings[1].subjects.is_empty());

    let accounts = resolve_with_rules(
        &snapshot.bindings(),
        &snapshot.catalog(),
        &ResolveOptions::new().with_service_accounts(true),
    );
    let names: Vec<&str> = accounts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["alice", "builder"]);

    let alice = &accounts[0];
    assert_eq!(alice.bindings.len(), 2);
    assert_eq!(alice.bindings[0].kind, "ClusterRoleBinding");
    assert_eq!(alice.bindings[1].namespace, "dev");
    assert_eq!(alice.bindings[1].attached_rules[0].verbs, vec!["get", "list", "watch"]);
}

#[test]
fn test_malformed_file_aborts_load() {
    let dir = tempfile::tempdir().unwrap();
    write_kubernetes_files(dir.path());
    std::fs::write(dir.path().join("rolebindings.json"), r#"{"items": [{"metadata": {}}]}"#).unwrap();

    let err = ClusterSnapshot::load(&DirectorySource::new(dir.path()), false).unwrap_err();
    assert!(matches!(err, SourceError::Parse { kind: ResourceKind::RoleBindings, .. }));
}

#[test]
fn test_kubesphere_files_required_only_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    write_kubernetes_files(dir.path());
    let source = DirectorySource::new(dir.path());

    assert!(ClusterSnapshot::load(&source, false).is_ok());
    let err = ClusterSnapshot::load(&source, true).unwrap_err();
    assert_eq!(err.error_code(), "IO_ERROR");
}

#[test]
fn test_workspace_bindings_carry_workspace_label() {
    let dir = tempfile::tempdir().unwrap();
    write_kubernetes_files(dir.path());
    let empty = r#"{"items": []}"#;
    std::fs::write(dir.path().join("workspaceroles.json"), empty).unwrap();
    std::fs::write(dir.path().join("globalroles.json"), empty).unwrap();
    std::fs::write(dir.path().join("globalrolebindings.json"), empty).unwrap();
    std::fs::write(
        dir.path().join("workspacerolebindings.json"),
        r#"{"items": [{
            "kind": "WorkspaceRoleBinding",
            "metadata": {"name": "carol-admin", "labels": {"kubesphere.io/workspace": "finance"}},
            "roleRef": {"apiGroup": "iam.kubesphere.io", "kind": "WorkspaceRole", "name": "finance-admin"},
            "subjects": [{"kind": "User", "name": "carol"}]
        }]}"#,
    )
    .unwrap();

    let snapshot = ClusterSnapshot::load(&DirectorySource::new(dir.path()), true).unwrap();
    let accounts = rbac_model::resolve(&snapshot.bindings(), &ResolveOptions::new());
    let carol = accounts.iter().find(|a| a.name == "carol").unwrap();
    assert_eq!(carol.bindings[0].kind, "WorkspaceRoleBinding");
    assert_eq!(carol.bindings[0].namespace, "finance");
}

#[cfg(unix)]
mod scripted_kubectl {
    use super::*;
    use rbac_source::{Discovery, KubectlSource, RecordSource, SourceConfig};
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, body: &str) -> String {
        let path = dir.join("kubectl");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    fn source(kubectl: String) -> KubectlSource {
        KubectlSource::new(SourceConfig {
            kubectl,
            ..SourceConfig::default()
        })
        .unwrap()
    }

    // Scripts are written and executed in one test so no other test thread
    // forks while a script is open for writing.
    #[test]
    fn test_scripted_kubectl() {
        let dir = tempfile::tempdir().unwrap();

        let decoded = dir.path().join("decoded");
        std::fs::create_dir(&decoded).unwrap();
        let kubectl = script(
            &decoded,
            r#"echo '{"items": [{"kind": "ClusterRole", "metadata": {"name": "view"}, "rules": []}]}'"#,
        );
        let roles: Vec<rbac_model::Role> = source(kubectl).fetch(ResourceKind::ClusterRoles).unwrap();
        assert_eq!(roles[0].name(), "view");

        let failing = dir.path().join("failing");
        std::fs::create_dir(&failing).unwrap();
        let kubectl = script(&failing, "echo 'error: unauthorized' >&2; exit 1");
        match source(kubectl).fetch_raw(ResourceKind::Roles).unwrap_err() {
            SourceError::CommandFailed { status, stderr, command } => {
                assert_eq!(status, Some(1));
                assert_eq!(stderr, "error: unauthorized");
                assert!(command.ends_with("get roles -A -o json"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let discovering = dir.path().join("discovering");
        std::fs::create_dir(&discovering).unwrap();
        let kubectl = script(
            &discovering,
            r#"case "$*" in
  *wide*) echo 'pods po v1 true Pod [get list watch]' ;;
  *) echo 'configmaps cm v1 true ConfigMap'; echo 'bindings v1 true Binding' ;;
esac"#,
        );
        let source = source(kubectl);
        assert_eq!(source.core_kinds().unwrap(), vec!["ConfigMap", "Binding"]);
        assert_eq!(source.verbs().unwrap().len(), 3);
    }
}
