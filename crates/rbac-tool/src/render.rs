//! Tables for roles, bindings and the account view.

use rbac_model::{AccountRecord, Binding, PermissionRule, Role, Subject, SystemFilter};

use crate::table::Table;

/// Format a verb list as `[get, list]`.
pub fn format_verbs(verbs: &[String]) -> String {
    format!("[{}]", verbs.join(", "))
}

fn hidden(filter: Option<&SystemFilter>, name: &str) -> bool {
    filter.is_some_and(|f| f.is_system(name))
}

/// One `(api group, resource, verbs)` triple per row of a rule.
pub(crate) fn rule_rows(rule: &PermissionRule) -> impl Iterator<Item = [String; 3]> + '_ {
    let verbs = format_verbs(&rule.verbs);
    rule.normalized_api_groups().into_iter().flat_map(move |group| {
        let verbs = verbs.clone();
        rule.resources
            .iter()
            .map(move |resource| [group.clone(), resource.clone(), verbs.clone()])
    })
}

/// Namespaced roles (and KubeSphere workspace roles).
///
/// The namespace column shows the workspace label when present. Roles with
/// no rules produce no rows.
pub fn roles_table(roles: &[Role], filter: Option<&SystemFilter>) -> Table {
    let mut table = Table::new(["Namespace", "Kind", "Role Name", "apiGroups", "Resources", "Verbs"]);
    for role in roles.iter().filter(|r| !hidden(filter, r.name())) {
        let mut rows = role.rules.iter().flat_map(rule_rows).peekable();
        if rows.peek().is_none() {
            continue;
        }
        let mut first = true;
        for [group, resource, verbs] in rows {
            if first {
                table.row([
                    role.metadata.scope_label().to_string(),
                    role.kind.clone(),
                    role.name().to_string(),
                    group,
                    resource,
                    verbs,
                ]);
                first = false;
            } else {
                table.row([String::new(), String::new(), String::new(), group, resource, verbs]);
            }
        }
        table.rule();
    }
    table
}

/// Cluster roles (and KubeSphere global roles).
pub fn cluster_roles_table(roles: &[Role], filter: Option<&SystemFilter>) -> Table {
    let mut table = Table::new(["Kind", "Role Name", "apiGroups", "Resources", "Verbs"]);
    for role in roles.iter().filter(|r| !hidden(filter, r.name())) {
        let mut rows = role.rules.iter().flat_map(rule_rows).peekable();
        if rows.peek().is_none() {
            continue;
        }
        let mut first = true;
        for [group, resource, verbs] in rows {
            let (kind, name) = if first {
                first = false;
                (role.kind.clone(), role.name().to_string())
            } else {
                (String::new(), String::new())
            };
            table.row([kind, name, group, resource, verbs]);
        }
        table.rule();
    }
    table
}

fn subject_namespace(subject: &Subject) -> String {
    match subject.namespace.as_deref() {
        Some(ns) if !ns.is_empty() => ns.to_string(),
        _ => "-".to_string(),
    }
}

/// Role bindings (and KubeSphere workspace and global role bindings).
///
/// One row per subject. Bindings without subjects produce no rows.
pub fn role_bindings_table(bindings: &[Binding], filter: Option<&SystemFilter>) -> Table {
    let mut table = Table::new([
        "Kind",
        "Binding Name",
        "Allows to (namespace)",
        "Role Kind",
        "Link to (Role Name)",
        "Subject Kind",
        "Subject Name",
        "Subject Namespace",
    ]);
    for binding in bindings.iter().filter(|b| !hidden(filter, b.name())) {
        if binding.subjects.is_empty() {
            continue;
        }
        for (i, subject) in binding.subjects.iter().enumerate() {
            let prefix = if i == 0 {
                [
                    binding.kind.clone(),
                    binding.name().to_string(),
                    binding.metadata.scope_label().to_string(),
                    binding.role_ref.kind.clone(),
                    binding.role_ref.name.clone(),
                ]
            } else {
                Default::default()
            };
            table.row(
                prefix
                    .into_iter()
                    .chain([subject.kind.clone(), subject.name.clone(), subject_namespace(subject)]),
            );
        }
        table.rule();
    }
    table
}

/// Cluster role bindings.
///
/// The namespace column is `*` except for service accounts, which show
/// their own namespace. With `extended`, owner references are appended one
/// per row, or `-` when there are none.
pub fn cluster_role_bindings_table(
    bindings: &[Binding],
    filter: Option<&SystemFilter>,
    extended: bool,
) -> Table {
    let mut header = vec![
        "Binding Name",
        "Role Kind",
        "Link to (Role Name)",
        "Subject Kind",
        "Subject Name",
        "Allows to (namespace)",
    ];
    if extended {
        header.push("OwnerReferences (apiVersion, kind, name)");
    }
    let mut table = Table::new(header);

    for binding in bindings.iter().filter(|b| !hidden(filter, b.name())) {
        if binding.subjects.is_empty() {
            continue;
        }
        let owners: Vec<String> = if binding.metadata.owner_references.is_empty() {
            vec!["-".to_string()]
        } else {
            binding
                .metadata
                .owner_references
                .iter()
                .map(|o| format!("{}, {}, {}", o.api_version, o.kind, o.name))
                .collect()
        };
        let lines = if extended {
            binding.subjects.len().max(owners.len())
        } else {
            binding.subjects.len()
        };

        for i in 0..lines {
            let mut cells = if i == 0 {
                vec![
                    binding.name().to_string(),
                    binding.role_ref.kind.clone(),
                    binding.role_ref.name.clone(),
                ]
            } else {
                vec![String::new(); 3]
            };
            match binding.subjects.get(i) {
                Some(subject) => {
                    let scope = if subject.is_service_account() {
                        subject.namespace.clone().unwrap_or_default()
                    } else {
                        "*".to_string()
                    };
                    cells.extend([subject.kind.clone(), subject.name.clone(), scope]);
                }
                None => cells.extend(vec![String::new(); 3]),
            }
            if extended {
                cells.push(owners.get(i).cloned().unwrap_or_default());
            }
            table.row(cells);
        }
        table.rule();
    }
    table
}

/// The account view.
///
/// With `more`, each binding lists the rules of its role, one
/// `(api group, resource)` per row, and bindings are separated by a rule
/// under the binding columns.
pub fn accounts_table(accounts: &[AccountRecord], more: bool) -> Table {
    let mut header = vec!["Account Name", "ID Type", "Kind", "Namespace", "RoleRefName", "RoleRefKind"];
    if more {
        header.extend(["apiGroups", "Resources", "Verbs"]);
    }
    let mut table = Table::new(header);

    for account in accounts {
        for (i, binding) in account.bindings.iter().enumerate() {
            if more && i > 0 {
                table.partial_rule(2);
            }
            let (name, id_type) = if i == 0 {
                (account.name.clone(), account.display_kind().to_string())
            } else {
                (String::new(), String::new())
            };
            let grant = [
                name,
                id_type,
                binding.kind.clone(),
                binding.namespace.clone(),
                binding.role_ref_name.clone(),
                binding.role_ref_kind.clone(),
            ];
            if !more {
                table.row(grant);
                continue;
            }

            let mut rows = binding.attached_rules.iter().flat_map(rule_rows);
            match rows.next() {
                Some(first) => {
                    table.row(grant.into_iter().chain(first));
                    for rest in rows {
                        table.row(std::iter::repeat(String::new()).take(6).chain(rest));
                    }
                }
                None => table.row(grant),
            }
        }
        table.rule();
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbac_model::{BindingReference, OwnerReference, RoleKind, RoleRef};

    fn lines(table: &Table) -> Vec<String> {
        table
            .render()
            .lines()
            .map(|l| l.split('|').map(str::trim).collect::<Vec<_>>().join("|"))
            .collect()
    }

    fn consolidated(mut role: Role) -> Role {
        role.consolidate_rules();
        role
    }

    #[test]
    fn test_format_verbs() {
        assert_eq!(format_verbs(&["get".into(), "list".into()]), "[get, list]");
        assert_eq!(format_verbs(&[]), "[]");
    }

    #[test]
    fn test_roles_table_uses_workspace_label() {
        let mut role = Role::new(RoleKind::WorkspaceRole, "finance-viewer")
            .with_rule(PermissionRule::new(["", "apps"], ["pods"], ["get"]));
        role.metadata
            .labels
            .insert("kubesphere.io/workspace".into(), "finance".into());

        let rendered = lines(&roles_table(&[consolidated(role)], None));
        assert_eq!(rendered[2], "finance|WorkspaceRole|finance-viewer|CORE|pods|[get]");
        assert_eq!(rendered[3], "|||apps|pods|[get]");
    }

    #[test]
    fn test_roles_without_rules_and_system_roles_are_skipped() {
        let filter = SystemFilter::default();
        let roles = vec![
            Role::new(RoleKind::Role, "empty").with_namespace("dev"),
            consolidated(
                Role::new(RoleKind::Role, "system:controller")
                    .with_namespace("kube-system")
                    .with_rule(PermissionRule::new([""], ["pods"], ["get"])),
            ),
        ];
        assert_eq!(roles_table(&roles, Some(&filter)).data_rows(), 0);
        assert_eq!(roles_table(&roles, None).data_rows(), 1);
    }

    #[test]
    fn test_cluster_roles_table() {
        let role = consolidated(Role::new(RoleKind::ClusterRole, "view").with_rule(PermissionRule::new(
            [""],
            ["configmaps", "pods"],
            ["get", "list", "watch"],
        )));
        let rendered = lines(&cluster_roles_table(&[role], None));
        assert_eq!(rendered[0], "Kind|Role Name|apiGroups|Resources|Verbs");
        assert_eq!(rendered[2], "ClusterRole|view|CORE|configmaps|[get, list, watch]");
        assert_eq!(rendered[3], "||CORE|pods|[get, list, watch]");
    }

    #[test]
    fn test_role_bindings_table_one_row_per_subject() {
        let binding = Binding::new("RoleBinding", "read-pods", RoleRef::new(RoleKind::Role, "pod-reader"))
            .with_namespace("dev")
            .with_subject(Subject::user("alice"))
            .with_subject(Subject::service_account("ci", "builder"));
        let rendered = lines(&role_bindings_table(&[binding], None));
        assert_eq!(rendered[2], "RoleBinding|read-pods|dev|Role|pod-reader|User|alice|-");
        assert_eq!(rendered[3], "|||||ServiceAccount|builder|ci");
    }

    #[test]
    fn test_cluster_role_bindings_extended() {
        let mut binding = Binding::new(
            "ClusterRoleBinding",
            "ws-admin",
            RoleRef::new(RoleKind::ClusterRole, "admin"),
        )
        .with_subject(Subject::user("carol"))
        .with_subject(Subject::service_account("kube-system", "operator"));
        binding.metadata.owner_references.push(OwnerReference {
            api_version: "iam.kubesphere.io/v1alpha2".into(),
            kind: "User".into(),
            name: "carol".into(),
            ..OwnerReference::default()
        });

        let plain = lines(&cluster_role_bindings_table(std::slice::from_ref(&binding), None, false));
        assert_eq!(plain[2], "ws-admin|ClusterRole|admin|User|carol|*");
        assert_eq!(plain[3], "|||ServiceAccount|operator|kube-system");

        let extended = lines(&cluster_role_bindings_table(&[binding], None, true));
        assert_eq!(
            extended[2],
            "ws-admin|ClusterRole|admin|User|carol|*|iam.kubesphere.io/v1alpha2, User, carol"
        );
        assert_eq!(extended[3], "|||ServiceAccount|operator|kube-system|");
    }

    #[test]
    fn test_cluster_role_bindings_without_owners() {
        let binding = Binding::new("ClusterRoleBinding", "viewers", RoleRef::new(RoleKind::ClusterRole, "view"))
            .with_subject(Subject::group("devs"));
        let rendered = lines(&cluster_role_bindings_table(&[binding], None, true));
        assert_eq!(rendered[2], "viewers|ClusterRole|view|Group|devs|*|-");
    }

    fn account() -> AccountRecord {
        let mut account = AccountRecord::new("ci", "ServiceAccount");
        account.bindings = vec![
            BindingReference {
                kind: "ClusterRoleBinding".into(),
                namespace: String::new(),
                role_ref_name: "view".into(),
                role_ref_kind: "ClusterRole".into(),
                attached_rules: vec![
                    PermissionRule::new(["CORE"], ["pods"], ["get"]),
                    PermissionRule::new(["apps"], ["deployments"], ["list"]),
                ],
            },
            BindingReference {
                kind: "RoleBinding".into(),
                namespace: "dev".into(),
                role_ref_name: "gone".into(),
                role_ref_kind: "Role".into(),
                attached_rules: Vec::new(),
            },
        ];
        account
    }

    #[test]
    fn test_accounts_table() {
        let rendered = lines(&accounts_table(&[account()], false));
        assert_eq!(rendered[0], "Account Name|ID Type|Kind|Namespace|RoleRefName|RoleRefKind");
        assert_eq!(rendered[2], "ci|Service|ClusterRoleBinding||view|ClusterRole");
        assert_eq!(rendered[3], "||RoleBinding|dev|gone|Role");
        assert!(rendered[4].starts_with("---"));
    }

    #[test]
    fn test_accounts_table_with_rules() {
        let table = accounts_table(&[account()], true);
        let rendered = lines(&table);
        assert_eq!(rendered[2], "ci|Service|ClusterRoleBinding||view|ClusterRole|CORE|pods|[get]");
        assert_eq!(rendered[3], "||||||apps|deployments|[list]");
        assert!(rendered[4].starts_with("||---"));
        assert_eq!(rendered[5], "||RoleBinding|dev|gone|Role");
        assert_eq!(table.data_rows(), 3);
    }
}
