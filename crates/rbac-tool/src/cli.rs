//! Command line definition.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use rbac_model::{BindingCategory, ResolveOptions};
use rbac_source::SourceConfig;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// View Kubernetes RBAC roles, bindings and per-account access
#[derive(Debug, Parser)]
#[command(name = "rbac-tool")]
#[command(about = "View Kubernetes RBAC roles, bindings and per-account access")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Read `<DIR>/<kind>.json` snapshots instead of calling kubectl
    #[arg(long, global = true, value_name = "DIR")]
    pub from_dir: Option<PathBuf>,

    /// Also load KubeSphere workspace and global roles and bindings
    #[arg(short = 'k', long, visible_alias = "ks", global = true)]
    pub kubesphere: bool,

    /// kubectl binary (overrides RBAC_TOOL_KUBECTL)
    #[arg(long, global = true, value_name = "PATH")]
    pub kubectl: Option<String>,

    /// kubeconfig context (overrides RBAC_TOOL_CONTEXT)
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// kubeconfig file (overrides KUBECONFIG)
    #[arg(long, global = true, value_name = "FILE")]
    pub kubeconfig: Option<PathBuf>,

    /// kubectl request timeout (overrides RBAC_TOOL_REQUEST_TIMEOUT)
    #[arg(long, global = true, value_name = "SECONDS")]
    pub request_timeout: Option<u64>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Apply command line overrides on top of an environment configuration.
    pub fn apply(&self, mut config: SourceConfig) -> SourceConfig {
        if let Some(kubectl) = &self.kubectl {
            config.kubectl = kubectl.clone();
        }
        if let Some(context) = &self.context {
            config.context = Some(context.clone());
        }
        if let Some(kubeconfig) = &self.kubeconfig {
            config.kubeconfig = Some(kubeconfig.clone());
        }
        if let Some(timeout) = self.request_timeout {
            config.request_timeout_secs = Some(timeout);
        }
        config
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show roles or bindings as tables, or query API discovery
    Show {
        #[command(subcommand)]
        target: ShowTarget,
    },

    /// Get the per-account view, on screen or as CSV
    Get {
        #[command(subcommand)]
        target: GetTarget,
    },

    /// Print the tool version
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ShowTarget {
    /// Namespaced roles with their consolidated rules
    #[command(name = "role")]
    Role(ShowArgs),

    /// Role bindings, one row per subject
    #[command(name = "rolebinding")]
    RoleBinding(ShowArgs),

    /// Cluster roles with their consolidated rules
    #[command(name = "clusterrole")]
    ClusterRole(ShowArgs),

    /// Cluster role bindings
    #[command(name = "clusterrolebinding")]
    ClusterRoleBinding(ClusterBindingArgs),

    /// KubeSphere roles and bindings
    #[command(name = "kubesphere")]
    KubeSphere {
        #[command(subcommand)]
        target: KubeSphereTarget,
    },

    /// Kinds served by the core API group (an empty apiGroups entry)
    #[command(name = "core")]
    Core,

    /// Verbs served by the cluster's API resources
    #[command(name = "verbs")]
    Verbs,
}

#[derive(Debug, Subcommand)]
pub enum KubeSphereTarget {
    /// Workspace roles
    #[command(name = "workspacerole")]
    WorkspaceRole(ShowArgs),

    /// Workspace role bindings
    #[command(name = "workspacerolebinding")]
    WorkspaceRoleBinding(ShowArgs),

    /// Global roles
    #[command(name = "globalrole")]
    GlobalRole(ShowArgs),

    /// Global role bindings
    #[command(name = "globalrolebinding")]
    GlobalRoleBinding(ShowArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ShowArgs {
    /// Hide platform-managed roles and bindings
    #[arg(long)]
    pub nosys: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ClusterBindingArgs {
    #[command(flatten)]
    pub show: ShowArgs,

    /// Append owner references
    #[arg(short, long, visible_alias = "ext")]
    pub extended: bool,
}

#[derive(Debug, Subcommand)]
pub enum GetTarget {
    /// Accounts and the roles they are bound to
    #[command(name = "user")]
    User(UserArgs),

    /// Save the account view as CSV
    #[command(name = "csv")]
    Csv {
        #[command(subcommand)]
        target: CsvTarget,
    },
}

#[derive(Debug, Subcommand)]
pub enum CsvTarget {
    /// Accounts and the roles they are bound to
    #[command(name = "user")]
    User(CsvUserArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct UserArgs {
    /// Attach the rules of each bound role
    #[arg(long)]
    pub more: bool,

    /// Include service accounts
    #[arg(long)]
    pub service: bool,

    /// Only collect these binding kinds: rolebinding, clusterrolebinding,
    /// workspacerolebinding, globalrolebinding (comma separated)
    #[arg(long, num_args = 1.., value_name = "KINDS")]
    pub only: Vec<String>,
}

impl UserArgs {
    /// The binding categories named by `--only`; empty means all.
    pub fn categories(&self) -> Result<BTreeSet<BindingCategory>> {
        parse_categories(&self.only)
    }

    /// Resolver options for these arguments.
    pub fn resolve_options(&self) -> Result<ResolveOptions> {
        Ok(ResolveOptions::new()
            .with_service_accounts(self.service)
            .only(self.categories()?))
    }

    /// Check if any KubeSphere binding category was asked for by name.
    pub fn names_kubesphere(&self) -> Result<bool> {
        Ok(self.categories()?.iter().any(|c| {
            matches!(
                c,
                BindingCategory::WorkspaceRoleBinding | BindingCategory::GlobalRoleBinding
            )
        }))
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct CsvUserArgs {
    #[command(flatten)]
    pub user: UserArgs,

    /// Output file (default: userList.csv, or userListExtended.csv with --more)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Parse `--only` values.
///
/// Values may be split across arguments and commas (`rolebinding,
/// clusterrolebinding` arrives as two arguments); blanks are ignored.
pub fn parse_categories<S: AsRef<str>>(values: &[S]) -> Result<BTreeSet<BindingCategory>> {
    let mut categories = BTreeSet::new();
    for value in values.iter().flat_map(|v| v.as_ref().split(',')) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match BindingCategory::parse(value) {
            Some(category) => {
                categories.insert(category);
            }
            None => bail!(
                "Invalid value for --only: '{value}' (expected one of: {})",
                BindingCategory::all().map(|c| c.as_str()).join(", ")
            ),
        }
    }
    Ok(categories)
}
