//! Command execution.
//!
//! Every command that renders records loads the complete snapshot first.
//! Output is built in memory and written only after loading and
//! resolution have succeeded, so a failed run prints no partial table.

use anyhow::{Context as _, Result};
use rbac_model::{resolve, resolve_with_rules, AccountRecord, SystemFilter};
use rbac_source::{
    ClusterSnapshot, DirectorySource, Discovery, KubectlSource, RecordSource, ResourceKind,
    SourceConfig, SourceResult,
};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::cli::{Cli, ClusterBindingArgs, Command, CsvTarget, GetTarget, KubeSphereTarget, ShowArgs, ShowTarget, UserArgs};
use crate::export;
use crate::render;

/// Where records come from for this run.
#[derive(Debug, Clone)]
pub enum Source {
    /// A live cluster through kubectl.
    Kubectl(KubectlSource),
    /// An exported snapshot directory.
    Directory(DirectorySource),
}

impl Source {
    /// Pick the source: a snapshot directory when given, kubectl otherwise.
    pub fn new(config: SourceConfig, from_dir: Option<PathBuf>) -> Result<Self> {
        match from_dir {
            Some(dir) => Ok(Source::Directory(DirectorySource::new(dir))),
            None => Ok(Source::Kubectl(KubectlSource::new(config)?)),
        }
    }
}

impl RecordSource for Source {
    fn fetch_raw(&self, kind: ResourceKind) -> SourceResult<Vec<u8>> {
        match self {
            Source::Kubectl(source) => source.fetch_raw(kind),
            Source::Directory(source) => source.fetch_raw(kind),
        }
    }
}

impl Discovery for Source {
    fn core_kinds(&self) -> SourceResult<Vec<String>> {
        match self {
            Source::Kubectl(source) => source.core_kinds(),
            Source::Directory(source) => source.core_kinds(),
        }
    }

    fn verbs(&self) -> SourceResult<BTreeSet<String>> {
        match self {
            Source::Kubectl(source) => source.verbs(),
            Source::Directory(source) => source.verbs(),
        }
    }
}

/// Everything a command needs besides its own arguments.
pub struct Runner<S> {
    /// Record source.
    pub source: S,
    /// Names hidden by `--nosys`.
    pub system_filter: SystemFilter,
    /// Whether KubeSphere data was asked for globally.
    pub kubesphere: bool,
}

impl<S: RecordSource + Discovery> Runner<S> {
    /// Create a runner.
    pub fn new(source: S, system_filter: SystemFilter, kubesphere: bool) -> Self {
        Self {
            source,
            system_filter,
            kubesphere,
        }
    }

    fn load(&self, kubesphere: bool) -> Result<ClusterSnapshot> {
        ClusterSnapshot::load(&self.source, self.kubesphere || kubesphere)
            .context("Failed to load RBAC records")
    }

    fn filter<'a>(&'a self, args: &ShowArgs) -> Option<&'a SystemFilter> {
        args.nosys.then_some(&self.system_filter)
    }

    /// Run a command, writing its output to `out`.
    pub fn execute<W: Write>(&self, command: &Command, out: &mut W) -> Result<()> {
        let rendered = match command {
            Command::Version => version_line(),
            Command::Show { target } => self.show(target)?,
            Command::Get {
                target: GetTarget::User(args),
            } => {
                let accounts = self.accounts(args)?;
                render::accounts_table(&accounts, args.more).render()
            }
            Command::Get {
                target: GetTarget::Csv {
                    target: CsvTarget::User(args),
                },
            } => {
                let accounts = self.accounts(&args.user)?;
                let path = args
                    .output
                    .clone()
                    .unwrap_or_else(|| export::default_file_name(args.user.more));
                let records = export::save_accounts(&path, &accounts, args.user.more)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), records, "Saved account list");
                format!("Saved {records} records to {}\n", path.display())
            }
        };
        out.write_all(rendered.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn show(&self, target: &ShowTarget) -> Result<String> {
        let table = match target {
            ShowTarget::Core => {
                let kinds = self.source.core_kinds().context("Failed to list core API resources")?;
                let mut text = String::from(
                    "# Kinds served by the core API group, which an empty \"apiGroups\" entry refers to\n\n",
                );
                for kind in kinds {
                    text.push_str(&kind);
                    text.push('\n');
                }
                return Ok(text);
            }
            ShowTarget::Verbs => {
                let verbs = self.source.verbs().context("Failed to list API resource verbs")?;
                let mut text = String::from("# Verbs served by the cluster's API resources\n\n");
                for verb in verbs {
                    text.push_str(&verb);
                    text.push('\n');
                }
                return Ok(text);
            }
            ShowTarget::Role(args) => {
                let snapshot = self.load(false)?;
                render::roles_table(&snapshot.roles, self.filter(args))
            }
            ShowTarget::RoleBinding(args) => {
                let snapshot = self.load(false)?;
                render::role_bindings_table(&snapshot.role_bindings, self.filter(args))
            }
            ShowTarget::ClusterRole(args) => {
                let snapshot = self.load(false)?;
                render::cluster_roles_table(&snapshot.cluster_roles, self.filter(args))
            }
            ShowTarget::ClusterRoleBinding(ClusterBindingArgs { show, extended }) => {
                let snapshot = self.load(false)?;
                render::cluster_role_bindings_table(
                    &snapshot.cluster_role_bindings,
                    self.filter(show),
                    *extended,
                )
            }
            ShowTarget::KubeSphere { target } => {
                let snapshot = self.load(true)?;
                match target {
                    KubeSphereTarget::WorkspaceRole(args) => {
                        render::roles_table(&snapshot.workspace_roles, self.filter(args))
                    }
                    KubeSphereTarget::WorkspaceRoleBinding(args) => {
                        render::role_bindings_table(&snapshot.workspace_role_bindings, self.filter(args))
                    }
                    KubeSphereTarget::GlobalRole(args) => {
                        render::cluster_roles_table(&snapshot.global_roles, self.filter(args))
                    }
                    KubeSphereTarget::GlobalRoleBinding(args) => {
                        render::role_bindings_table(&snapshot.global_role_bindings, self.filter(args))
                    }
                }
            }
        };
        debug!(rows = table.data_rows(), "Rendered table");
        Ok(table.render())
    }

    /// Resolve the account view for `get user` and `get csv user`.
    pub fn accounts(&self, args: &UserArgs) -> Result<Vec<AccountRecord>> {
        let options = args.resolve_options()?;
        let snapshot = self.load(args.names_kubesphere()?)?;
        let accounts = if args.more {
            resolve_with_rules(&snapshot.bindings(), &snapshot.catalog(), &options)
        } else {
            resolve(&snapshot.bindings(), &options)
        };
        debug!(accounts = accounts.len(), more = args.more, "Resolved accounts");
        Ok(accounts)
    }
}

fn version_line() -> String {
    format!("RBAC Tool Version: {}\n", env!("CARGO_PKG_VERSION"))
}

/// Build the runner from the environment and the command line, then run.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    if let Command::Version = cli.command {
        out.write_all(version_line().as_bytes())?;
        return Ok(());
    }

    let config = cli.global.apply(SourceConfig::from_env()?);
    config.validate()?;
    let system_filter = config.system_filter();
    let source = Source::new(config, cli.global.from_dir.clone())?;
    debug!(source = ?source, "Selected record source");

    Runner::new(source, system_filter, cli.global.kubesphere).execute(&cli.command, out)
}
