//! # RBAC Tool
//!
//! Command line front end over [`rbac_model`] and [`rbac_source`].
//!
//! ## Commands
//!
//! ```text
//! rbac-tool show role|rolebinding|clusterrole [--nosys]
//! rbac-tool show clusterrolebinding [--nosys] [--extended]
//! rbac-tool show kubesphere workspacerole|workspacerolebinding|globalrole|globalrolebinding [--nosys]
//! rbac-tool show core|verbs
//! rbac-tool get user [--more] [--service] [--only rolebinding,clusterrolebinding,...]
//! rbac-tool get csv user [same options as get user] [--output FILE]
//! rbac-tool version
//! ```
//!
//! Global options select the data source (`--from-dir`, `--context`,
//! `--kubeconfig`, `--kubectl`, `--request-timeout`), KubeSphere loading
//! (`--kubesphere`) and logging (`--verbose`).

pub mod app;
pub mod cli;
pub mod export;
pub mod render;
pub mod table;

pub use app::{run, Runner, Source};
pub use cli::Cli;
