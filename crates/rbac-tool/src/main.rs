use clap::Parser;
use rbac_tool::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "RBAC_TOOL_LOG";

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let stdout = std::io::stdout();
    match rbac_tool::run(&cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e:#}");
            if let Some(source) = e.downcast_ref::<rbac_source::SourceError>() {
                if source.is_command_failure() {
                    eprintln!("Hint: check that kubectl can reach the cluster, or use --from-dir");
                }
            }
            ExitCode::FAILURE
        }
    }
}
