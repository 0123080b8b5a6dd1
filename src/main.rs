use clap::Parser;
use genofile::cli::{Cli, Commands};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Initialize logging with GENOFILE_LOG environment variable support;
    // --verbose overrides both environment variables
    let log_level =
        genofile::cli::log_directive(cli.verbose, std::env::var("GENOFILE_LOG").ok());
    let filter = if cli.verbose > 0 {
        EnvFilter::new(&log_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");

        let exit_code = match e.downcast_ref::<genofile::GenofileError>() {
            Some(genofile::GenofileError::Validation(_)) => 2,
            Some(genofile::GenofileError::Io(_)) => 3,
            Some(genofile::GenofileError::Serde(_))
            | Some(genofile::GenofileError::Render { .. }) => 4,
            Some(genofile::GenofileError::SizeExceeded { .. }) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Migrate(args) => genofile::cli::commands::migrate::run(args),
        Commands::Export(args) => genofile::cli::commands::export::run(args),
    }
}
