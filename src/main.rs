use clap::Parser;
use colored::*;
use std::process;
use tophits::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Initialize logging with TOPHITS_LOG environment variable support
    let default_level = if cli.verbose > 0 { "debug" } else { "info" };
    let log_level = std::env::var("TOPHITS_LOG").unwrap_or_else(|_| default_level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&log_level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<tophits::TopHitsError>() {
            Some(tophits::TopHitsError::Config(_)) => 2,
            Some(tophits::TopHitsError::MissingSource(_)) | Some(tophits::TopHitsError::Io(_)) => 3,
            Some(tophits::TopHitsError::MalformedFasta { .. })
            | Some(tophits::TopHitsError::MalformedTable { .. }) => 4,
            Some(tophits::TopHitsError::OutputDirectory { .. }) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Extract(mut args) => {
            args.threads = cli.threads;
            tophits::cli::commands::extract::run(args)
        }
        Commands::Rename(args) => tophits::cli::commands::rename::run(args),
    }
}
