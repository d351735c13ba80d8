//! Docmeta CLI
//!
//! Bibliographic metadata extraction for scholarly documents.

use clap::Parser;
use docmeta_core::{error::exit_codes, Config, DocMetaError};

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<DocMetaError>()
            .map(DocMetaError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?;

    match cli.command {
        Commands::Extract(args) => commands::extract::run(args, &config, cli.format).await,
        Commands::Crossref(args) => commands::crossref::run(args, &config, cli.format).await,
        Commands::Scan(args) => commands::scan::run(args, &config, cli.format).await,
        Commands::Config(args) => commands::config::run(args, &config, cli.format),
    }
}
