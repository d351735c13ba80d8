//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use docmeta_core::BackendChoice;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docmeta")]
#[command(
    author,
    version,
    about = "Extract bibliographic metadata from scholarly documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract metadata from one document
    Extract(ExtractArgs),

    /// Extract metadata straight from CrossRef by DOI
    Crossref(CrossrefArgs),

    /// Extract metadata from every document in a directory
    Scan(ScanArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ExtractArgs {
    /// PDF, Markdown or text file
    pub file: PathBuf,

    /// DOI of the document, skipping discovery
    #[arg(long)]
    pub doi: Option<String>,

    /// Extraction backend
    #[arg(long, value_enum, default_value = "auto")]
    pub backend: BackendArg,

    /// Append the record to the configured table store
    #[arg(long)]
    pub upload: bool,
}

#[derive(Args)]
pub struct CrossrefArgs {
    /// DOI to look up
    pub doi: String,

    /// Append the record to the configured table store
    #[arg(long)]
    pub upload: bool,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Directory to scan
    pub dir: PathBuf,

    /// Glob pattern relative to the directory
    #[arg(long)]
    pub pattern: Option<String>,

    /// Extraction backend
    #[arg(long, value_enum, default_value = "auto")]
    pub backend: BackendArg,

    /// Append every record to the configured table store
    #[arg(long)]
    pub upload: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration, secrets masked
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file if none exists
    Init,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BackendArg {
    Auto,
    Crossref,
    Llm,
}

impl From<BackendArg> for BackendChoice {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Auto => BackendChoice::Auto,
            BackendArg::Crossref => BackendChoice::CrossRef,
            BackendArg::Llm => BackendChoice::Llm,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
