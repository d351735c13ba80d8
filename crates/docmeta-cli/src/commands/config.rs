//! Config command

use crate::app::{ConfigAction, ConfigArgs, OutputFormat};
use anyhow::Result;
use docmeta_core::Config;

const MASK: &str = "********";

pub fn run(args: ConfigArgs, config: &Config, format: OutputFormat) -> Result<()> {
    match args.action {
        ConfigAction::Show => show(config, format),
        ConfigAction::Path => {
            println!("{}", Config::default_path().display());
            Ok(())
        }
        ConfigAction::Init => init(),
    }
}

fn show(config: &Config, format: OutputFormat) -> Result<()> {
    let mut masked = config.clone();
    if masked.llm.api_key.is_some() {
        masked.llm.api_key = Some(MASK.to_string());
    }
    if let Some(store) = masked.table_store.as_mut() {
        if store.password.is_some() {
            store.password = Some(MASK.to_string());
        }
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&masked)?),
        OutputFormat::Cli => print!("{}", serde_yaml::to_string(&masked)?),
    }
    Ok(())
}

fn init() -> Result<()> {
    let path = Config::default_path();
    if path.exists() {
        eprintln!("Config already exists at {}", path.display());
        return Ok(());
    }
    Config::default().save()?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
