//! CLI command handlers

pub mod config;
pub mod crossref;
pub mod extract;
pub mod scan;

use docmeta_core::{Config, ExtractedRecord, TableSink};

/// Append `record` to the configured table store
pub(crate) async fn upload(record: &ExtractedRecord, config: &Config) -> anyhow::Result<()> {
    let sink = TableSink::from_config(config.require_table_store()?)?;
    sink.upload(record).await?;
    eprintln!("Uploaded record to table store");
    Ok(())
}
