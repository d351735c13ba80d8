//! CrossRef command

use crate::app::{CrossrefArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use docmeta_core::{Config, CrossRefExtractor, DocumentExtractor};

pub async fn run(args: CrossrefArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let extractor = CrossRefExtractor::from_config(&args.doi, config).await?;
    let record = extractor.extract().await?;

    print!("{}", output::format_record(record.as_ref(), format));

    if args.upload {
        if let Some(ref record) = record {
            super::upload(record, config).await?;
        }
    }
    Ok(())
}
