//! Extract command

use crate::app::{ExtractArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use docmeta_core::{pipeline, Config};

pub async fn run(args: ExtractArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let record =
        pipeline::extract_document(&args.file, args.doi.as_deref(), args.backend.into(), config)
            .await?;

    print!("{}", output::format_record(record.as_ref(), format));

    if args.upload {
        match record {
            Some(ref record) => super::upload(record, config).await?,
            None => eprintln!("Nothing to upload"),
        }
    }
    Ok(())
}
