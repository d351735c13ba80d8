//! Scan command

use crate::app::{OutputFormat, ScanArgs};
use crate::output;
use crate::progress::ProgressReporter;
use anyhow::Result;
use docmeta_core::{pipeline, Config, ScanEvent};

pub async fn run(args: ScanArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let pattern = args.pattern.as_deref().unwrap_or(&config.pipeline.pattern);

    let mut progress: Option<ProgressReporter> = None;
    let results = pipeline::scan(
        &args.dir,
        pattern,
        args.backend.into(),
        config,
        &mut |event| match event {
            ScanEvent::Found(0) => {}
            ScanEvent::Found(total) => progress = Some(ProgressReporter::new(total)),
            ScanEvent::Started(path) => {
                if let Some(ref progress) = progress {
                    progress.set_message(&path.display().to_string());
                }
            }
            ScanEvent::Finished(result) => {
                if let Some(ref mut progress) = progress {
                    progress.increment(result.error.is_none());
                }
            }
        },
    )
    .await?;

    let Some(progress) = progress else {
        eprintln!("No documents matching {} in {}", pattern, args.dir.display());
        return Ok(());
    };
    progress.finish();

    if args.upload {
        for result in &results {
            if let Some(ref record) = result.record {
                if let Err(e) = super::upload(record, config).await {
                    tracing::warn!("Upload of {} failed: {}", result.path.display(), e);
                }
            }
        }
    }

    print!("{}", output::format_scan(&results, format));
    Ok(())
}
