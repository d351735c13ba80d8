//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use docmeta_core::{ExtractedRecord, ScanResult};

/// Format one extraction outcome
pub fn format_record(record: Option<&ExtractedRecord>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_record(record),
        OutputFormat::Cli => terminal::format_record(record),
    }
}

/// Format the outcomes of a directory scan
pub fn format_scan(results: &[ScanResult], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_scan(results),
        OutputFormat::Cli => terminal::format_scan(results),
    }
}
