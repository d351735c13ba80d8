//! JSON output formatter

use docmeta_core::{ExtractedRecord, ScanResult};

pub fn format_record(record: Option<&ExtractedRecord>) -> String {
    serde_json::to_string_pretty(&record).unwrap_or_else(|_| "null".to_string()) + "\n"
}

pub fn format_scan(results: &[ScanResult]) -> String {
    serde_json::to_string_pretty(results).unwrap_or_else(|_| "[]".to_string()) + "\n"
}
