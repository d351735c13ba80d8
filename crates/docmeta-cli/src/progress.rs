//! Progress reporting for directory scans

use std::io::{self, Write};

/// Single-line progress on stderr
pub struct ProgressReporter {
    total: usize,
    processed: usize,
    failed: usize,
}

impl ProgressReporter {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            failed: 0,
        }
    }

    pub fn set_message(&self, msg: &str) {
        eprint!("\r[{}/{}] {:<50}", self.processed + 1, self.total, msg);
        io::stderr().flush().ok();
    }

    pub fn increment(&mut self, ok: bool) {
        self.processed += 1;
        if !ok {
            self.failed += 1;
        }
    }

    pub fn finish(&self) {
        eprintln!(
            "\rDone ({}/{}, {} failed)                    ",
            self.processed, self.total, self.failed
        );
    }
}
