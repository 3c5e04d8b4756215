use std::path::Path;

use super::convert::BatchReport;
use crate::error::ConvertError;

/// Receives progress events from a batch conversion.
///
/// All methods default to doing nothing so implementors only override what they use.
pub trait ProgressObserver {
    /// Called once the source directory has been listed, before any file is converted.
    fn on_start(&mut self, _split: &str, _discovered: usize) {}

    /// Called after each file, whatever its outcome. `processed` is 1-based.
    fn on_file_processed(&mut self, _split: &str, _processed: usize, _total: usize) {}

    /// Called when a file could not be converted.
    fn on_file_failed(&mut self, _split: &str, _path: &Path, _error: &ConvertError) {}

    fn on_finish(&mut self, _report: &BatchReport) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressObserver for SilentProgress {}

/// Logs a progress line every `interval` files.
#[derive(Debug, Clone, Copy)]
pub struct LogProgress {
    pub interval: usize,
}

impl LogProgress {
    pub fn every(interval: usize) -> Self {
        Self { interval }
    }
}

impl ProgressObserver for LogProgress {
    fn on_start(&mut self, split: &str, discovered: usize) {
        tracing::info!("Found {} descriptor files for {} split", discovered, split);
        tracing::info!("Converting {} files...", split);
    }

    fn on_file_processed(&mut self, split: &str, processed: usize, total: usize) {
        if self.interval > 0 && processed % self.interval == 0 {
            tracing::info!("  Processed {}/{} {} files", processed, total, split);
        }
    }

    fn on_finish(&mut self, report: &BatchReport) {
        tracing::info!(
            split = %report.split,
            discovered = report.discovered,
            converted = report.converted,
            verified = report.verified,
            "Split conversion finished"
        );
    }
}
