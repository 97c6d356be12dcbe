//! Progress reporting for the decomposition phase

use indicatif::{ProgressBar, ProgressStyle};
use ptprune_core::ProgressSink;
use std::time::Duration;

/// Progress bar over phrase pairs, fed by the core worker threads
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(quiet: bool) -> Self {
        Self {
            progress_bar: (!quiet).then(|| {
                let pb = ProgressBar::new(0);
                let style = ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} pairs {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-");
                pb.set_style(style);
                pb
            }),
        }
    }

    /// Whether a bar is shown at all
    pub fn is_enabled(&self) -> bool {
        self.progress_bar.is_some()
    }
}

impl ProgressSink for ProgressReporter {
    fn start(&self, total: u64) {
        if let Some(pb) = &self.progress_bar {
            pb.set_length(total);
            pb.set_message("decomposing");
            pb.enable_steady_tick(Duration::from_millis(100));
        }
    }

    fn advance(&self, done: u64) {
        if let Some(pb) = &self.progress_bar {
            pb.inc(done);
        }
    }

    fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message("done");
        }
    }
}
