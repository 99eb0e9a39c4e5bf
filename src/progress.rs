//! Progress bar display for artifact fetches and uploads

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress display for a fixed number of artifacts
pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    /// Create a progress bar drawn on stderr
    pub fn new(total: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bar = ProgressBar::new(total);
        bar.set_style(style);
        Self { bar }
    }

    /// A progress display that draws nothing
    #[cfg(test)]
    pub fn hidden(total: u64) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::hidden());
        Self { bar }
    }

    /// Show the artifact currently being processed
    pub fn start(&self, item: &str) {
        // Keep long URLs readable
        let length = item.chars().count();
        let display = if length > 50 {
            let tail: String = item.chars().skip(length - 47).collect();
            format!("...{tail}")
        } else {
            item.to_string()
        };
        self.bar.set_message(display);
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("done");
    }

    /// Abandon on error
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}
