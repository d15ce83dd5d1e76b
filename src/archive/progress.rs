//! Progress bar for archive runs.

use indicatif::{ProgressBar, ProgressStyle};

/// Item-level progress of a run.
///
/// The total is advisory (summed from collection item counts), so the
/// position may legitimately end above or below it.
#[derive(Debug, Clone)]
pub struct ArchiveProgress {
    bar: ProgressBar,
}

impl ArchiveProgress {
    /// Creates a progress tracker for `total` items, drawn on stderr when `visible`.
    #[must_use]
    pub fn new(total: u64, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(total)
        } else {
            let bar = ProgressBar::hidden();
            bar.set_length(total);
            bar
        };
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner} [{elapsed_precise}] {wide_bar} {pos}/{len} items ({per_sec})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }

    /// Records one archived item.
    pub fn advance(&self) {
        self.bar.inc(1);
    }

    /// Items archived so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// The advisory total.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.bar.length().unwrap_or(0)
    }

    /// Closes out the bar.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
