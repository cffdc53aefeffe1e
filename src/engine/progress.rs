//! Progress bar utilities for displaying processing status

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Update the bar's total (e.g. once the walk has counted its candidates). Refreshes the display.
pub fn set_bar_total(pb: &ProgressBar, total: usize) {
    if let Ok(mut bar) = pb.lock() {
        bar.total = total;
        let _ = bar.refresh();
    }
}

/// Configuration for creating a progress bar
pub struct ProgressBarConfig {
    pub total: usize,
    pub desc: &'static str,
    pub animation: Animation,
}

impl ProgressBarConfig {
    pub fn new(total: usize, desc: &'static str, animation: Animation) -> Self {
        Self {
            total,
            desc,
            animation,
        }
    }
}

pub fn create_progress_bar(config: ProgressBarConfig) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = config.total,
        desc = config.desc,
        animation = config.animation,
        unit = " files"
    )))
}

/// Progress bar when `verbose`, otherwise nothing.
pub fn optional_bar(verbose: bool, total: usize, desc: &'static str) -> Option<ProgressBar> {
    verbose.then(|| create_progress_bar(ProgressBarConfig::new(total, desc, Animation::Classic)))
}

/// Update progress bar if available.
/// Uses try_lock so parallel workers never block on the display.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Final redraw so the bar ends at its real count.
pub fn finish_bar(pb: &Option<ProgressBar>, done: usize) {
    if let Some(pb) = pb
        && let Ok(mut bar) = pb.lock()
    {
        let _ = bar.update_to(done);
        eprintln!();
    }
}
