use log::{debug, warn};

use super::context::SkippedPaths;

/// Log walk errors collected by the walk thread. Call after joining walk and workers.
/// Returns how many paths were skipped.
pub fn report_skipped_paths(skipped_paths: &SkippedPaths, verbose: bool) -> usize {
    let skipped = skipped_paths.lock().unwrap_or_else(|e| e.into_inner());
    if !skipped.is_empty() {
        warn!(
            "Skipped {} paths due to permission errors or access issues",
            skipped.len()
        );
        if verbose {
            for (p, msg) in skipped.iter() {
                debug!("  skipped: {} ({})", p.display(), msg);
            }
        }
    }
    skipped.len()
}
