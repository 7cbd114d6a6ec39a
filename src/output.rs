//! CLI output formatting.
//!
//! The rendered fragment goes to stdout so it can be redirected into a page;
//! the human summary goes to stderr:
//!
//! ```text
//! Feed: 12 posts (fetched)
//!     Cache: substack_posts in .pagekit-state/
//! ```
//!
//! `format_*` functions are pure and return lines; `print_*` wrappers do the
//! writing.

use crate::loader::LoadOutcome;
use std::path::Path;

/// Summary of one feed load.
pub fn format_load_outcome(outcome: LoadOutcome, cache_key: &str, state_dir: &Path) -> Vec<String> {
    let mut lines = vec![format!("Feed: {outcome}")];
    match outcome {
        LoadOutcome::Failed => {
            lines.push("    Cache: not written".to_string());
        }
        LoadOutcome::Fetched { cached: false, .. } => {
            lines.push(format!("    Cache: {cache_key} not written (store rejected it)"));
        }
        LoadOutcome::Cached(_) | LoadOutcome::Fetched { cached: true, .. } => {
            lines.push(format!(
                "    Cache: {} in {}/",
                cache_key,
                state_dir.display()
            ));
        }
    }
    lines
}

pub fn print_load_outcome(outcome: LoadOutcome, cache_key: &str, state_dir: &Path) {
    for line in format_load_outcome(outcome, cache_key, state_dir) {
        eprintln!("{}", line);
    }
}
