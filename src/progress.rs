use std::io::{IsTerminal, stderr};
use std::path::Path;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::config::Config;

const SCAN_BAR_TEMPLATE: &str =
    "SCAN [{bar:40}] {pos:>4}/{len:<4} | {elapsed_precise} | {msg}";

fn ellipsize(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut shortened = String::new();
    for ch in input.chars().take(keep) {
        shortened.push(ch);
    }
    shortened.push_str("...");
    shortened
}

/// Progress over the classification pass. Renders only when stderr is a
/// terminal and the run is not quiet; otherwise every call is a no-op.
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new(config: &Config, total: usize) -> Self {
        if config.quiet > 0 || !stderr().is_terminal() {
            return Self { bar: None };
        }

        let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template(SCAN_BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }

        Self { bar: Some(bar) }
    }

    pub fn tick(&self, path: &Path) {
        if let Some(bar) = &self.bar {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                bar.set_message(ellipsize(name, 40));
            }
            bar.inc(1);
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
