//! Progress feedback for batch runs.
//!
//! Bars are drawn on stderr with `indicatif` and are hidden entirely in
//! quiet mode (`--quiet` or `COURSEMAP_QUIET`) and when stderr is not a TTY,
//! so piped output and CI logs stay clean.
//!
//! ```rust,no_run
//! use coursemap::progress::{ProgressConfig, ProgressManager, TEMPLATE_BATCH};
//!
//! let manager = ProgressManager::new(ProgressConfig::from_env(false, 0));
//! let bar = manager.create_bar(10, TEMPLATE_BATCH);
//! bar.set_message("Transforming");
//! bar.inc(1);
//! bar.finish_and_clear();
//! ```

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;

pub const TEMPLATE_BATCH: &str = "📚 {msg} [{bar:30}] {pos}/{len} files ({percent}%) - {eta}";

#[derive(Debug, Clone, Default)]
pub struct ProgressConfig {
    /// Suppress all progress output
    pub quiet_mode: bool,
    /// Verbosity level (0 = basic, 1 = detailed, 2 = very detailed)
    pub verbosity: u8,
}

impl ProgressConfig {
    pub fn from_env(quiet: bool, verbosity: u8) -> Self {
        let env_quiet = std::env::var("COURSEMAP_QUIET").is_ok();
        Self {
            quiet_mode: quiet || env_quiet,
            verbosity,
        }
    }

    pub fn should_show_progress(&self) -> bool {
        if self.quiet_mode {
            return false;
        }
        use std::io::IsTerminal;
        std::io::stderr().is_terminal()
    }
}

#[derive(Clone)]
pub struct ProgressManager {
    multi: Arc<MultiProgress>,
    config: ProgressConfig,
}

impl ProgressManager {
    pub fn new(config: ProgressConfig) -> Self {
        Self {
            multi: Arc::new(MultiProgress::new()),
            config,
        }
    }

    /// A bar of `len` steps, or a hidden bar when progress is not shown.
    pub fn create_bar(&self, len: u64, template: &str) -> ProgressBar {
        if !self.config.should_show_progress() {
            return ProgressBar::hidden();
        }

        let pb = self.multi.add(ProgressBar::new(len));
        let style = ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  ");
        pb.set_style(style);
        pb
    }

    /// Remove every bar before printing final output.
    pub fn clear(&self) {
        let _ = self.multi.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_mode_hides_bars() {
        let manager = ProgressManager::new(ProgressConfig {
            quiet_mode: true,
            verbosity: 0,
        });
        assert!(manager.create_bar(5, TEMPLATE_BATCH).is_hidden());
    }
}
