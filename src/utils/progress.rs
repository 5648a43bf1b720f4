//! Download progress reporting.
//!
//! Progress bars are hidden when `ASSETSYNC_NO_PROGRESS` is set or stdout is
//! not a terminal, so build logs and CI output stay clean.

use crate::constants::NO_PROGRESS_ENV;
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};
use std::io::IsTerminal;

fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some() || !std::io::stdout().is_terminal()
}

fn bytes_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ")
}

fn unknown_length_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} {msg} {bytes} ({bytes_per_sec})")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Byte-counting progress for a streamed download.
#[derive(Clone)]
pub struct DownloadProgress {
    inner: IndicatifBar,
}

impl DownloadProgress {
    /// Create a bar for `total` bytes, or a counter when the length is unknown.
    pub fn new(total: Option<u64>, message: impl Into<String>) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            match total {
                Some(len) => {
                    let bar = IndicatifBar::new(len);
                    bar.set_style(bytes_style());
                    bar
                }
                None => {
                    let bar = IndicatifBar::new_spinner();
                    bar.set_style(unknown_length_style());
                    bar
                }
            }
        };
        bar.set_message(message.into());
        Self {
            inner: bar,
        }
    }

    /// A bar that never draws.
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}
