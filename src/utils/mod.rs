//! Filesystem and terminal helpers.
//!
//! - [`fs`] - Atomic writes, recursive copy and removal
//! - [`progress`] - Download progress bars

pub mod fs;
pub mod progress;

pub use fs::{atomic_write, copy_dir, copy_entry, ensure_dir, remove_entry, safe_write};
pub use progress::DownloadProgress;
