//! assetsync - vendored release sync and UI asset versioning
//!
//! assetsync is part of the build tooling of an instrumentation library that
//! ships a browser UI. It has two jobs:
//!
//! - Keep a vendored third-party visualization bundle in sync with the
//!   latest packaged release of its upstream project, preserving local
//!   additions listed in a kept-file manifest
//! - Rebuild the UI bundle (compiled templates plus a static script) and the
//!   asset version token the host application uses for cache invalidation
//!
//! # Architecture Overview
//!
//! ```text
//! upgrade pipeline:  release -> vendor (keep, archive, rewrite, marker, swap)
//! build pipeline:    templating -> bundle -> assets
//! ```
//!
//! # Core Modules
//!
//! ## Upgrade
//! - [`release`] - Latest-release lookup and redirect-based artifact download
//! - [`vendor`] - Staged replacement of the vendor directory
//!
//! ## Build
//! - [`templating`] - Dot-template extraction and compilation
//! - [`bundle`] - Generated vendor script
//! - [`assets`] - Asset version token and version-constant file
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface
//! - [`config`] - `assetsync.toml` loading and defaults
//! - [`constants`] - Built-in defaults and media types
//! - [`core`] - Error types and user-facing diagnostics
//! - [`pipeline`] - Pipeline orchestration
//! - [`utils`] - Atomic writes, directory copies, progress bars
//!
//! # Configuration (assetsync.toml)
//!
//! ```toml
//! [upstream]
//! owner = "jlfwong"
//! repo = "speedscope"
//!
//! [vendor]
//! dir = "lib/html/speedscope"
//!
//! [build]
//! asset_dir = "lib/html"
//! ```
//!
//! Every field is optional. See [`config`] for the full format.
//!
//! # Command-Line Usage
//!
//! ```bash
//! assetsync vendor --check   # is a newer upstream release available?
//! assetsync vendor           # install it
//! assetsync build            # rebuild vendor.js and the asset version
//! ```

pub mod assets;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod pipeline;
pub mod release;
pub mod templating;
pub mod utils;
pub mod vendor;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
