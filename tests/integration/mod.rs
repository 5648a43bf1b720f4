//! Integration test suite for assetsync
//!
//! End-to-end tests of both pipelines and of the `assetsync` binary. Upstream
//! HTTP traffic is served by a local `httpmock` server; nothing touches the
//! network.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **upgrade**: Release lookup, download and vendor directory replacement
//! - **build**: Template compilation, bundle and asset version
//! - **cli**: Exit codes and output of the binary

#[path = "../common/mod.rs"]
mod common;

mod cli;
mod upgrade;
