//! Command-line interface for assetsync.
//!
//! # Commands
//!
//! - `vendor` - Sync the vendored library with its latest upstream release
//! - `build` - Compile templates, write the bundle and the asset version
//! - `version` - Recompute only the asset version
//! - `rewrite` - Re-apply the rewrite rules to the vendor directory
//!
//! # Global Options
//!
//! - `--verbose` - Debug logging
//! - `--quiet` - Suppress everything except errors
//! - `--config <PATH>` - Use this configuration file instead of `./assetsync.toml`
//! - `--no-progress` - Never draw progress bars
//!
//! # Logging
//!
//! `RUST_LOG` takes precedence over the verbosity flags:
//!
//! ```bash
//! RUST_LOG=assetsync_cli::release=debug assetsync vendor
//! ```

mod build;
mod rewrite;
mod vendor;
mod version;

use crate::config::ProjectConfig;
use crate::pipeline::PipelineOptions;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter when `RUST_LOG` is unset. `None` disables logging.
    pub log_level: Option<String>,
    pub no_progress: bool,
    pub quiet: bool,
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Install the global tracing subscriber. Later calls are no-ops.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if let Some(level) = &self.log_level {
            EnvFilter::new(level)
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    #[must_use]
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            quiet: self.quiet,
            show_progress: !self.no_progress && !self.quiet,
        }
    }
}

/// Release sync and asset build tool.
#[derive(Parser)]
#[command(
    name = "assetsync",
    about = "Sync a vendored UI library and rebuild versioned UI assets",
    version,
    author,
    long_about = "assetsync keeps a vendored visualization bundle in sync with its upstream release \
                  and rebuilds the template bundle and asset version token the host application serves."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file (default: ./assetsync.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable progress bars.
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync the vendor directory with the latest upstream release.
    Vendor(vendor::VendorCommand),

    /// Compile templates, write the bundle and refresh the asset version.
    Build(build::BuildCommand),

    /// Recompute and write the asset version only.
    Version(version::VersionCommand),

    /// Re-apply the rewrite rules to the vendor directory.
    Rewrite(rewrite::RewriteCommand),
}

impl Cli {
    /// Run the parsed command.
    pub async fn execute(self) -> Result<()> {
        let cli_config = self.build_config();
        self.execute_with_config(cli_config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            quiet: self.quiet,
            config_path: self.config.clone(),
        }
    }

    pub async fn execute_with_config(self, cli_config: CliConfig) -> Result<()> {
        cli_config.init_logging();
        let config = ProjectConfig::load(cli_config.config_path.as_deref()).await?;
        let options = cli_config.pipeline_options();

        match self.command {
            Commands::Vendor(cmd) => cmd.execute(&config, options).await,
            Commands::Build(cmd) => cmd.execute(&config, options),
            Commands::Version(cmd) => cmd.execute(&config, options),
            Commands::Rewrite(cmd) => cmd.execute(&config, options),
        }
    }
}
