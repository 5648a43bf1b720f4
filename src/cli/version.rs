use crate::config::ProjectConfig;
use crate::pipeline::{PipelineOptions, run_version};
use anyhow::Result;
use clap::Args;

/// Recompute and write the asset version only.
#[derive(Args, Debug)]
pub struct VersionCommand {}

impl VersionCommand {
    pub fn execute(self, config: &ProjectConfig, options: PipelineOptions) -> Result<()> {
        let version = run_version(config)?;
        if !options.quiet {
            println!("{}", version.token);
        }
        Ok(())
    }
}
