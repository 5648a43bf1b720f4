use crate::config::ProjectConfig;
use crate::pipeline::{PipelineOptions, run_build};
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Compile templates, write the bundle and refresh the asset version.
#[derive(Args, Debug)]
pub struct BuildCommand {}

impl BuildCommand {
    pub fn execute(self, config: &ProjectConfig, options: PipelineOptions) -> Result<()> {
        let outcome = run_build(config)?;
        if !options.quiet {
            println!(
                "{} {} ({} templates)",
                "Wrote".green().bold(),
                outcome.bundle_file.display(),
                outcome.template_ids.len()
            );
            println!("Asset version: {}", outcome.asset_version.token);
        }
        Ok(())
    }
}
