use crate::config::ProjectConfig;
use crate::pipeline::{PipelineOptions, run_rewrite};
use crate::vendor::RewriteOutcome;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Re-apply the rewrite rules to the vendor directory.
#[derive(Args, Debug)]
pub struct RewriteCommand {}

impl RewriteCommand {
    pub fn execute(self, config: &ProjectConfig, options: PipelineOptions) -> Result<()> {
        let outcomes = run_rewrite(config)?;
        if options.quiet {
            return Ok(());
        }
        for (file, outcome) in outcomes {
            match outcome {
                RewriteOutcome::Rewritten {
                    occurrences,
                } => println!("{} {} ({} occurrences)", "Rewrote".green(), file.display(), occurrences),
                RewriteOutcome::AlreadyApplied => {
                    println!("{} {}", "Already rewritten".dimmed(), file.display());
                }
            }
        }
        Ok(())
    }
}
