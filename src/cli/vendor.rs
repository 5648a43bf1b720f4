use crate::config::ProjectConfig;
use crate::pipeline::{PipelineOptions, check_upgrade, run_upgrade};
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Sync the vendor directory with the latest upstream release.
///
/// ```bash
/// assetsync vendor           # download and install the latest release
/// assetsync vendor --check   # only report whether an update exists
/// ```
#[derive(Args, Debug)]
pub struct VendorCommand {
    /// Report the latest and vendored versions without changing anything.
    #[arg(long)]
    pub check: bool,
}

impl VendorCommand {
    pub async fn execute(self, config: &ProjectConfig, options: PipelineOptions) -> Result<()> {
        if self.check {
            return check(config, options).await;
        }

        if !options.quiet {
            println!("{}", "Checking upstream release...".cyan());
        }
        let outcome = run_upgrade(config, options).await?;

        if !options.quiet {
            for entry in &outcome.report.missing_kept {
                println!("{} kept entry '{}' listed but not present", "warning:".yellow(), entry);
            }
            println!(
                "{} {} ({} extracted, {} removed, {} kept)",
                "Vendored".green().bold(),
                outcome.version,
                outcome.report.extracted.len(),
                outcome.report.removed.len(),
                outcome.report.kept.len()
            );
            if let Some(asset_version) = &outcome.asset_version {
                println!("Asset version: {}", asset_version.token);
            }
        }
        Ok(())
    }
}

async fn check(config: &ProjectConfig, options: PipelineOptions) -> Result<()> {
    let status = check_upgrade(config).await?;
    if options.quiet {
        return Ok(());
    }

    let current = status.current.as_deref().unwrap_or("none");
    if status.update_available {
        println!(
            "{} {} -> {}",
            "Update available:".yellow().bold(),
            current,
            status.latest.green()
        );
        println!("Run `assetsync vendor` to install it");
    } else {
        println!("{} {}", "Up to date:".green().bold(), current);
    }
    Ok(())
}
