use anyhow::{Context, Result};
use ayon_browser::ProductBrowser;
use clap::Args;
use colored::*;

#[derive(Args)]
pub struct VersionsArgs {
    /// Version ids
    #[arg(required = true)]
    pub ids: Vec<String>,
}

pub async fn list_versions(browser: &ProductBrowser, args: VersionsArgs) -> Result<()> {
    let versions = browser
        .fetch_versions(args.ids)
        .await
        .context("Failed to load versions")?;

    if versions.is_empty() {
        println!("{}", "No versions found".yellow());
        return Ok(());
    }
    println!("{}", ayon_cli::versions_table(&versions));
    Ok(())
}

pub async fn show_version(browser: &ProductBrowser, version_id: &str) -> Result<()> {
    let details = browser
        .version_details(version_id)
        .await
        .with_context(|| format!("Failed to load version {}", version_id))?;
    println!("{}", format!("Version {}", version_id).blue().bold());
    println!("{}", ayon_cli::details_table(&details));
    Ok(())
}
