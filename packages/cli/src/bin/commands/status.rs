use anyhow::{Context, Result};
use ayon_browser::ProductBrowser;
use clap::Args;
use colored::*;

#[derive(Args)]
pub struct SetStatusArgs {
    /// Product whose current version gets the status
    pub product_id: String,

    /// New status name
    pub status: String,

    /// Folder the product lives in, repeat for several
    #[arg(long = "folder", required = true)]
    pub folders: Vec<String>,

    /// Other products selected together with this one
    #[arg(long)]
    pub with: Vec<String>,
}

pub async fn set_status(browser: &ProductBrowser, args: SetStatusArgs) -> Result<()> {
    browser
        .focus_folders(args.folders.clone())
        .await
        .context("Failed to load products")?;

    if !args.with.is_empty() {
        let mut selection = vec![args.product_id.clone()];
        selection.extend(args.with.iter().cloned());
        browser.on_selection_change(selection);
    }

    let outcome = browser
        .on_status_change(&args.status, &args.product_id)
        .await
        .context("Status update failed")?;

    if outcome.version_ids.is_empty() {
        println!("{}", "No versions to update".yellow());
        return Ok(());
    }
    println!(
        "{} Set '{}' on {} versions",
        "✓".green(),
        args.status.bold(),
        outcome.version_ids.len().to_string().cyan()
    );
    println!(
        "{}",
        ayon_cli::rows_table(&browser.rows(), &browser.loading_products())
    );
    Ok(())
}
