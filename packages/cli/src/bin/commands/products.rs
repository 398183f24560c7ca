use anyhow::{Context, Result};
use ayon_browser::ProductBrowser;
use clap::Args;
use colored::*;

#[derive(Args)]
pub struct ProductsArgs {
    /// Folder to browse, repeat for several
    #[arg(long = "folder", required = true)]
    pub folders: Vec<String>,

    /// Show a specific version for a product, as PRODUCT=VERSION
    #[arg(long, value_parser = parse_pick)]
    pub select: Vec<(String, String)>,
}

fn parse_pick(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((product, version)) if !product.is_empty() && !version.is_empty() => {
            Ok((product.to_string(), version.to_string()))
        }
        _ => Err(format!("expected PRODUCT=VERSION, got '{}'", raw)),
    }
}

pub async fn list_products(browser: &ProductBrowser, args: ProductsArgs) -> Result<()> {
    browser
        .focus_folders(args.folders.clone())
        .await
        .context("Failed to load products")?;

    for (product_id, version_id) in &args.select {
        browser
            .on_select_version(product_id, version_id)
            .await
            .with_context(|| format!("Failed to show {} for {}", version_id, product_id))?;
    }

    let rows = browser.rows();
    if rows.is_empty() {
        println!("{}", "No products found".yellow());
        return Ok(());
    }

    println!(
        "{}",
        ayon_cli::rows_table(&rows, &browser.loading_products())
    );
    println!("Total: {} products", rows.len().to_string().cyan());
    Ok(())
}
