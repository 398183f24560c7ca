// ABOUTME: Shared setup and rendering for the ayon-browser command line tool
// ABOUTME: Builds the client stack from configuration and formats rows as tables

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ayon_api::AyonClient;
use ayon_browser::{BrowserStore, ProductBrowser, TracingNotifier};
use ayon_cache::{CacheConfig, QueryCache};
use ayon_config::ClientConfig;
use ayon_core::{FieldDescriptor, ProductRow, Version};
use chrono::{DateTime, Utc};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Log level used when `RUST_LOG` is not set
pub fn default_log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Install the log subscriber. `RUST_LOG` wins over the default level.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Config file (or the default location) with environment overrides on top
pub fn load_config(path: Option<&Path>, project: Option<String>) -> Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => ClientConfig::load(&ClientConfig::default_path())?,
    };
    config.apply_overrides(&|name: &str| std::env::var(name).ok())?;
    if let Some(project) = project {
        config.project_name = project;
    }
    config.validate().context("Invalid client configuration")?;
    Ok(config)
}

pub fn build_browser(config: &ClientConfig) -> Result<ProductBrowser> {
    let client = AyonClient::new(config).context("Failed to create Ayon client")?;
    info!(
        "Connected to {} (project {})",
        config.server_url, config.project_name
    );
    let cache = QueryCache::new(CacheConfig {
        stale_after: config.cache_stale_after(),
        ..Default::default()
    });
    Ok(ProductBrowser::new(
        Arc::new(client),
        cache,
        Arc::new(BrowserStore::new()),
        Arc::new(TracingNotifier),
    ))
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "—".to_string())
}

pub fn rows_table(rows: &[ProductRow], loading: &[String]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Product", "Type", "Folder", "Task", "Version", "Status", "Author", "Created",
    ]);
    for row in rows {
        let version = match (&row.version, loading.contains(&row.id)) {
            (_, true) => "loading…".to_string(),
            (Some(fields), false) => fields.version_name.clone(),
            (None, false) => "—".to_string(),
        };
        let fields = row.version.as_ref();
        table.add_row(vec![
            row.name.clone(),
            row.product_type.clone(),
            row.folder.clone(),
            row.task_name.clone().unwrap_or_else(|| "—".to_string()),
            version,
            row.status().unwrap_or("—").to_string(),
            fields
                .and_then(|f| f.author.clone())
                .unwrap_or_else(|| "—".to_string()),
            format_date(fields.and_then(|f| f.created_at)),
        ]);
    }
    table
}

pub fn versions_table(versions: &[Version]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["ID", "Name", "Version", "Status", "Product", "Folder", "Author"]);
    for version in versions {
        table.add_row(vec![
            version.id.clone(),
            version.name.clone(),
            version.version.to_string(),
            version.status.clone(),
            version.product_id.clone(),
            version.folder_id.clone(),
            version.author.clone().unwrap_or_else(|| "—".to_string()),
        ]);
    }
    table
}

pub fn fields_table(fields: &[FieldDescriptor]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Key", "Label", "Kind"]);
    for field in fields {
        table.add_row(vec![
            field.key.to_string(),
            field.label.to_string(),
            format!("{:?}", field.kind),
        ]);
    }
    table
}

pub fn details_table(details: &[(&'static str, String)]) -> Table {
    let mut table = new_table();
    for (label, value) in details {
        table.add_row(vec![label.to_string(), value.clone()]);
    }
    table
}
