use std::path::PathBuf;
use std::process;

use ayon_browser::ProductBrowser;
use clap::{Parser, Subcommand};
use colored::*;

mod commands;

use commands::{fields, products, status, versions};

#[derive(Parser)]
#[command(name = "ayon-browser")]
#[command(about = "Browse Ayon products and versions from the terminal")]
#[command(version)]
struct Cli {
    /// Client config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project to browse, overrides the configured one
    #[arg(short, long, global = true)]
    project: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the products of folders with their selected versions
    Products(products::ProductsArgs),
    /// Fetch versions by id
    Versions(versions::VersionsArgs),
    /// Set the status of a product's version, or of a selection of products
    SetStatus(status::SetStatusArgs),
    /// Show the detail fields of one version
    Show {
        /// Version id
        version_id: String,
    },
    /// List the detail fields known for an entity type
    Fields {
        /// folder, product, version, task or representation
        entity_type: ayon_core::EntityType,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    ayon_cli::init_tracing(cli.verbose);

    if let Err(e) = handle_command(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        config,
        project,
        command,
        ..
    } = cli;
    let connect = || -> anyhow::Result<ProductBrowser> {
        let config = ayon_cli::load_config(config.as_deref(), project.clone())?;
        ayon_cli::build_browser(&config)
    };

    match command {
        Commands::Products(args) => products::list_products(&connect()?, args).await,
        Commands::Versions(args) => versions::list_versions(&connect()?, args).await,
        Commands::SetStatus(args) => status::set_status(&connect()?, args).await,
        Commands::Show { version_id } => versions::show_version(&connect()?, &version_id).await,
        Commands::Fields { entity_type } => fields::list_fields(entity_type),
    }
}
