//! Basket CLI - a terminal storefront over the cart store.
//!
//! Commands:
//! - `basket products` - List the catalog with quantities already in the cart
//! - `basket show` - Show the cart
//! - `basket add <id>` - Add one unit of a product
//! - `basket remove <id>` - Remove a product
//! - `basket update <id> <amount>` - Set the quantity of a product
//! - `basket config` - Manage configuration

mod commands;
mod config;
mod context;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{ConfigArgs, ProductArgs, UpdateArgs};
use context::Overrides;

/// Basket CLI - Keep a shopping cart in sync with a storefront catalog
#[derive(Parser)]
#[command(name = "basket")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Catalog service base URL
    #[arg(long, global = true, env = "BASKET_API_URL")]
    api_url: Option<String>,

    /// Directory holding the saved cart
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Serve the catalog from a JSON fixture instead of the network
    #[arg(long, global = true)]
    fixture: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products,

    /// Show the cart
    Show,

    /// Add one unit of a product to the cart
    Add(ProductArgs),

    /// Remove a product from the cart
    Remove(ProductArgs),

    /// Set the quantity of a product in the cart
    Update(UpdateArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.json);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let overrides = Overrides {
        api_url: cli.api_url,
        data_dir: cli.data_dir,
        fixture: cli.fixture,
    };
    let ctx = match context::Context::load(cli.config.as_deref(), overrides, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Products => commands::products::run(&ctx).await,
        Commands::Show => commands::cart::show(&ctx).await,
        Commands::Add(args) => commands::cart::add(args, &ctx).await,
        Commands::Remove(args) => commands::cart::remove(args, &ctx).await,
        Commands::Update(args) => commands::cart::update(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
