//! TimePiece CLI - Cart and catalog tools over a file-backed storage area.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog, optionally by category
//! tp-cli products
//! tp-cli products --category luxury
//!
//! # Work with the cart
//! tp-cli cart add classic-gold-watch
//! tp-cli cart inc classic-gold-watch
//! tp-cli cart set classic-gold-watch 3
//! tp-cli cart show
//! tp-cli cart checkout
//! ```
//!
//! # Commands
//!
//! - `products` - List catalog products
//! - `cart` - Show or change the persisted cart
//!
//! Configuration is read from the environment (see
//! `timepiece_storefront::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use timepiece_storefront::StorefrontConfig;

mod commands;

#[derive(Parser)]
#[command(name = "tp-cli")]
#[command(author, version, about = "TimePiece storefront cart tools")]
struct Cli {
    /// YAML product catalog (overrides `TIMEPIECE_CATALOG_PATH`)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Storage file (overrides `TIMEPIECE_STORAGE_PATH`)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products {
        /// Only show this category (`all` for every product)
        #[arg(short, long, default_value = "all")]
        category: String,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },
}

#[derive(Subcommand)]
enum CartCommand {
    /// Show cart items and the order summary
    Show,
    /// Add one unit of a catalog product
    Add {
        /// Product id
        id: String,
    },
    /// Remove a product from the cart
    Remove {
        /// Product id
        id: String,
    },
    /// Set the quantity of a product already in the cart
    Set {
        /// Product id
        id: String,
        /// New quantity (must be a positive whole number)
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Add one unit to a product in the cart
    Inc {
        /// Product id
        id: String,
    },
    /// Take one unit off a product in the cart (never below 1)
    Dec {
        /// Product id
        id: String,
    },
    /// Empty the cart
    Clear,
    /// Place the order and empty the cart
    Checkout,
}

fn main() {
    // Load .env before the filter so RUST_LOG may come from it
    dotenvy::dotenv().ok();

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "timepiece_cli=info,timepiece_storefront=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli);

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = StorefrontConfig::from_env()?;
    if let Some(catalog) = cli.catalog {
        config.catalog_path = Some(catalog);
    }
    if let Some(storage) = cli.storage {
        config.storage_path = storage;
    }

    match cli.command {
        Commands::Products { category } => commands::products::list(&config, &category)?,
        Commands::Cart { action } => {
            let mut cart = commands::cart::CartSession::open(&config);
            match action {
                CartCommand::Show => cart.show()?,
                CartCommand::Add { id } => cart.add(&id)?,
                CartCommand::Remove { id } => cart.remove(&id)?,
                CartCommand::Set { id, quantity } => cart.set(&id, &quantity)?,
                CartCommand::Inc { id } => cart.increase(&id)?,
                CartCommand::Dec { id } => cart.decrease(&id)?,
                CartCommand::Clear => cart.clear()?,
                CartCommand::Checkout => cart.checkout()?,
            }
        }
    }
    Ok(())
}
