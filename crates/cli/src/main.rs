//! Rye cart CLI - drive the cart proxy from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create a cart holding one product
//! rye-cli create --product-id B08CQDF382
//!
//! # Add a product to the active cart
//! rye-cli add --product-id B07PWYB6LZ --quantity 2
//!
//! # Set the shipping address (omitted fields use the demo buyer)
//! rye-cli buyer --first-name John --postal-code 10001
//!
//! # Submit the active cart
//! rye-cli submit
//! ```
//!
//! The proxy is reached at `--base-url`, `RYE_PROXY_URL`, or
//! `http://localhost:4000`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use rye_cart_core::BuyerIdentityPatch;
use url::Url;

mod client;
mod commands;

use client::ProxyClient;

#[derive(Parser)]
#[command(name = "rye-cli")]
#[command(author, version, about = "Rye cart proxy CLI")]
struct Cli {
    /// Base URL of the running proxy
    #[arg(
        long,
        global = true,
        env = "RYE_PROXY_URL",
        default_value = "http://localhost:4000"
    )]
    base_url: Url,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new cart with one product and make it active
    Create(ItemArgs),
    /// Add a product to the active cart
    Add(ItemArgs),
    /// Set the buyer identity on the active cart
    Buyer(BuyerArgs),
    /// Submit the active cart
    Submit,
}

#[derive(Args)]
struct ItemArgs {
    /// Amazon product ID (ASIN)
    #[arg(short, long)]
    product_id: String,

    /// Quantity; 0 or omitted means 1
    #[arg(short, long, allow_negative_numbers = true)]
    quantity: Option<i64>,
}

#[derive(Args)]
struct BuyerArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    address1: Option<String>,
    #[arg(long)]
    city: Option<String>,
    /// Two-letter state code
    #[arg(long)]
    province_code: Option<String>,
    #[arg(long)]
    postal_code: Option<String>,
}

impl From<BuyerArgs> for BuyerIdentityPatch {
    fn from(args: BuyerArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            address1: args.address1,
            city: args.city,
            province_code: args.province_code,
            postal_code: args.postal_code,
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present so RYE_PROXY_URL can live there
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), client::CliError> {
    let client = ProxyClient::new(cli.base_url)?;

    match cli.command {
        Commands::Create(item) => {
            commands::cart::create(&client, item.product_id, item.quantity).await?;
        }
        Commands::Add(item) => {
            commands::cart::add(&client, item.product_id, item.quantity).await?;
        }
        Commands::Buyer(buyer) => commands::checkout::update_buyer(&client, buyer.into()).await?,
        Commands::Submit => commands::checkout::submit(&client).await?,
    }
    Ok(())
}
