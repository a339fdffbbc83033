//! Saltmarsh CLI - drive the synchronization engine from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the current cart (requires STORE_SESSION_TOKEN)
//! sm-cli cart show
//!
//! # Add a product; any catalog payload shape is accepted
//! sm-cli cart add --product '{"id": 7, "title": "Mug", "price": 9.99}' --quantity 2
//!
//! # Rewrite a line's quantity / remove a line / clear
//! sm-cli cart update 7 --quantity 3
//! sm-cli cart remove 7
//! sm-cli cart clear
//!
//! # Wishlist (falls back to the device slot without a session)
//! sm-cli wishlist show
//! sm-cli wishlist toggle --product '{"id": 7, "title": "Mug", "price": 9.99}'
//! ```
//!
//! # Environment
//!
//! - `STORE_API_BASE_URL` - store API base (required)
//! - `STORE_SESSION_TOKEN` - bearer token; omit for a guest session
//! - `WISHLIST_STORAGE_PATH` - guest wishlist slot
//! - `STORE_REQUEST_TIMEOUT_SECS` - request timeout (default 10)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};

use saltmarsh_client::{LogNotifier, SyncConfig, SyncController, WishlistToggle};
use saltmarsh_core::{Cart, ProductId, ProductRef, WishlistItem};

#[derive(Parser)]
#[command(name = "sm-cli")]
#[command(author, version, about = "Saltmarsh cart/wishlist CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cart operations (require an authenticated session)
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Wishlist operations (guest sessions use the device slot)
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Fetch and display the cart
    Show,
    /// Add a product to the cart
    Add {
        /// Product payload as JSON (accepts `productId`, `id`, or `_id`)
        #[arg(short, long)]
        product: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Rewrite the quantity of a cart line
    Update {
        /// Product ID of the line
        product_id: String,

        /// New quantity (must be at least 1)
        #[arg(short, long)]
        quantity: u32,
    },
    /// Remove a line from the cart
    Remove {
        /// Product ID of the line
        product_id: String,
    },
    /// Remove every line from the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Display the wishlist
    Show,
    /// Save a product to the wishlist
    Add {
        /// Product payload as JSON
        #[arg(short, long)]
        product: String,
    },
    /// Remove a product from the wishlist
    Remove {
        /// Product ID of the entry
        product_id: String,
    },
    /// Toggle wishlist membership for a product
    Toggle {
        /// Product payload as JSON
        #[arg(short, long)]
        product: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = SyncConfig::from_env()?;
    let mut controller = SyncController::from_config(&config, Arc::new(LogNotifier))?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => {
                let cart = controller.fetch_cart().await?;
                print_cart(cart.as_ref());
            }
            CartAction::Add { product, quantity } => {
                let product = parse_product(&product)?;
                let cart = controller.add_to_cart(&product, quantity).await?;
                tracing::info!(product_id = %product.product_id, "added to cart");
                print_cart(Some(&cart));
            }
            CartAction::Update { product_id, quantity } => {
                let cart = controller
                    .update_quantity(&ProductId::new(product_id), quantity)
                    .await?;
                print_cart(Some(&cart));
            }
            CartAction::Remove { product_id } => {
                let cart = controller
                    .remove_from_cart(&ProductId::new(product_id))
                    .await?;
                print_cart(Some(&cart));
            }
            CartAction::Clear => {
                let cart = controller.clear_cart().await?;
                print_cart(Some(&cart));
            }
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => {
                let items = controller.fetch_wishlist().await.to_vec();
                print_wishlist(&items);
            }
            WishlistAction::Add { product } => {
                let product = parse_product(&product)?;
                controller.add_to_wishlist(&product).await?;
                tracing::info!(product_id = %product.product_id, "saved to wishlist");
            }
            WishlistAction::Remove { product_id } => {
                controller
                    .remove_from_wishlist(&ProductId::new(product_id))
                    .await?;
            }
            WishlistAction::Toggle { product } => {
                let product = parse_product(&product)?;
                match controller.toggle_wishlist(&product).await? {
                    WishlistToggle::Added => {
                        tracing::info!(product_id = %product.product_id, "saved to wishlist");
                    }
                    WishlistToggle::Removed => {
                        tracing::info!(product_id = %product.product_id, "removed from wishlist");
                    }
                }
            }
        },
    }
    Ok(())
}

/// Normalize a raw product payload argument.
fn parse_product(raw: &str) -> Result<ProductRef, Box<dyn std::error::Error>> {
    let payload: serde_json::Value = serde_json::from_str(raw)?;
    Ok(ProductRef::from_json(&payload)?)
}

#[allow(clippy::print_stdout)]
fn print_cart(cart: Option<&Cart>) {
    match cart {
        Some(cart) => match serde_json::to_string_pretty(cart) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => tracing::error!("Failed to render cart: {e}"),
        },
        None => println!("(no cart - guest session)"),
    }
}

#[allow(clippy::print_stdout)]
fn print_wishlist(items: &[WishlistItem]) {
    match serde_json::to_string_pretty(items) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => tracing::error!("Failed to render wishlist: {e}"),
    }
}
