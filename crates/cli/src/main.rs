//! Atelier CLI - shop the storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! atelier products --categories sneakers --sort price_asc --limit 5
//! atelier product classic-leather-sneaker
//!
//! # Cart and wishlist (kept in the state directory)
//! atelier cart add classic-leather-sneaker 9.5
//! atelier cart show
//! atelier wishlist add linen-shirt
//!
//! # Account and checkout
//! atelier register --name "Ada" --email ada@example.com --password ...
//! atelier login --email ada@example.com --password ...
//! atelier checkout --full-name "Ada Lovelace" --street "1 Main St" --city Springfield \
//!     --state IL --postal-code 62701 --country US --phone 555-0100
//! atelier orders
//!
//! # Offline
//! atelier catalog validate data/products.json
//! ```
//!
//! # Environment Variables
//!
//! - `ATELIER_API_URL` - Storefront base URL (default: `http://127.0.0.1:3000`)
//! - `ATELIER_STATE_DIR` - Where cart, wishlist and token are kept (default: `.atelier`)
//! - `ATELIER_PASSWORD` - Password for `register` / `login`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;
use url::Url;

use atelier_cli::api::ApiClient;
use atelier_cli::storage::FileStorage;
use atelier_core::Size;
use atelier_core::order::ShippingAddress;
use atelier_core::query::ListingParams;

mod commands;

use commands::{CommandResult, Context};

#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about = "Atelier storefront client")]
struct Cli {
    /// Storefront base URL
    #[arg(long, env = "ATELIER_API_URL", default_value = "http://127.0.0.1:3000")]
    api_url: Url,

    /// Directory holding the cart, wishlist and login token
    #[arg(long, env = "ATELIER_STATE_DIR", default_value = ".atelier")]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products(ListingArgs),
    /// Show one product and related products
    Product { slug: String },
    /// List categories with product counts
    Categories,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: Option<WishlistAction>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "ATELIER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in and remember the token
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "ATELIER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out and forget the token
    Logout,
    /// Show the logged-in profile
    Me,
    /// Place an order for the cart
    Checkout(AddressArgs),
    /// List your orders
    Orders,
    /// Offline catalog tools
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Args)]
struct ListingArgs {
    #[arg(long)]
    page: Option<String>,
    #[arg(long)]
    limit: Option<String>,
    /// Comma-separated tags (any match)
    #[arg(long)]
    tags: Option<String>,
    /// Comma-separated category slugs (any match)
    #[arg(long)]
    categories: Option<String>,
    /// `price_asc`, `price_desc`, `name_asc`, `name_desc` or `newest`
    #[arg(long)]
    sort: Option<String>,
    #[arg(long)]
    search: Option<String>,
}

impl From<ListingArgs> for ListingParams {
    fn from(args: ListingArgs) -> Self {
        Self {
            page: args.page,
            limit: args.limit,
            tags: args.tags,
            categories: args.categories,
            sort: args.sort,
            search: args.search,
        }
    }
}

#[derive(Args)]
struct AddressArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    street: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    postal_code: String,
    #[arg(long)]
    country: String,
    #[arg(long)]
    phone: String,
}

impl From<AddressArgs> for ShippingAddress {
    fn from(args: AddressArgs) -> Self {
        Self {
            full_name: args.full_name,
            street_address: args.street,
            city: args.city,
            state: args.state,
            postal_code: args.postal_code,
            country: args.country,
            phone: args.phone,
        }
    }
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add one unit of a product in a size
    Add { slug: String, size: Size },
    /// Remove a product (every size)
    Remove { slug: String },
    /// Set the quantity of a product (0 removes it)
    Set {
        slug: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show wishlisted products
    Show,
    /// Wishlist a product
    Add { slug: String },
    /// Remove a product from the wishlist
    Remove { slug: String },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Check that a catalog file parses and validates
    Validate { path: PathBuf },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier_cli=info,atelier_core=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CommandResult {
    let storage = FileStorage::new(cli.state_dir);
    let api = ApiClient::new(cli.api_url).with_token(storage.token()?);
    let mut ctx = Context { api, storage };

    match cli.command {
        Commands::Products(args) => commands::catalog::products(&ctx, &args.into()).await,
        Commands::Product { slug } => commands::catalog::product(&ctx, &slug).await,
        Commands::Categories => commands::catalog::categories(&ctx).await,
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::shop::show_cart(&ctx),
            CartAction::Add { slug, size } => commands::shop::add_to_cart(&ctx, &slug, size).await,
            CartAction::Remove { slug } => commands::shop::remove_from_cart(&ctx, &slug),
            CartAction::Set { slug, quantity } => {
                commands::shop::set_quantity(&ctx, &slug, quantity)
            }
            CartAction::Clear => commands::shop::clear_cart(&ctx),
        },
        Commands::Wishlist { action } => match action.unwrap_or(WishlistAction::Show) {
            WishlistAction::Show => commands::shop::show_wishlist(&ctx),
            WishlistAction::Add { slug } => commands::shop::add_to_wishlist(&ctx, &slug).await,
            WishlistAction::Remove { slug } => commands::shop::remove_from_wishlist(&ctx, &slug),
        },
        Commands::Register {
            name,
            email,
            password,
        } => {
            commands::account::register(&ctx, &name, &email, SecretString::from(password)).await
        }
        Commands::Login { email, password } => {
            commands::account::login(&mut ctx, &email, SecretString::from(password)).await
        }
        Commands::Logout => commands::account::logout(&mut ctx).await,
        Commands::Me => commands::account::me(&ctx).await,
        Commands::Checkout(address) => commands::checkout::checkout(&ctx, address.into()).await,
        Commands::Orders => commands::checkout::orders(&ctx).await,
        Commands::Catalog {
            action: CatalogAction::Validate { path },
        } => commands::catalog::validate(&path),
    }
}
