//! # florals
//!
//! Command line front end for the Rehoboth Florals storefront.
//!
//! ```text
//! florals products --category roses --sort price --order desc
//! florals add red-rose-bouquet --quantity 2 --size large
//! florals cart
//! florals checkout --first-name Ama ... --reference PSK-123
//! florals orders
//! ```
//!
//! Results are printed to stdout as JSON. Errors are printed to stderr as
//! `{"code": ..., "message": ...}` with a non-zero exit status. Logs go to
//! stderr, filtered by `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use florals_core::catalog::{ProductFilters, SortBy, SortOrder};
use florals_core::checkout::PaymentConfirmation;
use florals_core::{Money, ShippingAddress, Size};
use florals_storefront::commands::{cart, catalog, checkout, order};
use florals_storefront::error::{ApiError, ApiResult};
use florals_storefront::state::ConfigState;
use florals_storefront::{init_tracing, AppState};

/// Rehoboth Florals storefront
#[derive(Parser)]
#[command(name = "florals")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file path (default: $FLORALS_CONFIG or the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides config and FLORALS_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products(ProductsArgs),

    /// Show one product
    Product { id: String },

    /// List categories
    Categories,

    /// Highest-rated products in stock
    Featured {
        #[arg(long, default_value_t = 4)]
        limit: usize,
    },

    /// Show the cart
    Cart,

    /// Add a product to the cart
    Add {
        product_id: String,
        #[arg(short, long)]
        quantity: Option<i64>,
        #[arg(short, long, value_parser = parse_size)]
        size: Option<Size>,
    },

    /// Set a quantity (0 removes)
    Update {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
        /// Only this size; every size of the product otherwise
        #[arg(short, long, value_parser = parse_size)]
        size: Option<Size>,
    },

    /// Remove a product from the cart
    Remove {
        product_id: String,
        /// Only this size; every size of the product otherwise
        #[arg(short, long, value_parser = parse_size)]
        size: Option<Size>,
    },

    /// Empty the cart
    Clear,

    /// Subtotal, shipping, tax and total
    Summary,

    /// Place an order for the cart contents
    Checkout(CheckoutArgs),

    /// List placed orders
    Orders,

    /// Show one order by id or order number
    Order { id: String },

    /// Database and configuration health
    Status,
}

#[derive(Args)]
struct ProductsArgs {
    /// Category id or name
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    search: Option<String>,
    /// Decimal cedis, e.g. 150 or 99.50
    #[arg(long, value_parser = parse_money)]
    min_price: Option<Money>,
    #[arg(long, value_parser = parse_money)]
    max_price: Option<Money>,
    #[arg(long)]
    in_stock: bool,
    /// name, price, rating or created
    #[arg(long, value_parser = parse_sort_by)]
    sort: Option<SortBy>,
    /// asc or desc
    #[arg(long, value_parser = parse_sort_order)]
    order: Option<SortOrder>,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Args)]
struct CheckoutArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    zip_code: String,
    #[arg(long, default_value = "Ghana")]
    country: String,

    /// Gateway transaction reference
    #[arg(long)]
    reference: String,

    /// Amount charged (default: the current total)
    #[arg(long, value_parser = parse_money)]
    amount: Option<Money>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    store_name: String,
    database_path: PathBuf,
    healthy: bool,
    migrations_embedded: usize,
    migrations_applied: usize,
    cart_items: i64,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let body = serde_json::to_string_pretty(&e).unwrap_or_else(|_| e.to_string());
            eprintln!("{}", body);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ApiResult<()> {
    let mut config = ConfigState::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database_path = Some(db);
    }
    debug!(?config, "Configuration loaded");

    if let Commands::Categories = cli.command {
        return print(&catalog::list_categories());
    }

    let state = AppState::open(config).await?;
    let result = dispatch(&state, cli.command).await;
    state.db.inner().close().await;
    result
}

async fn dispatch(state: &AppState, command: Commands) -> ApiResult<()> {
    match command {
        Commands::Products(args) => {
            let filters = ProductFilters {
                category: args.category,
                search: args.search,
                min_price: args.min_price,
                max_price: args.max_price,
                in_stock: args.in_stock.then_some(true),
                sort_by: args.sort.unwrap_or_default(),
                sort_order: args.order.unwrap_or_default(),
            };
            print(&catalog::list_products(state, filters, args.page, args.limit)?)
        }
        Commands::Product { id } => print(&catalog::get_product(state, &id)?),
        Commands::Categories => print(&catalog::list_categories()),
        Commands::Featured { limit } => print(&catalog::featured_products(state, limit)),

        Commands::Cart => print(&cart::get_cart(state).await),
        Commands::Add {
            product_id,
            quantity,
            size,
        } => print(&cart::add_to_cart(state, &product_id, quantity, size).await?),
        Commands::Update {
            product_id,
            quantity,
            size,
        } => print(&cart::update_cart_item(state, &product_id, quantity, size).await?),
        Commands::Remove { product_id, size } => {
            print(&cart::remove_from_cart(state, &product_id, size).await?)
        }
        Commands::Clear => print(&cart::clear_cart(state).await?),

        Commands::Summary => print(&checkout::checkout_summary(state).await),
        Commands::Checkout(args) => {
            let amount = match args.amount {
                Some(amount) => amount,
                None => checkout::checkout_summary(state).await.total,
            };
            let request = checkout::PlaceOrderRequest {
                shipping_address: ShippingAddress {
                    first_name: args.first_name,
                    last_name: args.last_name,
                    email: args.email,
                    phone: args.phone,
                    address: args.address,
                    city: args.city,
                    state: args.state,
                    zip_code: args.zip_code,
                    country: args.country,
                },
                payment: PaymentConfirmation::new(args.reference, amount),
            };
            let placed = checkout::place_order(state, request).await?;
            info!(order_number = %placed.order_number, "Thank you for shopping with {}", state.config.store_name);
            print(&placed)
        }

        Commands::Orders => print(&order::list_orders(state).await?),
        Commands::Order { id } => print(&order::lookup_order(state, &id).await?),

        Commands::Status => {
            let db = state.db.inner();
            let (embedded, applied) = db.migration_status().await?;
            print(&StatusReport {
                store_name: state.config.store_name.clone(),
                database_path: state.config.resolve_database_path()?,
                healthy: db.health_check().await,
                migrations_embedded: embedded,
                migrations_applied: applied,
                cart_items: state.cart.item_count().await,
            })
        }
    }
}

fn print<T: Serialize>(value: &T) -> ApiResult<()> {
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::internal(format!("Could not render output: {}", e)))?;
    println!("{}", body);
    Ok(())
}

// =============================================================================
// Argument Parsers
// =============================================================================

fn parse_size(s: &str) -> Result<Size, String> {
    Size::parse(s).ok_or_else(|| format!("unknown size '{}' (small, medium, large, xl)", s))
}

fn parse_money(s: &str) -> Result<Money, String> {
    Money::parse(s)
        .filter(|m| !m.is_negative())
        .ok_or_else(|| format!("invalid amount '{}'", s))
}

fn parse_sort_by(s: &str) -> Result<SortBy, String> {
    match s.to_ascii_lowercase().as_str() {
        "name" => Ok(SortBy::Name),
        "price" => Ok(SortBy::Price),
        "rating" => Ok(SortBy::Rating),
        "created" | "createdat" | "newest" => Ok(SortBy::CreatedAt),
        _ => Err(format!("unknown sort key '{}'", s)),
    }
}

fn parse_sort_order(s: &str) -> Result<SortOrder, String> {
    match s.to_ascii_lowercase().as_str() {
        "asc" => Ok(SortOrder::Asc),
        "desc" => Ok(SortOrder::Desc),
        _ => Err(format!("unknown sort order '{}'", s)),
    }
}
