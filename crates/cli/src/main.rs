//! Shopfront CLI - browse, buy, and manage a storefront from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! shop products list --query tea --sort price-asc
//! shop products show 5
//!
//! # Sign in, fill the cart, and order
//! shop login alice
//! shop cart add 5 -q 2
//! shop checkout
//! shop orders list
//!
//! # Store management (admin accounts)
//! shop admin orders list --status pending
//! shop admin orders set-status 12 shipped
//! ```
//!
//! # Commands
//!
//! - `login`, `logout`, `register`, `profile` - Account
//! - `products` - Catalog
//! - `cart`, `checkout` - Cart and ordering
//! - `orders` - Order history and cancellation
//! - `admin` - Products and orders across the store
//! - `settings` - Backend address and stored state
//!
//! Pass `--json` to print payloads as JSON. Logs go to stderr; set
//! `RUST_LOG` to adjust them and `SHOPFRONT_LOG_FORMAT=json` for JSON logs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shopfront_core::{
    CartItemId, OrderId, OrderStatus, Price, ProductId, ProductSort, Role, StatusFilter,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Context;
use commands::admin::ProductFields;

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Shopfront storefront client")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with a username or email
    Login {
        /// Username or email
        name_or_email: String,

        /// Password (read from stdin when omitted)
        #[arg(short, long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored credential
    Logout,
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Account role (`user`, `admin`)
        #[arg(short, long, default_value = "user")]
        role: Role,
    },
    /// Show the signed-in account
    Profile,
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Order everything in the cart
    Checkout,
    /// Your orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Store management
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Backend address and stored state
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Case-insensitive name filter
        #[arg(short, long, default_value = "")]
        query: String,

        /// Sort order (`default`, `price-asc`, `price-desc`, `name-asc`, `name-desc`)
        #[arg(short, long, default_value = "default")]
        sort: ProductSort,
    },
    /// Show one product
    Show { id: ProductId },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        product_id: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Remove a cart line
    Remove { line_id: CartItemId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List your orders
    List {
        /// Status filter (`all` or a status)
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
    },
    /// Show one order
    Show { id: OrderId },
    /// Cancel a pending or processing order
    Cancel { id: OrderId },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Manage products
    Products {
        #[command(subcommand)]
        action: AdminProductsAction,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: AdminOrdersAction,
    },
}

#[derive(Subcommand)]
enum AdminProductsAction {
    /// Create one product
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        price: String,

        #[arg(short, long)]
        stock: Option<String>,

        #[arg(short, long)]
        image: Option<String>,
    },
    /// Create products from a JSON array file
    Import {
        file: PathBuf,

        /// Validate and preview without sending
        #[arg(long)]
        dry_run: bool,
    },
    /// Update a product
    Update {
        id: ProductId,

        #[arg(short, long)]
        price: Price,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        stock: Option<String>,

        #[arg(short, long)]
        image: Option<String>,
    },
    /// Delete a product
    Delete { id: ProductId },
}

#[derive(Subcommand)]
enum AdminOrdersAction {
    /// List every order
    List {
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,

        /// Match against order ID or status
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Set an order's status
    SetStatus { id: OrderId, status: OrderStatus },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show the effective settings
    Show,
    /// Store a new backend address (admin only)
    SetBaseUrl { url: String },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_client=warn,shop=warn".into());

    let is_json = std::env::var("SHOPFRONT_LOG_FORMAT").is_ok_and(|f| f == "json");
    let json_layer = is_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!is_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env(cli.json)?;
    match cli.command {
        Commands::Login {
            name_or_email,
            password,
        } => commands::auth::login(&ctx, &name_or_email, password).await?,
        Commands::Logout => commands::auth::logout(&ctx)?,
        Commands::Register {
            username,
            email,
            password,
            role,
        } => commands::auth::register(&ctx, &username, &email, password, role).await?,
        Commands::Profile => commands::auth::profile(&ctx).await?,
        Commands::Products { action } => match action {
            ProductsAction::List { query, sort } => {
                commands::catalog::list(&ctx, &query, sort).await?;
            }
            ProductsAction::Show { id } => commands::catalog::show(&ctx, id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await?,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&ctx, product_id, quantity).await?,
            CartAction::Remove { line_id } => commands::cart::remove(&ctx, line_id).await?,
            CartAction::Clear => commands::cart::clear(&ctx).await?,
        },
        Commands::Checkout => commands::cart::checkout(&ctx).await?,
        Commands::Orders { action } => match action {
            OrdersAction::List { status } => commands::orders::list(&ctx, &status).await?,
            OrdersAction::Show { id } => commands::orders::show(&ctx, id).await?,
            OrdersAction::Cancel { id } => commands::orders::cancel(&ctx, id).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Products { action } => run_admin_products(&ctx, action).await?,
            AdminAction::Orders { action } => match action {
                AdminOrdersAction::List { status, query } => {
                    commands::admin::list_orders(&ctx, &status, &query).await?;
                }
                AdminOrdersAction::SetStatus { id, status } => {
                    commands::admin::set_order_status(&ctx, id, &status).await?;
                }
            },
        },
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::settings::show(&ctx)?,
            SettingsAction::SetBaseUrl { url } => {
                commands::settings::set_base_url(&ctx, &url).await?;
            }
        },
    }
    Ok(())
}

async fn run_admin_products(
    ctx: &Context,
    action: AdminProductsAction,
) -> Result<(), commands::CommandError> {
    match action {
        AdminProductsAction::Create {
            name,
            description,
            price,
            stock,
            image,
        } => {
            let fields = ProductFields {
                name,
                description,
                price,
                stock,
                image,
            };
            commands::admin::create_product(ctx, fields).await
        }
        AdminProductsAction::Import { file, dry_run } => {
            commands::admin::import_products(ctx, &file, dry_run).await
        }
        AdminProductsAction::Update {
            id,
            price,
            name,
            description,
            stock,
            image,
        } => {
            let fields = ProductFields {
                name: name.unwrap_or_default(),
                description,
                price: price.to_string(),
                stock,
                image,
            };
            commands::admin::update_product(ctx, id, price, fields).await
        }
        AdminProductsAction::Delete { id } => commands::admin::delete_product(ctx, id).await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_add() {
        let cli = Cli::try_parse_from(["shop", "cart", "add", "5", "-q", "3", "--json"]).unwrap();
        assert!(cli.json);
        let Commands::Cart {
            action: CartAction::Add {
                product_id,
                quantity,
            },
        } = cli.command
        else {
            panic!("expected cart add");
        };
        assert_eq!(product_id, ProductId::new(5));
        assert_eq!(quantity, 3);
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        assert!(
            Cli::try_parse_from(["shop", "admin", "orders", "set-status", "1", "lost"]).is_err()
        );
        let cli =
            Cli::try_parse_from(["shop", "orders", "list", "--status", "pending"]).unwrap();
        let Commands::Orders {
            action: OrdersAction::List { status },
        } = cli.command
        else {
            panic!("expected orders list");
        };
        assert_eq!(status, StatusFilter::Only(OrderStatus::Pending));
    }

    #[test]
    fn test_admin_orders_query_help() {
        let mut cli = Cli::command();
        let list = cli
            .find_subcommand_mut("admin")
            .and_then(|c| c.find_subcommand_mut("orders"))
            .and_then(|c| c.find_subcommand_mut("list"))
            .unwrap();
        let help = list
            .get_arguments()
            .find(|arg| arg.get_id() == "query")
            .and_then(|arg| arg.get_help())
            .unwrap()
            .to_string();
        assert_eq!(help, "Match against order ID or status");
    }

    #[test]
    fn test_parse_sort_default() {
        let cli = Cli::try_parse_from(["shop", "products", "list"]).unwrap();
        let Commands::Products {
            action: ProductsAction::List { query, sort },
        } = cli.command
        else {
            panic!("expected products list");
        };
        assert!(query.is_empty());
        assert_eq!(sort, ProductSort::Default);
    }
}
