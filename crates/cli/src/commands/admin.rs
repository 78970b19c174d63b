//! Store management commands. Every command checks the signed-in account
//! is an admin before touching the backend.
//!
//! # Usage
//!
//! ```bash
//! # Create one product
//! shop admin products create --name Teapot --price 2400 --stock 3
//!
//! # Create many products from a JSON array (preview first with --dry-run)
//! shop admin products import products.json --dry-run
//! shop admin products import products.json
//!
//! # Update or delete a product
//! shop admin products update 5 --price 2600 --stock 10
//! shop admin products delete 5
//!
//! # Review every order and move one along
//! shop admin orders list --status pending
//! shop admin orders set-status 12 shipped
//! ```

use std::io::Write;
use std::path::Path;

use shopfront_core::{
    BuilderError, BulkBuilder, DraftField, NewProduct, OrderId, OrderStatus, Price, ProductId,
    StatusFilter, filter_orders,
};
use tracing::info;

use super::{CommandError, Context, write_orders};

/// Product fields as typed on the command line.
#[derive(Debug, Default, Clone)]
pub struct ProductFields {
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub stock: Option<String>,
    pub image: Option<String>,
}

impl ProductFields {
    /// Load the fields into a single-row builder, the same path imported
    /// rows take.
    fn into_builder(self) -> Result<BulkBuilder, BuilderError> {
        let mut builder = BulkBuilder::new();
        let Some(key) = builder.rows().first().map(|row| row.key) else {
            return Ok(builder);
        };
        let fields = [
            (DraftField::Name, Some(self.name)),
            (DraftField::Description, self.description),
            (DraftField::Price, Some(self.price)),
            (DraftField::Stock, self.stock),
            (DraftField::Image, self.image),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                builder.update(key, field, &value)?;
            }
        }
        Ok(builder)
    }
}

/// Describe every failing row on one line.
fn describe_errors(builder: &BulkBuilder) -> Option<String> {
    let errors = builder.validate();
    if errors.is_empty() {
        return None;
    }
    let described: Vec<String> = errors
        .iter()
        .map(|row| {
            let position = builder
                .rows()
                .iter()
                .position(|r| r.key == row.key)
                .map_or(0, |i| i + 1);
            format!("row {position}: {row}")
        })
        .collect();
    Some(described.join(" | "))
}

/// Create one product.
pub async fn create_product(ctx: &Context, fields: ProductFields) -> Result<(), CommandError> {
    ctx.client.require_admin().await?;
    let builder = fields.into_builder()?;
    if let Some(errors) = describe_errors(&builder) {
        return Err(CommandError::InvalidArgument(errors));
    }
    ctx.client.submit_builder(&builder).await?;
    ctx.done("Product created")
}

/// Create products from a JSON array file.
pub async fn import_products(
    ctx: &Context,
    path: &Path,
    dry_run: bool,
) -> Result<(), CommandError> {
    let text = std::fs::read_to_string(path).map_err(|source| CommandError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut builder = BulkBuilder::new();
    let count = builder.import_json(&text)?;
    info!(count, path = %path.display(), "Imported draft products");

    let errors = describe_errors(&builder);
    if dry_run {
        let preview = builder.preview()?;
        let products: Vec<&NewProduct> = builder.rows().iter().map(|row| &row.product).collect();
        return ctx.emit(&products, |out: &mut dyn Write| {
            writeln!(out, "{preview}")?;
            match &errors {
                Some(errors) => writeln!(out, "Not ready: {errors}"),
                None => writeln!(out, "{count} product(s) ready to create"),
            }
        });
    }

    if let Some(errors) = errors {
        return Err(CommandError::InvalidArgument(errors));
    }
    ctx.client.require_admin().await?;
    let sent = ctx.client.submit_builder(&builder).await?;
    ctx.done(&format!("Created {sent} product(s)"))
}

/// Update a product. Fields left out keep their stored value; the price
/// is always written.
pub async fn update_product(
    ctx: &Context,
    id: ProductId,
    price: Price,
    fields: ProductFields,
) -> Result<(), CommandError> {
    ctx.client.require_admin().await?;
    let update = NewProduct {
        name: fields.name,
        description: fields.description.unwrap_or_default(),
        price,
        stock: match fields.stock {
            Some(stock) => stock.trim().parse().map_err(|_| {
                CommandError::InvalidArgument(format!("invalid stock: {stock}"))
            })?,
            None => 0,
        },
        image: fields.image.unwrap_or_default(),
    };
    if update.stock < 0 {
        return Err(CommandError::InvalidArgument("stock cannot be negative".into()));
    }
    ctx.client.update_product(id, &update).await?;
    ctx.done(&format!("Product #{id} updated"))
}

/// Delete a product.
pub async fn delete_product(ctx: &Context, id: ProductId) -> Result<(), CommandError> {
    ctx.client.require_admin().await?;
    ctx.client.delete_product(id).await?;
    ctx.done(&format!("Product #{id} deleted"))
}

/// List every order in the store.
pub async fn list_orders(
    ctx: &Context,
    status: &StatusFilter,
    query: &str,
) -> Result<(), CommandError> {
    ctx.client.require_admin().await?;
    let orders = ctx.client.all_orders().await?;
    let orders = filter_orders(&orders, status, query);
    ctx.emit(&orders, |out: &mut dyn Write| write_orders(out, &orders))
}

/// Set an order's status.
pub async fn set_order_status(
    ctx: &Context,
    id: OrderId,
    status: &OrderStatus,
) -> Result<(), CommandError> {
    ctx.client.require_admin().await?;
    ctx.client.update_order_status(id, status).await?;
    ctx.done(&format!("Order #{id} is now {status}"))
}
