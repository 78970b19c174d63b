//! Catalog commands.

use std::io::Write;

use shopfront_core::{ProductId, ProductSort, search_and_sort};

use super::{CommandError, Context};

/// List products, optionally filtered by name and sorted.
pub async fn list(ctx: &Context, query: &str, sort: ProductSort) -> Result<(), CommandError> {
    let products = ctx.client.list_products().await?;
    let products = search_and_sort(&products, query, sort);

    ctx.emit(&products, |out: &mut dyn Write| {
        if products.is_empty() {
            return writeln!(out, "No products found.");
        }
        writeln!(out, "{:>6}  {:<40}  {:>10}", "ID", "NAME", "PRICE")?;
        for product in &products {
            writeln!(
                out,
                "{:>6}  {:<40}  {:>10}",
                product.id,
                product.name,
                product.price.to_string()
            )?;
        }
        Ok(())
    })
}

/// Show one product.
pub async fn show(ctx: &Context, id: ProductId) -> Result<(), CommandError> {
    let product = ctx.client.get_product(id).await?;
    ctx.emit(&product, |out: &mut dyn Write| {
        writeln!(out, "#{} {}", product.id, product.name)?;
        writeln!(out, "Price: {}", product.price)?;
        writeln!(out, "Stock: {}", product.stock)?;
        if !product.image.is_empty() {
            writeln!(out, "Image: {}", product.image)?;
        }
        if !product.description.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", product.description)?;
        }
        Ok(())
    })
}
