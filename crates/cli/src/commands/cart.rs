//! Cart and checkout commands.

use std::io::{self, Write};

use serde::Serialize;
use shopfront_core::{CartItemId, CartLine, Price, ProductId, cart_total};

use super::{CommandError, Context};

#[derive(Serialize)]
struct CartView<'a> {
    lines: &'a [CartLine],
    total: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    cart_cleared: Option<bool>,
}

fn write_lines(out: &mut dyn Write, lines: &[CartLine], total: Price) -> io::Result<()> {
    writeln!(
        out,
        "{:>6}  {:<32}  {:>10}  {:>4}  {:>10}",
        "LINE", "PRODUCT", "PRICE", "QTY", "SUBTOTAL"
    )?;
    for line in lines {
        writeln!(
            out,
            "{:>6}  {:<32}  {:>10}  {:>4}  {:>10}",
            line.id,
            line.product_name,
            line.product_price.to_string(),
            line.quantity,
            line.subtotal().to_string()
        )?;
    }
    writeln!(out, "Total: {total}")
}

/// Show the cart.
pub async fn show(ctx: &Context) -> Result<(), CommandError> {
    let lines = ctx.client.cart().await?;
    let total = cart_total(&lines);
    ctx.emit(
        &CartView {
            lines: &lines,
            total,
            cart_cleared: None,
        },
        |out: &mut dyn Write| {
            if lines.is_empty() {
                writeln!(out, "Your cart is empty.")
            } else {
                write_lines(out, &lines, total)
            }
        },
    )
}

/// Add a product to the cart. The quantity is capped at the product's stock.
pub async fn add(ctx: &Context, product_id: ProductId, quantity: i64) -> Result<(), CommandError> {
    ctx.client.require_credential()?;
    let product = ctx.client.get_product(product_id).await?;
    let item = ctx.client.add_to_cart(&product, quantity).await?;

    if item.quantity == quantity {
        ctx.done(&format!("Added {} x {}", item.quantity, product.name))
    } else {
        ctx.done(&format!(
            "Added {} x {} (requested {quantity})",
            item.quantity, product.name
        ))
    }
}

/// Remove a cart line.
pub async fn remove(ctx: &Context, line: CartItemId) -> Result<(), CommandError> {
    ctx.client.remove_from_cart(line).await?;
    ctx.done(&format!("Removed line {line}"))
}

/// Empty the cart.
pub async fn clear(ctx: &Context) -> Result<(), CommandError> {
    ctx.client.clear_cart().await?;
    ctx.done("Cart cleared")
}

/// Place an order for everything in the cart.
pub async fn checkout(ctx: &Context) -> Result<(), CommandError> {
    let checkout = ctx.client.checkout().await?;
    let view = CartView {
        lines: &checkout.lines,
        total: checkout.total,
        cart_cleared: Some(checkout.cart_cleared),
    };
    ctx.emit(&view, |out: &mut dyn Write| {
        write_lines(out, &checkout.lines, checkout.total)?;
        writeln!(out, "Order placed.")?;
        if !checkout.cart_cleared {
            writeln!(
                out,
                "The cart could not be emptied; run `shop cart clear` before ordering again."
            )?;
        }
        Ok(())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_write_lines() {
        let lines: Vec<CartLine> = serde_json::from_str(
            r#"[{"id":4,"product_name":"Cup","product_price":"300","quantity":2}]"#,
        )
        .unwrap();
        let mut out = Vec::new();
        write_lines(&mut out, &lines, cart_total(&lines)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Cup"));
        assert!(text.ends_with("Total: 600\n"));
    }
}
