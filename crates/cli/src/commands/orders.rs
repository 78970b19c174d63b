//! Order history commands for the signed-in user.

use std::io::Write;

use shopfront_core::{OrderId, StatusFilter, filter_orders};

use super::{CommandError, Context, write_orders};

/// List the user's orders.
pub async fn list(ctx: &Context, status: &StatusFilter) -> Result<(), CommandError> {
    let orders = ctx.client.my_orders().await?;
    let orders = filter_orders(&orders, status, "");
    ctx.emit(&orders, |out: &mut dyn Write| write_orders(out, &orders))
}

/// Show one order.
pub async fn show(ctx: &Context, id: OrderId) -> Result<(), CommandError> {
    let order = ctx.client.order(id).await?;
    ctx.emit(&order, |out: &mut dyn Write| {
        writeln!(out, "Order #{}", order.id)?;
        writeln!(out, "Status:  {}", order.status)?;
        writeln!(out, "Total:   {}", order.total_price)?;
        writeln!(out, "Created: {}", order.created_at.format("%Y-%m-%d %H:%M"))?;
        if order.status.is_cancellable() {
            writeln!(out, "Cancel with `shop orders cancel {}`", order.id)?;
        }
        Ok(())
    })
}

/// Cancel a pending or processing order.
pub async fn cancel(ctx: &Context, id: OrderId) -> Result<(), CommandError> {
    ctx.client.cancel_order(id).await?;
    ctx.done(&format!("Order #{id} canceled"))
}
