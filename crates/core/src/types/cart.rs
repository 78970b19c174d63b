//! Cart payloads.

use serde::{Deserialize, Serialize};

use super::id::{CartItemId, ProductId};
use super::price::Price;

/// One line of the signed-in user's cart (`GET /cart/`).
///
/// The backend renders `product_price` as a string; [`Price`] accepts
/// either a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub product_name: String,
    pub product_price: Price,
    pub quantity: i64,
}

impl CartLine {
    /// Price of the whole line.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product_price.times(self.quantity)
    }
}

/// An entry of the `POST /cart/add` body (the body is an array of these).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartAddItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Cap used when a product reports no stock figure.
pub const DEFAULT_QUANTITY_CAP: i64 = 99;

impl CartAddItem {
    /// Build an add request with the quantity clamped to `1..=stock`.
    ///
    /// A stock of zero or less means the backend did not report one, in
    /// which case [`DEFAULT_QUANTITY_CAP`] applies.
    #[must_use]
    pub fn clamped(product_id: ProductId, quantity: i64, stock: i64) -> Self {
        let cap = if stock > 0 { stock } else { DEFAULT_QUANTITY_CAP };
        Self {
            product_id,
            quantity: quantity.clamp(1, cap),
        }
    }
}

/// Sum of every line's price times quantity, saturating instead of
/// overflowing.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Price {
    lines.iter().map(CartLine::subtotal).sum()
}
