//! Cart endpoints and checkout.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shopfront_core::{CartAddItem, CartItemId, CartLine, OrderStatus, Price, Product, cart_total};
use tracing::{info, instrument, warn};

use super::{decode_list, to_body};
use crate::error::{ClientError, Result};
use crate::http::{ApiClient, FetchOptions};

/// Body of `POST /orders/`.
#[derive(Debug, Serialize)]
struct NewOrder {
    status: OrderStatus,
    total_price: Price,
    created_at: DateTime<Utc>,
}

/// What a successful checkout ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub lines: Vec<CartLine>,
    pub total: Price,
    /// Whether the cart was emptied afterwards.
    pub cart_cleared: bool,
}

impl ApiClient {
    /// The signed-in user's cart (`GET /cart/`).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a credential, or the
    /// backend's error.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<Vec<CartLine>> {
        self.require_credential()?;
        let payload = self.call("/cart/", FetchOptions::get().auth()).await?;
        Ok(decode_list(payload, "cart line"))
    }

    /// Add `quantity` of `product`, clamped to what is in stock.
    ///
    /// Returns the item as sent.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` before any request when no
    /// credential is stored, or the backend's error.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_to_cart(&self, product: &Product, quantity: i64) -> Result<CartAddItem> {
        self.require_credential()?;
        let item = CartAddItem::clamped(product.id, quantity, product.stock);
        self.call("/cart/add", FetchOptions::post(to_body(&[item])?).auth())
            .await?;
        info!(quantity = item.quantity, "Added to cart");
        Ok(item)
    }

    /// Remove one cart line (`POST /cart/remove`).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, line: CartItemId) -> Result<()> {
        self.require_credential()?;
        let body = serde_json::json!({ "id": line });
        self.call("/cart/remove", FetchOptions::post(body).auth())
            .await?;
        Ok(())
    }

    /// Empty the cart (`DELETE /cart/clear`).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<()> {
        self.require_credential()?;
        self.call("/cart/clear", FetchOptions::delete().auth())
            .await?;
        Ok(())
    }

    /// Turn the cart into a pending order, then empty the cart.
    ///
    /// The cart is only cleared once the order exists. A failure to clear
    /// it is logged and reported in [`Checkout::cart_cleared`].
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for an empty cart or a total that
    /// does not fit the backend's integer column, or the error
    /// of loading the cart or creating the order.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<Checkout> {
        let lines = self.cart().await?;
        if lines.is_empty() {
            return Err(ClientError::InvalidInput("cart is empty".into()));
        }

        let total = cart_total(&lines);
        if total.whole_rubles().is_none() {
            return Err(ClientError::InvalidInput(format!(
                "cart total {total} is not a whole ruble amount the backend can store"
            )));
        }
        let order = NewOrder {
            status: OrderStatus::Pending,
            total_price: total,
            created_at: Utc::now(),
        };
        self.call("/orders/", FetchOptions::post(to_body(&order)?).auth())
            .await?;
        info!(%total, lines = lines.len(), "Order placed");

        let cart_cleared = match self.clear_cart().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Order placed but the cart could not be cleared");
                false
            }
        };

        Ok(Checkout {
            lines,
            total,
            cart_cleared,
        })
    }
}
