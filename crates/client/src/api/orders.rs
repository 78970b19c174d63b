//! Order history, cancellation, and the admin order listing.

use chrono::Utc;
use serde_json::{Value, json};
use shopfront_core::{Order, OrderId, OrderStatus};
use tracing::{debug, info, instrument, warn};

use super::decode_list;
use crate::error::{ClientError, Result};
use crate::http::{ApiClient, FetchOptions, Payload};

/// Endpoints tried, in order, for the admin listing of every order.
///
/// Backends differ in where they expose it; the first one that answers
/// with a JSON array wins.
pub const ADMIN_LISTING_CANDIDATES: [&str; 3] = ["/orders/getall", "/orders/all", "/orders/"];

impl ApiClient {
    /// The signed-in user's orders (`GET /orders/`).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a credential, or the
    /// backend's error.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>> {
        self.require_credential()?;
        let payload = self.call("/orders/", FetchOptions::get().auth()).await?;
        Ok(decode_list(payload, "order"))
    }

    /// One of the signed-in user's orders (`GET /orders/:id`).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the order is not the user's.
    #[instrument(skip(self))]
    pub async fn order(&self, id: OrderId) -> Result<Order> {
        self.require_credential()?;
        self.call_json(&format!("/orders/{id}"), FetchOptions::get().auth(), "order")
            .await
    }

    /// Cancel one of the signed-in user's orders.
    ///
    /// The order is looked up first; only pending and processing orders
    /// may be canceled.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` if the order's status does not
    /// allow cancellation, or the backend's error.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, id: OrderId) -> Result<Order> {
        let mut order = self.order(id).await?;
        if !order.status.is_cancellable() {
            return Err(ClientError::InvalidInput(format!(
                "order {id} is {} and can no longer be canceled",
                order.status
            )));
        }
        self.update_order_status(id, &OrderStatus::Canceled).await?;
        order.status = OrderStatus::Canceled;
        Ok(order)
    }

    /// Set an order's status (`POST /orders/update`). Admin only.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails; the backend rejects non-admin
    /// accounts.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, id: OrderId, status: &OrderStatus) -> Result<()> {
        self.require_credential()?;
        let body = json!({ "id": id, "status": status.as_str() });
        self.call("/orders/update", FetchOptions::post(body).auth())
            .await?;
        info!(%status, "Order status updated");
        Ok(())
    }

    /// Every order in the store, for admins.
    ///
    /// Tries each of [`ADMIN_LISTING_CANDIDATES`] until one returns an
    /// array. Items are decoded with [`Order::from_loose`]. When no
    /// candidate yields an array, the last error is returned, or an empty
    /// list if the last candidate answered with something else.
    ///
    /// # Errors
    ///
    /// Returns the last candidate's error when none returned an array.
    #[instrument(skip(self))]
    pub async fn all_orders(&self) -> Result<Vec<Order>> {
        self.require_credential()?;

        let mut last_error = None;
        for path in ADMIN_LISTING_CANDIDATES {
            match self.call(path, FetchOptions::get().auth()).await {
                Ok(Payload::Json(Value::Array(items))) => {
                    debug!(path, count = items.len(), "Order listing found");
                    let now = Utc::now();
                    return Ok(items
                        .iter()
                        .enumerate()
                        .map(|(position, raw)| Order::from_loose(raw, position, now))
                        .collect());
                }
                Ok(_) => {
                    debug!(path, "Order listing candidate did not return an array");
                    last_error = None;
                }
                Err(e) => {
                    debug!(path, error = %e, "Order listing candidate failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => {
                warn!(error = %e, "No order listing endpoint answered");
                Err(e)
            }
            None => Ok(Vec::new()),
        }
    }
}
