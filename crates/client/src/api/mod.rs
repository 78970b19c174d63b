//! Typed wrappers over the backend's REST endpoints.
//!
//! Each submodule adds methods to [`ApiClient`](crate::ApiClient):
//!
//! - [`auth`] - login, registration, profile
//! - [`catalog`] - public product listing
//! - [`cart`] - cart lines and checkout
//! - [`orders`] - order history, cancellation, admin listing
//! - [`admin`] - product management

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;

use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::http::Payload;

/// Decode a listing, tolerating a non-array payload (`null` for an empty
/// table) and skipping items that do not fit `T`.
pub(crate) fn decode_list<T: serde::de::DeserializeOwned>(
    payload: Payload,
    what: &'static str,
) -> Vec<T> {
    let Value::Array(items) = payload.into_value() else {
        return Vec::new();
    };
    items
        .into_iter()
        .enumerate()
        .filter_map(|(position, item)| {
            serde_json::from_value(item)
                .inspect_err(|e| warn!(what, position, error = %e, "Skipping malformed list item"))
                .ok()
        })
        .collect()
}

/// Serialize a request body.
pub(crate) fn to_body<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|source| crate::ClientError::Decode {
        what: "request body",
        source,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use shopfront_core::ProductListItem;

    use super::*;

    #[test]
    fn test_decode_list_null_is_empty() {
        let items: Vec<ProductListItem> = decode_list(Payload::Json(Value::Null), "products");
        assert!(items.is_empty());
        let items: Vec<ProductListItem> = decode_list(Payload::Text(String::new()), "products");
        assert!(items.is_empty());
    }

    #[test]
    fn test_decode_list_skips_malformed_items() {
        let payload = Payload::Json(json!([
            {"id": 1, "name": "Mug", "price": 250},
            {"id": "x"},
            {"id": 2, "name": "Tea", "price": 90, "image": "tea.png"}
        ]));
        let items: Vec<ProductListItem> = decode_list(payload, "products");
        let names: Vec<&str> = items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Mug", "Tea"]);
    }
}
