//! Public catalog endpoints.

use shopfront_core::{Product, ProductId, ProductListItem};
use tracing::instrument;

use super::decode_list;
use crate::error::Result;
use crate::http::{ApiClient, FetchOptions};

impl ApiClient {
    /// Every product in the catalog (`GET /products`).
    ///
    /// An empty catalog may come back as `null`; that and any other
    /// non-array payload yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductListItem>> {
        let payload = self.call("/products", FetchOptions::get()).await?;
        Ok(decode_list(payload, "product"))
    }

    /// One product (`GET /products/:id`).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the product does not exist.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.call_json(&format!("/products/{id}"), FetchOptions::get(), "product")
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use serde_json::json;
    use shopfront_core::Price;

    use super::*;
    use crate::error::ClientError;
    use crate::testing::{client_for, spawn};

    async fn product(Path(id): Path<i64>) -> Response {
        if id == 1 {
            axum::Json(json!({
                "id": 1,
                "name": "Teapot",
                "description": "Cast iron",
                "price": 2400,
                "stock": 3,
                "image": "teapot.jpg"
            }))
            .into_response()
        } else {
            (StatusCode::NOT_FOUND, "product not found\n").into_response()
        }
    }

    #[tokio::test]
    async fn test_list_and_get_products() {
        let app = Router::new()
            .route(
                "/products",
                get(|| async {
                    axum::Json(json!([
                        {"id": 1, "name": "Teapot", "price": 2400, "image": "teapot.jpg"},
                        {"id": 2, "name": "Cup", "price": 300, "image": ""}
                    ]))
                }),
            )
            .route("/products/{id}", get(product));
        let base = spawn(app).await;
        let client = client_for(&base);

        let list = client.list_products().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.last().unwrap().price, Price::from_rubles(300));

        let teapot = client.get_product(ProductId::new(1)).await.unwrap();
        assert_eq!(teapot.stock, 3);

        let err = client.get_product(ProductId::new(9)).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Api { status: 404, ref message } if message == "product not found"
        ));
    }

    #[tokio::test]
    async fn test_empty_catalog_is_null() {
        let app = Router::new().route("/products", get(|| async { axum::Json(json!(null)) }));
        let base = spawn(app).await;
        assert!(client_for(&base).list_products().await.unwrap().is_empty());
    }
}
