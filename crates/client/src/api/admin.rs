//! Product management endpoints. The backend only accepts these from admin
//! accounts.

use shopfront_core::{BulkBuilder, NewProduct, ProductId};
use tracing::{info, instrument};

use super::to_body;
use crate::error::{ClientError, Result};
use crate::http::{ApiClient, FetchOptions};

impl ApiClient {
    /// Create products in one request (`POST /products`).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for an empty list, or the
    /// backend's error. The backend inserts all or none.
    #[instrument(skip(self, products), fields(count = products.len()))]
    pub async fn create_products(&self, products: &[NewProduct]) -> Result<()> {
        if products.is_empty() {
            return Err(ClientError::InvalidInput("no products to create".into()));
        }
        self.require_credential()?;
        self.call("/products", FetchOptions::post(to_body(&products)?).auth())
            .await?;
        info!("Products created");
        Ok(())
    }

    /// Validate every draft row and create the products.
    ///
    /// Returns the number of products sent.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` without sending anything while any
    /// row has errors.
    pub async fn submit_builder(&self, builder: &BulkBuilder) -> Result<usize> {
        let products = builder.payload()?;
        self.create_products(&products).await?;
        Ok(products.len())
    }

    /// Update a product (`PUT /products/:id`).
    ///
    /// Empty text fields and a zero stock leave the stored values alone.
    /// The price is always written, so it must be positive.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for a non-positive price, or the
    /// backend's error.
    #[instrument(skip(self, update))]
    pub async fn update_product(&self, id: ProductId, update: &NewProduct) -> Result<()> {
        if !update.price.is_positive() {
            return Err(ClientError::InvalidInput(
                "price must be greater than 0".into(),
            ));
        }
        self.require_credential()?;
        self.call(
            &format!("/products/{id}"),
            FetchOptions::put(to_body(update)?).auth(),
        )
        .await?;
        info!("Product updated");
        Ok(())
    }

    /// Delete a product (`DELETE /products/:id`).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.require_credential()?;
        self.call(&format!("/products/{id}"), FetchOptions::delete().auth())
            .await?;
        info!("Product deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::{Json, Path};
    use axum::http::StatusCode;
    use axum::routing::{post, put};
    use serde_json::{Value, json};
    use shopfront_core::{DraftField, Price};

    use super::*;
    use crate::testing::{signed_in, spawn};

    type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    fn app(seen: Seen) -> Router {
        let on_post = seen.clone();
        Router::new()
            .route(
                "/products",
                post(move |Json(body): Json<Value>| async move {
                    on_post.lock().unwrap().push(("POST".into(), body));
                    Json(json!({"message": "Products posted!"}))
                }),
            )
            .route(
                "/products/{id}",
                put({
                    let seen = seen.clone();
                    move |Path(id): Path<i64>, Json(body): Json<Value>| async move {
                        seen.lock().unwrap().push((format!("PUT {id}"), body));
                        Json(json!({"message": "Updated successfully!"}))
                    }
                })
                .delete(move |Path(id): Path<i64>| async move {
                    seen.lock().unwrap().push((format!("DELETE {id}"), Value::Null));
                    if id == 404 {
                        (StatusCode::SERVICE_UNAVAILABLE, "User can't to delete products!\n")
                    } else {
                        (StatusCode::OK, "deleted")
                    }
                }),
            )
    }

    fn teapot() -> NewProduct {
        NewProduct {
            name: "Teapot".into(),
            description: "Cast iron".into(),
            price: Price::from_rubles(2400),
            stock: 3,
            image: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let seen = Seen::default();
        let base = spawn(app(seen.clone())).await;
        let client = signed_in(&base, "tok");

        client.create_products(&[teapot()]).await.unwrap();
        client.update_product(ProductId::new(5), &teapot()).await.unwrap();
        client.delete_product(ProductId::new(5)).await.unwrap();

        let err = client.delete_product(ProductId::new(404)).await.unwrap_err();
        assert_eq!(err.status(), Some(503));

        let seen = seen.lock().unwrap();
        let routes: Vec<&str> = seen.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(routes, vec!["POST", "PUT 5", "DELETE 5", "DELETE 404"]);
        assert_eq!(
            seen.first().unwrap().1,
            json!([{
                "name": "Teapot",
                "description": "Cast iron",
                "price": 2400,
                "stock": 3,
                "image": ""
            }])
        );
    }

    #[tokio::test]
    async fn test_update_rejects_non_positive_price() {
        let client = signed_in("http://127.0.0.1:9", "tok");
        let update = NewProduct {
            price: Price::ZERO,
            ..teapot()
        };
        assert!(matches!(
            client.update_product(ProductId::new(1), &update).await,
            Err(ClientError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_builder() {
        let seen = Seen::default();
        let base = spawn(app(seen.clone())).await;
        let client = signed_in(&base, "tok");

        let mut builder = BulkBuilder::new();
        let key = builder.rows().first().unwrap().key;
        builder.update(key, DraftField::Name, "Cup").unwrap();
        assert!(matches!(
            client.submit_builder(&builder).await,
            Err(ClientError::Validation(_))
        ));
        assert!(seen.lock().unwrap().is_empty());

        builder.update(key, DraftField::Price, "300").unwrap();
        assert_eq!(client.submit_builder(&builder).await.unwrap(), 1);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_empty_list_is_rejected() {
        let client = signed_in("http://127.0.0.1:9", "tok");
        assert!(matches!(
            client.create_products(&[]).await,
            Err(ClientError::InvalidInput(_))
        ));
    }
}
