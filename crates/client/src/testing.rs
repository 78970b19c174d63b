//! Helpers for tests that need a live backend.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::http::ApiClient;
use crate::session::Session;
use crate::storage::MemoryStorage;

/// Serve `app` on an ephemeral local port and return its base URL.
#[allow(clippy::unwrap_used)]
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A client with in-memory storage pointed at `base`.
#[allow(clippy::unwrap_used)]
pub fn client_for(base: &str) -> ApiClient {
    let session = Session::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(MemoryStorage::new()),
    );
    session.set_base_url(base).unwrap();
    ApiClient::new(session).unwrap()
}

/// A signed-in client pointed at `base`.
#[allow(clippy::unwrap_used)]
pub fn signed_in(base: &str, token: &str) -> ApiClient {
    let client = client_for(base);
    client.session().set_credential(token).unwrap();
    client
}
