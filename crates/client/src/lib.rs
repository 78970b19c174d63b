//! Shopfront client library.
//!
//! Talks to the storefront REST backend on behalf of one signed-in user:
//!
//! - [`storage`] and [`session`] - the credential and base URL, kept across runs
//! - [`http`] - one-request JSON client with a uniform result envelope
//! - [`api`] - typed wrappers for auth, catalog, cart, orders, and admin
//! - [`config`] - environment-driven setup
//!
//! ```no_run
//! use shopfront_client::{ApiClient, ClientConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::from_config(&ClientConfig::from_env()?)?;
//! for product in client.list_products().await? {
//!     println!("{} {}", product.id, product.name);
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod storage;
pub mod urls;

#[cfg(test)]
mod testing;

pub use api::auth::Registration;
pub use api::cart::Checkout;
pub use api::orders::ADMIN_LISTING_CANDIDATES;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, Result};
pub use http::{ApiClient, Envelope, FetchOptions, Payload};
pub use session::Session;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
