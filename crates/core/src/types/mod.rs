//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for the storefront backend's
//! payloads and the small amount of client-side shaping done on them.

pub mod builder;
pub mod cart;
pub mod catalog;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod profile;
pub mod status;

pub use builder::{BuilderError, BulkBuilder, DraftField, DraftRow, RowErrors};
pub use cart::{CartAddItem, CartLine, DEFAULT_QUANTITY_CAP, cart_total};
pub use catalog::{NewProduct, Product, ProductListItem, ProductSort, search_and_sort};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Order, StatusFilter, filter_orders};
pub use price::{Price, PriceError};
pub use profile::Profile;
pub use status::{OrderStatus, Role};
