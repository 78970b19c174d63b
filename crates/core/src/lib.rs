//! Shopfront Core - Shared types library.
//!
//! This crate provides common types used across all Shopfront components:
//! - `client` - Session storage, HTTP JSON client, and typed API wrappers
//! - `cli` - The `shop` command-line storefront client
//!
//! # Architecture
//!
//! The core crate contains only types and pure data shaping - no I/O, no
//! storage, no HTTP clients. Everything here mirrors a payload owned by the
//! storefront backend, so it can be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, statuses, and backend payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
