//! Cloudberry Shop - client-side shopping core.
//!
//! This crate owns the cart/order consistency logic for the Cloudberry
//! Market shopping client: how a cart is read, merged, mutated, and
//! converted into an order against a hosted document store that provides
//! no transactional guarantees to the client.
//!
//! # Architecture
//!
//! - The hosted backend is the source of truth - no local persistence,
//!   every screen activation re-fetches
//! - Durable state is three document collections (`products`, `carts`,
//!   `orders`), addressed by catalog key, user key, and generated key
//! - Every cart mutation is fetch -> transform in memory -> whole-document
//!   overwrite; there is no version check, so concurrent writers race and
//!   the last writer wins (see [`cart::CartService`])
//!
//! # Modules
//!
//! - [`store`] - Document store collaborator: trait, REST client, test fake
//! - [`auth`] - Identity collaborator and credential validation
//! - [`models`] - Domain documents and their codecs
//! - [`cart`] - The cart/order service (the core of this crate)
//! - [`catalog`] - Catalog read path
//! - [`session`] - Per-session observable state containers
//! - [`config`] - Environment configuration
//! - [`error`] - Error taxonomy

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod store;
pub mod telemetry;

pub use error::{Result, ShopError};
