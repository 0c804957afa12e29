//! Cloudberry Core - Shared types library.
//!
//! This crate provides common types used across all Cloudberry Market
//! components:
//! - `shop` - Client-side shopping core (cart, catalog, checkout)
//! - `integration-tests` - End-to-end protocol tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no network clients. This
//! keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and
//!   order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
