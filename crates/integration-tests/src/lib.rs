//! Integration tests for Cloudberry Market.
//!
//! The tests in `tests/` exercise the full cart/order protocol against
//! the in-memory store fake, which reproduces the remote store's
//! observable semantics (whole-document replace, last-writer-wins,
//! generated keys). No network or credentials are required.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cloudberry-integration-tests
//! ```
//!
//! This crate also provides shared helpers: fixture builders and a store
//! wrapper whose writes can be made to fail, for exercising the
//! partial-failure paths (e.g. an order that commits while the follow-up
//! cart clear fails).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;

use cloudberry_core::{Price, ProductId};
use cloudberry_shop::models::Product;
use cloudberry_shop::store::{Document, DocumentStore, StoreError};

/// Build a catalog product fixture priced in cents.
///
/// # Panics
///
/// Panics if `cents` is negative (test fixture misuse).
#[must_use]
pub fn product(id: &str, name: &str, cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        description: format!("{name} description"),
        price: Price::new(Decimal::new(cents, 2)).expect("fixture price must be non-negative"),
        image_url: format!("https://img.example/{id}.jpg"),
        stock: 25,
        category: "fixtures".to_owned(),
    }
}

/// Store wrapper that forwards to an inner store but fails every `set`
/// while the switch is on.
pub struct FailingWrites<S> {
    inner: S,
    fail_sets: Arc<AtomicBool>,
}

impl<S> FailingWrites<S> {
    /// Wrap `inner`; writes succeed until [`Self::fail_sets`] flips the
    /// switch.
    #[must_use]
    pub fn new(inner: S) -> (Self, Arc<AtomicBool>) {
        let switch = Arc::new(AtomicBool::new(false));
        (
            Self {
                inner,
                fail_sets: Arc::clone(&switch),
            },
            switch,
        )
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for FailingWrites<S> {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, key).await
    }

    async fn set(
        &self,
        collection: &str,
        key: &str,
        document: Document,
    ) -> Result<(), StoreError> {
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(StoreError::Status {
                status: 503,
                message: "injected write failure".to_string(),
            });
        }
        self.inner.set(collection, key, document).await
    }

    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<(String, Document)>, StoreError> {
        self.inner.query(collection, field, value).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        self.inner.list(collection).await
    }

    async fn add(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        self.inner.add(collection, document).await
    }
}
