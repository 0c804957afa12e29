//! Catalog read path.
//!
//! Thin by design: the catalog is owned elsewhere and this client only
//! reads it. Bulk reads drop (and log) records that fail to decode;
//! single reads distinguish "absent" from "malformed".

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use cloudberry_core::ProductId;

use crate::error::{Result, ShopError};
use crate::models::Product;
use crate::store::{DocumentStore, collections};

/// Read-only access to the product catalog.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
}

impl CatalogService {
    /// Create a new catalog service over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch all products, unordered.
    ///
    /// A record that fails to decode is logged and dropped; only a failure
    /// of the listing call itself fails the whole fetch.
    ///
    /// # Errors
    ///
    /// Returns a store error if the listing call fails.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> Result<Vec<Product>> {
        let entries = self.store.list(collections::PRODUCTS).await?;

        let products: Vec<Product> = entries
            .iter()
            .filter_map(|(key, doc)| match Product::from_document(key, doc) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(product = %key, error = %e, "skipping undecodable product");
                    None
                }
            })
            .collect();

        debug!(count = products.len(), "products fetched");
        Ok(products)
    }

    /// Fetch one product by identifier.
    ///
    /// Not-found is a valid outcome (`Ok(None)`), distinct from a
    /// malformed target document, which fails the call.
    ///
    /// # Errors
    ///
    /// Returns a store error if the read fails, or `ShopError::Parse` if
    /// the document exists but does not decode.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn fetch_product(&self, product_id: &ProductId) -> Result<Option<Product>> {
        let doc = self
            .store
            .get(collections::PRODUCTS, product_id.as_str())
            .await?;

        match doc {
            None => Ok(None),
            Some(doc) => Product::from_document(product_id.as_str(), &doc)
                .map(Some)
                .map_err(|e| ShopError::Parse(e.to_string())),
        }
    }
}
