//! Document store collaborator.
//!
//! The hosted backend exposes a schema-less document database addressed by
//! collection + key, returning and accepting whole records. This module
//! carries that contract as the [`DocumentStore`] trait plus two
//! implementations:
//!
//! - [`RestDocumentStore`] - client for the hosted document REST API
//! - [`MemoryStore`] - process-local fake with identical observable
//!   semantics, used by tests
//!
//! The store offers no transactions, no field-level patch, and no
//! compare-and-swap; `set` is always a whole-document replace.

mod memory;
mod rest;

pub use memory::MemoryStore;
pub use rest::RestDocumentStore;

use async_trait::async_trait;
use thiserror::Error;

/// A schema-less record: a JSON object exchanged with the store whole.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Collection names used by the shopping core.
pub mod collections {
    /// Catalog products, keyed by catalog identifier.
    pub const PRODUCTS: &str = "products";
    /// Carts, one document per user, keyed by user identifier.
    pub const CARTS: &str = "carts";
    /// Orders, keyed by store-generated identifier.
    pub const ORDERS: &str = "orders";
}

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed (connection, timeout, etc.).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the call with a non-success status.
    #[error("store returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        message: String,
    },

    /// The response body was not valid JSON.
    #[error("response parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response parsed but is missing an expected part.
    #[error("malformed store response: {0}")]
    Malformed(String),
}

/// Contract required of the remote document store.
///
/// `get` treats an absent document as a valid outcome (`Ok(None)`), never
/// an error. `set` overwrites the entire record. `query` filters one
/// collection on field equality; `list` returns the whole collection.
/// `add` stores a new record under a store-generated key and returns it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document by key, or `None` if it does not exist.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;

    /// Overwrite the document under `key` with `document`, creating it if
    /// absent.
    async fn set(&self, collection: &str, key: &str, document: Document)
    -> Result<(), StoreError>;

    /// All documents in `collection` whose `field` equals `value`.
    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<(String, Document)>, StoreError>;

    /// All documents in `collection`, unordered.
    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError>;

    /// Store `document` under a generated key and return that key.
    async fn add(&self, collection: &str, document: Document) -> Result<String, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Status {
            status: 429,
            message: "slow down".to_string(),
        };
        assert_eq!(err.to_string(), "store returned 429: slow down");

        let err = StoreError::Malformed("add response missing id".to_string());
        assert_eq!(
            err.to_string(),
            "malformed store response: add response missing id"
        );
    }
}
