//! Unified error handling for the shopping core.
//!
//! Every service operation returns `Result<T, ShopError>`; nothing in this
//! crate panics into the presentation layer. Controllers turn these errors
//! into display messages - the error itself carries a human-readable
//! description via `Display`.

use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Application-level error type for the shopping core.
#[derive(Debug, Error)]
pub enum ShopError {
    /// No signed-in user; all cart/order operations require one.
    #[error("not signed in")]
    Unauthenticated,

    /// Operation requires a document that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Checkout was attempted on a cart with no items.
    #[error("cart is empty")]
    EmptyCart,

    /// Remote document store call failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A fetched document did not decode to the expected shape.
    #[error("malformed document: {0}")]
    Parse(String),

    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
}

/// Result type alias for `ShopError`.
pub type Result<T> = std::result::Result<T, ShopError>;
