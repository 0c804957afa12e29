//! Per-session state.
//!
//! A [`Session`] owns one controller set over shared service handles. It
//! is created when the app session starts and dropped when it ends;
//! dropping it closes every observable subscription, so no session state
//! outlives the session that produced it. Nothing here is a process-wide
//! global.

mod controllers;
mod observable;

pub use controllers::{AuthController, AuthState, CartController, CatalogController};
pub use observable::Observable;

use std::sync::Arc;

use crate::auth::{AuthService, IdentityProvider, RestIdentityProvider};
use crate::cart::CartService;
use crate::catalog::CatalogService;
use crate::config::ShopConfig;
use crate::store::{DocumentStore, RestDocumentStore};

/// One app session: auth, catalog, and cart controllers over shared
/// collaborator handles.
pub struct Session {
    auth: AuthController,
    catalog: CatalogController,
    cart: CartController,
}

impl Session {
    /// Create a session over explicit collaborators (tests inject fakes
    /// here).
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            auth: AuthController::new(AuthService::new(Arc::clone(&identity))),
            catalog: CatalogController::new(CatalogService::new(Arc::clone(&store))),
            cart: CartController::new(CartService::new(store, identity)),
        }
    }

    /// Create a session wired to the hosted backend.
    #[must_use]
    pub fn connect(config: &ShopConfig) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(RestDocumentStore::new(config));
        let identity: Arc<dyn IdentityProvider> = Arc::new(RestIdentityProvider::new(config));
        Self::new(store, identity)
    }

    /// The authentication controller.
    #[must_use]
    pub fn auth(&self) -> &AuthController {
        &self.auth
    }

    /// The product browsing controller.
    #[must_use]
    pub fn catalog(&self) -> &CatalogController {
        &self.catalog
    }

    /// The cart and checkout controller.
    #[must_use]
    pub fn cart(&self) -> &CartController {
        &self.cart
    }
}
