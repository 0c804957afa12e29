//! Per-session controllers.
//!
//! Each controller owns the observable state for one screen area and
//! translates user intents into service calls. The discipline is the same
//! everywhere: the loading flag is cleared before the result is reported,
//! a failed mutation leaves the previously loaded state untouched, and
//! successful mutations reload server truth rather than patching local
//! state.

use cloudberry_core::ProductId;

use crate::auth::AuthService;
use crate::cart::CartService;
use crate::catalog::CatalogService;
use crate::models::{Cart, Product};

use super::Observable;

// =============================================================================
// Auth
// =============================================================================

/// State of the sign-in flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No attempt in progress.
    #[default]
    Idle,
    /// An attempt is waiting on the provider.
    InFlight,
    /// The last attempt succeeded.
    SignedIn,
    /// The last attempt failed with a display message.
    Failed(String),
}

/// Controller for the authentication flow.
pub struct AuthController {
    auth: AuthService,
    state: Observable<AuthState>,
    signed_in: Observable<bool>,
}

impl AuthController {
    #[must_use]
    pub fn new(auth: AuthService) -> Self {
        let signed_in = Observable::new(auth.is_signed_in());
        Self {
            auth,
            state: Observable::default(),
            signed_in,
        }
    }

    /// Observable sign-in flow state.
    #[must_use]
    pub fn state(&self) -> &Observable<AuthState> {
        &self.state
    }

    /// Observable signed-in flag.
    #[must_use]
    pub fn signed_in(&self) -> &Observable<bool> {
        &self.signed_in
    }

    /// Register a new account.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str, confirm: &str) {
        self.state.set(AuthState::InFlight);
        match self.auth.sign_up(name, email, password, confirm).await {
            Ok(_) => {
                self.signed_in.set(true);
                self.state.set(AuthState::SignedIn);
            }
            Err(e) => self.state.set(AuthState::Failed(e.to_string())),
        }
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) {
        self.state.set(AuthState::InFlight);
        match self.auth.sign_in(email, password).await {
            Ok(_) => {
                self.signed_in.set(true);
                self.state.set(AuthState::SignedIn);
            }
            Err(e) => self.state.set(AuthState::Failed(e.to_string())),
        }
    }

    /// Sign in with a federated identity token.
    pub async fn sign_in_with_token(&self, id_token: &str) {
        self.state.set(AuthState::InFlight);
        match self.auth.sign_in_with_token(id_token).await {
            Ok(_) => {
                self.signed_in.set(true);
                self.state.set(AuthState::SignedIn);
            }
            Err(e) => self.state.set(AuthState::Failed(e.to_string())),
        }
    }

    /// Sign out and reset the flow state.
    pub fn sign_out(&self) {
        self.auth.sign_out();
        self.signed_in.set(false);
        self.state.set(AuthState::Idle);
    }

    /// Reset the flow state (e.g. when leaving the sign-in screen).
    pub fn reset_state(&self) {
        self.state.set(AuthState::Idle);
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Controller for product browsing.
pub struct CatalogController {
    catalog: CatalogService,
    products: Observable<Vec<Product>>,
    selected: Observable<Option<Product>>,
    loading: Observable<bool>,
    error: Observable<Option<String>>,
}

impl CatalogController {
    #[must_use]
    pub fn new(catalog: CatalogService) -> Self {
        Self {
            catalog,
            products: Observable::default(),
            selected: Observable::default(),
            loading: Observable::default(),
            error: Observable::default(),
        }
    }

    /// Observable product list.
    #[must_use]
    pub fn products(&self) -> &Observable<Vec<Product>> {
        &self.products
    }

    /// Observable selected product.
    #[must_use]
    pub fn selected(&self) -> &Observable<Option<Product>> {
        &self.selected
    }

    /// Observable loading flag.
    #[must_use]
    pub fn loading(&self) -> &Observable<bool> {
        &self.loading
    }

    /// Observable error message.
    #[must_use]
    pub fn error(&self) -> &Observable<Option<String>> {
        &self.error
    }

    /// Load the product list.
    pub async fn load_products(&self) {
        self.loading.set(true);
        self.error.set(None);
        let result = self.catalog.fetch_products().await;
        self.loading.set(false);

        match result {
            Ok(products) => self.products.set(products),
            Err(e) => self.error.set(Some(e.to_string())),
        }
    }

    /// Load one product into the selection.
    pub async fn select_product(&self, product_id: &ProductId) {
        self.loading.set(true);
        let result = self.catalog.fetch_product(product_id).await;
        self.loading.set(false);

        match result {
            Ok(product) => self.selected.set(product),
            Err(e) => self.error.set(Some(e.to_string())),
        }
    }

    /// Clear the error message.
    pub fn clear_error(&self) {
        self.error.set(None);
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Controller for the cart and checkout.
pub struct CartController {
    carts: CartService,
    cart: Observable<Option<Cart>>,
    loading: Observable<bool>,
    error: Observable<Option<String>>,
    notice: Observable<Option<String>>,
}

impl CartController {
    #[must_use]
    pub fn new(carts: CartService) -> Self {
        Self {
            carts,
            cart: Observable::default(),
            loading: Observable::default(),
            error: Observable::default(),
            notice: Observable::default(),
        }
    }

    /// Observable cart state; `None` until the first successful load.
    #[must_use]
    pub fn cart(&self) -> &Observable<Option<Cart>> {
        &self.cart
    }

    /// Observable loading flag.
    #[must_use]
    pub fn loading(&self) -> &Observable<bool> {
        &self.loading
    }

    /// Observable error message.
    #[must_use]
    pub fn error(&self) -> &Observable<Option<String>> {
        &self.error
    }

    /// Observable one-shot success notification.
    #[must_use]
    pub fn notice(&self) -> &Observable<Option<String>> {
        &self.notice
    }

    /// Load the cart from the store.
    ///
    /// On failure the previously loaded cart stays on screen; only the
    /// error message changes.
    pub async fn load_cart(&self) {
        self.loading.set(true);
        self.error.set(None);
        let result = self.carts.fetch_cart().await;
        self.loading.set(false);

        match result {
            Ok(cart) => self.cart.set(Some(cart)),
            Err(e) => self.error.set(Some(e.to_string())),
        }
    }

    /// Add a product to the cart, then reload server truth.
    pub async fn add_to_cart(&self, product: &Product, quantity: u32) {
        self.loading.set(true);
        self.error.set(None);
        let result = self.carts.add_item(product, quantity).await;
        self.loading.set(false);

        match result {
            Ok(()) => {
                self.notice.set(Some(format!("{} added to cart", product.name)));
                self.load_cart().await;
            }
            Err(e) => self.error.set(Some(e.to_string())),
        }
    }

    /// Change a line item's quantity (zero removes it), then reload.
    pub async fn update_quantity(&self, product_id: &ProductId, quantity: i64) {
        self.error.set(None);
        match self.carts.set_quantity(product_id, quantity).await {
            Ok(()) => self.load_cart().await,
            Err(e) => self.error.set(Some(e.to_string())),
        }
    }

    /// Remove a line item, then reload.
    pub async fn remove_from_cart(&self, product_id: &ProductId) {
        self.error.set(None);
        match self.carts.remove_item(product_id).await {
            Ok(()) => {
                self.notice.set(Some("Item removed from cart".to_string()));
                self.load_cart().await;
            }
            Err(e) => self.error.set(Some(e.to_string())),
        }
    }

    /// Empty the cart, then reload.
    pub async fn clear_cart(&self) {
        self.error.set(None);
        match self.carts.clear_cart().await {
            Ok(()) => self.load_cart().await,
            Err(e) => self.error.set(Some(e.to_string())),
        }
    }

    /// Convert the currently loaded cart into an order.
    ///
    /// Rejected locally when no cart is loaded or the cart is empty; no
    /// store call is made in either case.
    pub async fn place_order(&self) {
        let Some(cart) = self.cart.get() else {
            return;
        };
        if cart.is_empty() {
            self.error.set(Some("Cart is empty".to_string()));
            return;
        }

        self.loading.set(true);
        self.error.set(None);
        let result = self.carts.place_order(&cart).await;
        self.loading.set(false);

        match result {
            Ok(order_id) => {
                self.notice
                    .set(Some(format!("Order placed successfully (id {order_id})")));
                self.load_cart().await;
            }
            Err(e) => self.error.set(Some(e.to_string())),
        }
    }

    /// Consume the transient messages (after the presentation layer has
    /// shown them).
    pub fn clear_messages(&self) {
        self.error.set(None);
        self.notice.set(None);
    }
}
