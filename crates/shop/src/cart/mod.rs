//! Cart and order operations.
//!
//! Every mutation here follows the same non-atomic pattern against the
//! document store: fetch the whole cart document, transform the item
//! sequence in memory, overwrite the whole document under a fresh
//! timestamp. The store offers no transactions, no field-level patch, and
//! no compare-and-swap, so two concurrent mutations of the same cart (a
//! rapid double-tap, a second device) race and the last write silently
//! wins. That lost-update window is a structural property of the protocol,
//! not a bug in one operation; hardening it would mean a conditional
//! update keyed on a version field (see DESIGN.md).
//!
//! All operations are scoped to the currently signed-in user and fail
//! with [`ShopError::Unauthenticated`] before any store call when no
//! identity is available.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use cloudberry_core::{OrderId, ProductId, UserId};

use crate::auth::IdentityProvider;
use crate::error::{Result, ShopError};
use crate::models::{Cart, CartLineItem, Order, Product, cart_document, order_document};
use crate::store::{DocumentStore, collections};

/// Service owning the read-merge-write protocol for cart mutation and the
/// cart-to-order conversion.
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl CartService {
    /// Create a new cart service over the given collaborators.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    fn require_user(&self) -> Result<UserId> {
        self.identity
            .current_user_id()
            .ok_or(ShopError::Unauthenticated)
    }

    /// Read the current item sequence, treating an absent cart document as
    /// an empty sequence.
    async fn read_items(&self, user_id: &UserId) -> Result<Vec<CartLineItem>> {
        let doc = self.store.get(collections::CARTS, user_id.as_str()).await?;
        Ok(doc
            .map(|doc| Cart::from_document(user_id.clone(), &doc).items)
            .unwrap_or_default())
    }

    /// Read the current item sequence, failing if no cart document exists.
    async fn read_existing_items(&self, user_id: &UserId) -> Result<Vec<CartLineItem>> {
        let doc = self
            .store
            .get(collections::CARTS, user_id.as_str())
            .await?
            .ok_or_else(|| ShopError::NotFound(format!("cart for user {user_id}")))?;
        Ok(Cart::from_document(user_id.clone(), &doc).items)
    }

    /// Overwrite the cart document with `items` under a fresh timestamp.
    async fn write_items(&self, user_id: &UserId, items: &[CartLineItem]) -> Result<()> {
        self.store
            .set(
                collections::CARTS,
                user_id.as_str(),
                cart_document(user_id, items),
            )
            .await?;
        Ok(())
    }

    /// Fetch the current user's cart.
    ///
    /// An absent cart document is not an error: a synthesized empty cart
    /// (id = user id) is returned and nothing is written.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthenticated` when nobody is signed in, or with a
    /// store error if the read fails.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<Cart> {
        let user_id = self.require_user()?;

        let cart = match self.store.get(collections::CARTS, user_id.as_str()).await? {
            Some(doc) => Cart::from_document(user_id, &doc),
            None => Cart::empty(user_id),
        };

        debug!(items = cart.items.len(), "cart fetched");
        Ok(cart)
    }

    /// Add `quantity` units of `product` to the cart.
    ///
    /// Accumulative: if a line item for the same product already exists,
    /// its quantity grows by `quantity`; it is never overwritten. A new
    /// product appends a snapshot line item. The whole item sequence is
    /// then written back - with no concurrency check, so a concurrent add
    /// from the same user can be lost to a later writer.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthenticated` when nobody is signed in, or with a
    /// store error if the read or write fails.
    #[instrument(skip(self, product), fields(product_id = %product.id, quantity))]
    pub async fn add_item(&self, product: &Product, quantity: u32) -> Result<()> {
        let user_id = self.require_user()?;

        let mut items = self.read_items(&user_id).await?;

        match items.iter_mut().find(|item| item.product_id == product.id) {
            Some(existing) => existing.quantity += quantity,
            None => items.push(CartLineItem::from_product(product, quantity)),
        }

        self.write_items(&user_id, &items).await?;
        info!(product = %product.name, "added to cart");
        Ok(())
    }

    /// Set the quantity of the line item for `product_id`.
    ///
    /// A quantity of zero or less is the removal path, not an error: the
    /// item is filtered out before the write, so a zero quantity is never
    /// persisted.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthenticated` when nobody is signed in, `NotFound`
    /// if no cart document exists, or a store error if the read or write
    /// fails.
    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    pub async fn set_quantity(&self, product_id: &ProductId, quantity: i64) -> Result<()> {
        let user_id = self.require_user()?;

        let items = self.read_existing_items(&user_id).await?;

        let items: Vec<CartLineItem> = items
            .into_iter()
            .filter_map(|mut item| {
                if item.product_id != *product_id {
                    return Some(item);
                }
                // Zero or negative filters the item out entirely.
                u32::try_from(quantity).ok().filter(|q| *q > 0).map(|q| {
                    item.quantity = q;
                    item
                })
            })
            .collect();

        self.write_items(&user_id, &items).await?;
        debug!("cart quantity updated");
        Ok(())
    }

    /// Remove the line item for `product_id`.
    ///
    /// A product that is not in the cart is a silent no-op: the unchanged
    /// sequence is written back.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthenticated` when nobody is signed in, `NotFound`
    /// if no cart document exists, or a store error if the read or write
    /// fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<()> {
        let user_id = self.require_user()?;

        let items = self.read_existing_items(&user_id).await?;

        let items: Vec<CartLineItem> = items
            .into_iter()
            .filter(|item| item.product_id != *product_id)
            .collect();

        self.write_items(&user_id, &items).await?;
        debug!("item removed from cart");
        Ok(())
    }

    /// Reset the cart to empty.
    ///
    /// Unconditional overwrite: succeeds whether or not a cart document
    /// existed, and calling it twice leaves the same state as calling it
    /// once.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthenticated` when nobody is signed in, or with a
    /// store error if the write fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<()> {
        let user_id = self.require_user()?;

        self.write_items(&user_id, &[]).await?;
        info!("cart cleared");
        Ok(())
    }

    /// Convert `cart` into a new order.
    ///
    /// The order snapshots the cart's line items and computed total, with
    /// status `Pending`, and is written under a store-generated key. The
    /// cart is then cleared as a side effect; if that clear fails the
    /// order has already been committed, and the inconsistent outcome
    /// (order exists, cart not cleared) is logged rather than rolled back.
    ///
    /// # Errors
    ///
    /// Fails with `EmptyCart` before any store call if the cart holds no
    /// items, with `Unauthenticated` when nobody is signed in, or with a
    /// store error if the order write fails.
    #[instrument(skip(self, cart), fields(items = cart.items.len()))]
    pub async fn place_order(&self, cart: &Cart) -> Result<OrderId> {
        let user_id = self.require_user()?;

        if cart.is_empty() {
            return Err(ShopError::EmptyCart);
        }

        let key = self
            .store
            .add(collections::ORDERS, order_document(cart))
            .await?;
        let order_id = OrderId::new(key);
        info!(order_id = %order_id, total = %cart.total_price(), "order created");

        // The order is committed at this point; a failed clear leaves the
        // cart stale but must not undo the order.
        if let Err(e) = self.clear_cart().await {
            warn!(user_id = %user_id, error = %e, "cart clear after checkout failed");
        }

        Ok(order_id)
    }

    /// Fetch the current user's order history.
    ///
    /// Documents that fail to decode are logged and skipped; they never
    /// fail the whole call.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthenticated` when nobody is signed in, or with a
    /// store error if the query fails.
    #[instrument(skip(self))]
    pub async fn fetch_orders(&self) -> Result<Vec<Order>> {
        let user_id = self.require_user()?;

        let entries = self
            .store
            .query(collections::ORDERS, "userId", user_id.as_str())
            .await?;

        let orders: Vec<Order> = entries
            .iter()
            .filter_map(|(key, doc)| match Order::from_document(key, doc) {
                Ok(order) => Some(order),
                Err(e) => {
                    warn!(order = %key, error = %e, "skipping undecodable order");
                    None
                }
            })
            .collect();

        debug!(count = orders.len(), "orders fetched");
        Ok(orders)
    }
}
