//! Domain documents and their codecs.
//!
//! The store is schema-less, so every model decodes tolerantly the way a
//! client of a free-form record has to: a missing or mistyped scalar falls
//! back to its default, and only a structurally unusable record (or line
//! item) fails. Prices inside carts and orders are denormalized snapshots
//! taken when the product was added - a later catalog price change never
//! reaches items already in a cart.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use cloudberry_core::{OrderId, OrderStatus, Price, ProductId, UserId};

use crate::store::Document;

/// A document decoded, but not into the expected shape.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DecodeError(pub String);

// =============================================================================
// Field helpers
// =============================================================================

fn str_field(doc: &Document, name: &str) -> String {
    doc.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn u32_field(doc: &Document, name: &str, default: u32) -> u32 {
    doc.get(name)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(default)
}

/// Decimal scalars arrive as JSON strings (the store's canonical form for
/// exact amounts) but older records carry plain numbers; accept both.
fn decimal_field(doc: &Document, name: &str) -> Decimal {
    match doc.get(name) {
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_default(),
        None => Decimal::ZERO,
    }
}

fn timestamp_field(doc: &Document, name: &str) -> DateTime<Utc> {
    doc.get(name)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or_else(Utc::now, |t| t.with_timezone(&Utc))
}

fn timestamp_value(t: DateTime<Utc>) -> Value {
    Value::String(t.to_rfc3339())
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
///
/// Owned by the catalog and immutable from the cart's perspective; carts
/// and orders reference it only through denormalized line-item snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub stock: u32,
    pub category: String,
}

impl Product {
    /// Decode a product document.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the record is unusable as a product
    /// (negative price). Missing scalars fall back to defaults.
    pub fn from_document(key: &str, doc: &Document) -> Result<Self, DecodeError> {
        let price = Price::new(decimal_field(doc, "price"))
            .map_err(|e| DecodeError(format!("product {key}: {e}")))?;

        Ok(Self {
            id: ProductId::new(key),
            name: str_field(doc, "name"),
            description: str_field(doc, "description"),
            price,
            image_url: str_field(doc, "imageUrl"),
            stock: u32_field(doc, "stock", 0),
            category: str_field(doc, "category"),
        })
    }
}

// =============================================================================
// Cart line items
// =============================================================================

/// One product-quantity-price tuple within a cart or order.
///
/// Name, price, and image are snapshots of the product at the time it was
/// added.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Price,
    pub quantity: u32,
    pub image_url: String,
}

impl CartLineItem {
    /// Build a line item snapshot from a product.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            price: product.price,
            quantity,
            image_url: product.image_url.clone(),
        }
    }

    /// Decode one entry of an `items` array. Entries that are not objects
    /// or carry no product reference are unusable and yield `None`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let doc = value.as_object()?;

        let product_id = str_field(doc, "productId");
        if product_id.is_empty() {
            warn!("skipping line item without productId");
            return None;
        }

        let price = match Price::new(decimal_field(doc, "price")) {
            Ok(price) => price,
            Err(e) => {
                warn!(product_id = %product_id, error = %e, "skipping unusable line item");
                return None;
            }
        };

        Some(Self {
            product_id: ProductId::new(product_id),
            product_name: str_field(doc, "productName"),
            price,
            quantity: u32_field(doc, "quantity", 1),
            image_url: str_field(doc, "imageUrl"),
        })
    }

    /// Encode for storage inside an `items` array.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "productId": self.product_id.as_str(),
            "productName": self.product_name,
            "price": self.price,
            "quantity": self.quantity,
            "imageUrl": self.image_url,
        })
    }

    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.total(self.quantity)
    }
}

/// Decode an `items` array, skipping unusable entries.
fn items_from_document(doc: &Document) -> Vec<CartLineItem> {
    doc.get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(CartLineItem::from_value).collect())
        .unwrap_or_default()
}

fn items_to_value(items: &[CartLineItem]) -> Value {
    Value::Array(items.iter().map(CartLineItem::to_value).collect())
}

// =============================================================================
// Cart
// =============================================================================

/// A user's cart: at most one line item per distinct product.
///
/// The cart document is keyed by the owning user's identifier, so `id` and
/// `user_id` always agree.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub id: String,
    pub user_id: UserId,
    pub items: Vec<CartLineItem>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Synthesize the empty cart for a user who has never written one.
    #[must_use]
    pub fn empty(user_id: UserId) -> Self {
        Self {
            id: user_id.as_str().to_owned(),
            user_id,
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Decode a cart document. Unusable line items are skipped, never
    /// surfaced as a cart-level failure.
    #[must_use]
    pub fn from_document(user_id: UserId, doc: &Document) -> Self {
        Self {
            id: user_id.as_str().to_owned(),
            items: items_from_document(doc),
            updated_at: timestamp_field(doc, "updatedAt"),
            user_id,
        }
    }

    /// Sum of price times quantity across all line items.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Sum of quantities across all line items.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// True if the cart holds no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Encode the cart document written on every mutation: the full item
/// sequence under a fresh timestamp.
#[must_use]
pub fn cart_document(user_id: &UserId, items: &[CartLineItem]) -> Document {
    let mut doc = Document::new();
    doc.insert("userId".to_owned(), Value::String(user_id.as_str().to_owned()));
    doc.insert("items".to_owned(), items_to_value(items));
    doc.insert("updatedAt".to_owned(), timestamp_value(Utc::now()));
    doc
}

// =============================================================================
// Order
// =============================================================================

/// An order: an immutable snapshot of a cart at checkout time.
///
/// `total_amount` is computed once at creation and never recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<CartLineItem>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Decode an order document.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the record carries an unrecognized
    /// status. A missing status reads as `Pending`.
    pub fn from_document(key: &str, doc: &Document) -> Result<Self, DecodeError> {
        let status = match doc.get("status").and_then(Value::as_str) {
            None => OrderStatus::default(),
            Some(s) => s
                .parse()
                .map_err(|e: String| DecodeError(format!("order {key}: {e}")))?,
        };

        Ok(Self {
            id: OrderId::new(key),
            user_id: UserId::new(str_field(doc, "userId")),
            items: items_from_document(doc),
            total_amount: decimal_field(doc, "totalAmount"),
            status,
            created_at: timestamp_field(doc, "createdAt"),
        })
    }
}

/// Encode the order document created at checkout.
#[must_use]
pub fn order_document(cart: &Cart) -> Document {
    let mut doc = Document::new();
    doc.insert(
        "userId".to_owned(),
        Value::String(cart.user_id.as_str().to_owned()),
    );
    doc.insert("items".to_owned(), items_to_value(&cart.items));
    doc.insert(
        "totalAmount".to_owned(),
        serde_json::to_value(cart.total_price()).unwrap_or(Value::Null),
    );
    doc.insert(
        "status".to_owned(),
        Value::String(OrderStatus::Pending.to_string()),
    );
    doc.insert("createdAt".to_owned(), timestamp_value(Utc::now()));
    doc
}

// =============================================================================
// User
// =============================================================================

/// A user as reported by the identity provider.
///
/// Owned entirely by the provider; this client never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Decode a user payload from the identity provider.
    #[must_use]
    pub fn from_document(key: &str, doc: &Document) -> Self {
        Self {
            id: UserId::new(key),
            email: str_field(doc, "email"),
            name: str_field(doc, "name"),
            created_at: timestamp_field(doc, "createdAt"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap_or_default()
    }

    fn product(id: &str, price: Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::new(price).unwrap(),
            image_url: format!("https://img.example/{id}.jpg"),
            stock: 10,
            category: "misc".to_owned(),
        }
    }

    #[test]
    fn test_product_decode_tolerates_missing_fields() {
        let p = Product::from_document("p-1", &doc(json!({"name": "Mug"}))).unwrap();
        assert_eq!(p.name, "Mug");
        assert_eq!(p.price, Price::ZERO);
        assert_eq!(p.stock, 0);
        assert_eq!(p.category, "");
    }

    #[test]
    fn test_product_decode_rejects_negative_price() {
        let result = Product::from_document("p-1", &doc(json!({"price": "-4.00"})));
        assert!(result.is_err());
    }

    #[test]
    fn test_product_decode_accepts_numeric_price() {
        let p = Product::from_document("p-1", &doc(json!({"price": 12.5}))).unwrap();
        assert_eq!(p.price.amount(), Decimal::new(125, 1));
    }

    #[test]
    fn test_line_item_snapshot_copies_product_fields() {
        let p = product("p-7", Decimal::new(999, 2));
        let item = CartLineItem::from_product(&p, 3);
        assert_eq!(item.product_id, p.id);
        assert_eq!(item.product_name, p.name);
        assert_eq!(item.price, p.price);
        assert_eq!(item.quantity, 3);
        assert_eq!(item.line_total(), Decimal::new(2997, 2));
    }

    #[test]
    fn test_line_item_value_roundtrip() {
        let item = CartLineItem::from_product(&product("p-1", Decimal::new(550, 2)), 2);
        let decoded = CartLineItem::from_value(&item.to_value()).unwrap();
        assert_eq!(decoded, item);
    }

    #[test]
    fn test_line_item_without_product_id_is_skipped() {
        assert!(CartLineItem::from_value(&json!({"quantity": 2})).is_none());
        assert!(CartLineItem::from_value(&json!("not an object")).is_none());
    }

    #[test]
    fn test_cart_decode_skips_unusable_items() {
        let cart_doc = doc(json!({
            "userId": "u-1",
            "items": [
                {"productId": "p-1", "productName": "Mug", "price": "4.00", "quantity": 2},
                {"quantity": 5},
                "garbage",
            ],
        }));
        let cart = Cart::from_document(UserId::new("u-1"), &cart_doc);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product_id.as_str(), "p-1");
    }

    #[test]
    fn test_cart_totals() {
        let cart = Cart {
            id: "u-1".to_owned(),
            user_id: UserId::new("u-1"),
            items: vec![
                CartLineItem::from_product(&product("p-1", Decimal::new(1000, 2)), 2),
                CartLineItem::from_product(&product("p-2", Decimal::new(550, 2)), 1),
            ],
            updated_at: Utc::now(),
        };
        assert_eq!(cart.total_price(), Decimal::new(2550, 2));
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_empty_cart_has_user_id_as_id() {
        let cart = Cart::empty(UserId::new("u-9"));
        assert_eq!(cart.id, "u-9");
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn test_order_document_snapshots_cart() {
        let cart = Cart {
            id: "u-1".to_owned(),
            user_id: UserId::new("u-1"),
            items: vec![CartLineItem::from_product(
                &product("p-1", Decimal::new(1000, 2)),
                2,
            )],
            updated_at: Utc::now(),
        };

        let doc = order_document(&cart);
        let order = Order::from_document("o-1", &doc).unwrap();
        assert_eq!(order.user_id, cart.user_id);
        assert_eq!(order.items, cart.items);
        assert_eq!(order.total_amount, Decimal::new(2000, 2));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_order_decode_rejects_unknown_status() {
        let result = Order::from_document("o-1", &doc(json!({"status": "Teleported"})));
        assert!(result.is_err());
    }

    #[test]
    fn test_order_decode_defaults_missing_status_to_pending() {
        let order = Order::from_document("o-1", &doc(json!({"userId": "u-1"}))).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_user_decode() {
        let user = User::from_document(
            "u-1",
            &doc(json!({"email": "a@b.c", "name": "Ada", "createdAt": "2026-01-05T10:00:00Z"})),
        );
        assert_eq!(user.id.as_str(), "u-1");
        assert_eq!(user.email, "a@b.c");
        assert_eq!(user.name, "Ada");
    }
}
