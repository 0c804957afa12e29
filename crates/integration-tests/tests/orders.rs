//! Order history tests: per-user filtering and tolerant bulk decoding.

use std::sync::Arc;

use serde_json::json;

use cloudberry_integration_tests::product;
use cloudberry_shop::ShopError;
use cloudberry_shop::auth::MemoryIdentity;
use cloudberry_shop::cart::CartService;
use cloudberry_shop::store::{Document, MemoryStore, collections};

fn carts_for(store: &MemoryStore, user: &str) -> CartService {
    CartService::new(
        Arc::new(store.clone()),
        Arc::new(MemoryIdentity::signed_in(user)),
    )
}

fn doc(value: serde_json::Value) -> Document {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn fetch_orders_returns_only_the_callers_orders() {
    let store = MemoryStore::new();

    let alice = carts_for(&store, "u-alice");
    alice
        .add_item(&product("p-1", "Mug", 1000), 1)
        .await
        .expect("add");
    let cart = alice.fetch_cart().await.expect("fetch");
    alice.place_order(&cart).await.expect("alice order");

    let bob = carts_for(&store, "u-bob");
    bob.add_item(&product("p-2", "Tea", 550), 2)
        .await
        .expect("add");
    let cart = bob.fetch_cart().await.expect("fetch");
    bob.place_order(&cart).await.expect("bob order");

    let alice_orders = alice.fetch_orders().await.expect("alice history");
    assert_eq!(alice_orders.len(), 1);
    assert_eq!(alice_orders[0].user_id.as_str(), "u-alice");

    let bob_orders = bob.fetch_orders().await.expect("bob history");
    assert_eq!(bob_orders.len(), 1);
    assert_eq!(bob_orders[0].user_id.as_str(), "u-bob");
}

#[tokio::test]
async fn fetch_orders_skips_a_corrupted_document_without_failing() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");
    carts
        .add_item(&product("p-1", "Mug", 1000), 1)
        .await
        .expect("add");
    let cart = carts.fetch_cart().await.expect("fetch");
    carts.place_order(&cart).await.expect("place order");

    // A record with an unknown status cannot decode to an order.
    store.seed(
        collections::ORDERS,
        "o-corrupt",
        doc(json!({"userId": "u-1", "status": "Teleported"})),
    );

    let orders = carts.fetch_orders().await.expect("history still succeeds");
    assert_eq!(orders.len(), 1, "the corrupted record is dropped, not fatal");
}

#[tokio::test]
async fn fetch_orders_requires_a_signed_in_user() {
    let store = MemoryStore::new();
    let carts = CartService::new(Arc::new(store), Arc::new(MemoryIdentity::new()));

    assert!(matches!(
        carts.fetch_orders().await,
        Err(ShopError::Unauthenticated)
    ));
}
