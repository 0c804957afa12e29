//! Checkout tests: cart-to-order conversion and its side effects.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use rust_decimal::Decimal;

use cloudberry_core::OrderStatus;
use cloudberry_integration_tests::{FailingWrites, product};
use cloudberry_shop::ShopError;
use cloudberry_shop::auth::MemoryIdentity;
use cloudberry_shop::cart::CartService;
use cloudberry_shop::models::Order;
use cloudberry_shop::store::{MemoryStore, collections};

fn carts_for(store: &MemoryStore, user: &str) -> CartService {
    CartService::new(
        Arc::new(store.clone()),
        Arc::new(MemoryIdentity::signed_in(user)),
    )
}

#[tokio::test]
async fn place_order_snapshots_items_and_total_and_resets_cart() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");
    carts
        .add_item(&product("p-1", "Mug", 1000), 2)
        .await
        .expect("add mug");
    carts
        .add_item(&product("p-2", "Tea", 550), 1)
        .await
        .expect("add tea");

    let cart = carts.fetch_cart().await.expect("fetch");
    let order_id = carts.place_order(&cart).await.expect("place order");

    // The order document snapshots exactly the two lines and the computed
    // total, with the initial status.
    let orders = store.dump(collections::ORDERS);
    assert_eq!(orders.len(), 1);
    let (key, doc) = orders.first().expect("order entry");
    assert_eq!(key, order_id.as_str());

    let order = Order::from_document(key, doc).expect("order decodes");
    assert_eq!(order.total_amount, Decimal::new(2550, 2));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items, cart.items);
    assert_eq!(order.user_id, cart.user_id);

    // The cart is cleared as a side effect.
    assert!(carts.fetch_cart().await.expect("fetch").items.is_empty());
}

#[tokio::test]
async fn place_order_on_empty_cart_is_rejected_before_any_store_call() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");

    let cart = carts.fetch_cart().await.expect("fetch");
    let result = carts.place_order(&cart).await;

    assert!(matches!(result, Err(ShopError::EmptyCart)));
    assert!(
        store.dump(collections::ORDERS).is_empty(),
        "no order document may be created"
    );
}

#[tokio::test]
async fn order_survives_a_failed_cart_clear() {
    let memory = MemoryStore::new();
    let (wrapped, fail_sets) = FailingWrites::new(memory.clone());
    let carts = CartService::new(
        Arc::new(wrapped),
        Arc::new(MemoryIdentity::signed_in("u-1")),
    );

    carts
        .add_item(&product("p-1", "Mug", 1000), 1)
        .await
        .expect("add");
    let cart = carts.fetch_cart().await.expect("fetch");

    // Writes start failing after the order is added (orders go through
    // `add`, the clear goes through `set`).
    fail_sets.store(true, Ordering::SeqCst);

    let order_id = carts
        .place_order(&cart)
        .await
        .expect("order must commit even though the clear fails");

    assert_eq!(memory.dump(collections::ORDERS).len(), 1);
    assert_eq!(
        memory.dump(collections::ORDERS).first().map(|(k, _)| k.clone()),
        Some(order_id.as_str().to_owned())
    );

    // The accepted inconsistency: the cart still holds its items.
    fail_sets.store(false, Ordering::SeqCst);
    let stale = carts.fetch_cart().await.expect("fetch");
    assert_eq!(stale.items.len(), 1, "cart was not cleared and not rolled back");
}

#[tokio::test]
async fn orders_are_immutable_once_created() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");
    carts
        .add_item(&product("p-1", "Mug", 1000), 1)
        .await
        .expect("add");
    let cart = carts.fetch_cart().await.expect("fetch");
    carts.place_order(&cart).await.expect("place order");

    let before = store.dump(collections::ORDERS);

    // Further cart activity never touches existing order documents.
    carts
        .add_item(&product("p-2", "Tea", 550), 2)
        .await
        .expect("add");
    carts.clear_cart().await.expect("clear");

    assert_eq!(store.dump(collections::ORDERS), before);
}
