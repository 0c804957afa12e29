//! Protocol tests for cart mutation: read-merge-write semantics against
//! the in-memory store fake.

use std::sync::Arc;

use cloudberry_core::{ProductId, UserId};
use cloudberry_integration_tests::product;
use cloudberry_shop::ShopError;
use cloudberry_shop::auth::MemoryIdentity;
use cloudberry_shop::cart::CartService;
use cloudberry_shop::store::{MemoryStore, collections};

fn carts_for(store: &MemoryStore, user: &str) -> CartService {
    CartService::new(
        Arc::new(store.clone()),
        Arc::new(MemoryIdentity::signed_in(user)),
    )
}

#[tokio::test]
async fn fetch_on_never_written_user_returns_empty_cart_without_writing() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");

    let cart = carts.fetch_cart().await.expect("fetch should succeed");

    assert_eq!(cart.id, "u-1");
    assert_eq!(cart.user_id, UserId::new("u-1"));
    assert!(cart.items.is_empty());
    assert!(
        store.dump(collections::CARTS).is_empty(),
        "fetch must not create a cart document"
    );
}

#[tokio::test]
async fn add_item_twice_accumulates_into_one_line() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");
    let mug = product("p-mug", "Mug", 400);

    carts.add_item(&mug, 2).await.expect("first add");
    carts.add_item(&mug, 3).await.expect("second add");

    let cart = carts.fetch_cart().await.expect("fetch");
    assert_eq!(cart.items.len(), 1, "same product must merge, not duplicate");
    assert_eq!(cart.items[0].quantity, 5);
}

#[tokio::test]
async fn add_item_snapshots_price_at_add_time() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");

    carts
        .add_item(&product("p-mug", "Mug", 400), 1)
        .await
        .expect("add");

    // The catalog price changing later must not reach the cart line.
    let cart = carts.fetch_cart().await.expect("fetch");
    assert_eq!(
        cart.items[0].price.amount(),
        rust_decimal::Decimal::new(400, 2)
    );
}

#[tokio::test]
async fn set_quantity_zero_removes_the_item_entirely() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");
    carts
        .add_item(&product("p-mug", "Mug", 400), 2)
        .await
        .expect("add");

    carts
        .set_quantity(&ProductId::new("p-mug"), 0)
        .await
        .expect("set quantity");

    let cart = carts.fetch_cart().await.expect("fetch");
    assert!(cart.items.is_empty(), "zero quantity is the removal path");
}

#[tokio::test]
async fn set_quantity_changes_only_the_target_item() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");
    carts
        .add_item(&product("p-mug", "Mug", 400), 2)
        .await
        .expect("add mug");
    carts
        .add_item(&product("p-tea", "Tea", 250), 4)
        .await
        .expect("add tea");

    let before = carts.fetch_cart().await.expect("fetch");
    let untouched_before = before
        .items
        .iter()
        .find(|i| i.product_id.as_str() == "p-tea")
        .cloned()
        .expect("tea line");

    carts
        .set_quantity(&ProductId::new("p-mug"), 7)
        .await
        .expect("set quantity");

    let after = carts.fetch_cart().await.expect("fetch");
    let mug = after
        .items
        .iter()
        .find(|i| i.product_id.as_str() == "p-mug")
        .expect("mug line");
    let tea = after
        .items
        .iter()
        .find(|i| i.product_id.as_str() == "p-tea")
        .expect("tea line");

    assert_eq!(mug.quantity, 7);
    assert_eq!(*tea, untouched_before, "other lines must be untouched");
}

#[tokio::test]
async fn set_quantity_negative_also_removes() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");
    carts
        .add_item(&product("p-mug", "Mug", 400), 2)
        .await
        .expect("add");

    carts
        .set_quantity(&ProductId::new("p-mug"), -3)
        .await
        .expect("set quantity");

    assert!(carts.fetch_cart().await.expect("fetch").items.is_empty());
}

#[tokio::test]
async fn set_quantity_and_remove_require_an_existing_cart() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");

    assert!(matches!(
        carts.set_quantity(&ProductId::new("p-mug"), 1).await,
        Err(ShopError::NotFound(_))
    ));
    assert!(matches!(
        carts.remove_item(&ProductId::new("p-mug")).await,
        Err(ShopError::NotFound(_))
    ));
}

#[tokio::test]
async fn remove_of_absent_product_leaves_sequence_unchanged() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");
    carts
        .add_item(&product("p-mug", "Mug", 400), 2)
        .await
        .expect("add");
    let before = store.dump(collections::CARTS);
    let before_items = before
        .first()
        .and_then(|(_, doc)| doc.get("items"))
        .cloned()
        .expect("items field");

    carts
        .remove_item(&ProductId::new("p-unknown"))
        .await
        .expect("remove is a silent no-op");

    let after = store.dump(collections::CARTS);
    let after_items = after
        .first()
        .and_then(|(_, doc)| doc.get("items"))
        .cloned()
        .expect("items field");
    assert_eq!(after_items, before_items, "persisted items must not change");
}

#[tokio::test]
async fn clear_then_fetch_is_empty_regardless_of_prior_contents() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");
    carts
        .add_item(&product("p-mug", "Mug", 400), 2)
        .await
        .expect("add");

    carts.clear_cart().await.expect("clear");

    assert!(carts.fetch_cart().await.expect("fetch").items.is_empty());
}

#[tokio::test]
async fn clear_twice_is_idempotent() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");
    carts
        .add_item(&product("p-mug", "Mug", 400), 2)
        .await
        .expect("add");

    carts.clear_cart().await.expect("first clear");
    let after_first = carts.fetch_cart().await.expect("fetch");

    carts.clear_cart().await.expect("second clear");
    let after_second = carts.fetch_cart().await.expect("fetch");

    assert_eq!(after_first.items, after_second.items);
    assert!(after_second.items.is_empty());
}

#[tokio::test]
async fn clear_succeeds_even_without_a_prior_cart() {
    let store = MemoryStore::new();
    let carts = carts_for(&store, "u-1");

    carts.clear_cart().await.expect("clear on fresh user");

    let dumped = store.dump(collections::CARTS);
    assert_eq!(dumped.len(), 1, "clear writes the empty document");
}

#[tokio::test]
async fn carts_of_different_users_do_not_interfere() {
    let store = MemoryStore::new();
    let alice = carts_for(&store, "u-alice");
    let bob = carts_for(&store, "u-bob");

    alice
        .add_item(&product("p-mug", "Mug", 400), 1)
        .await
        .expect("alice add");
    bob.clear_cart().await.expect("bob clear");

    assert_eq!(alice.fetch_cart().await.expect("fetch").items.len(), 1);
    assert!(bob.fetch_cart().await.expect("fetch").items.is_empty());
}
