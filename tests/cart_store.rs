use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use solar_storefront::{
    cart::CartStore,
    error::{ClientError, ClientResult},
    models::Product,
    storage::{GUEST_CART_KEY, JsonFileStore, KeyValueStore, MemoryStore, SharedStore},
};

/// Memory store whose writes can be switched to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> ClientResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("disk full").into());
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        self.inner.remove(key).await
    }
}

async fn stored_line_count(store: &dyn KeyValueStore) -> usize {
    let raw = store.get(GUEST_CART_KEY).await.unwrap().unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&raw)
        .ok()
        .and_then(|cart| cart["items"].as_array().map(Vec::len))
        .unwrap_or(0)
}

fn stored_line(id: i64, quantity: u64, price: &str) -> serde_json::Value {
    serde_json::json!({
        "productId": id,
        "product": {"id": id, "name": format!("Battery {id}"), "price": price},
        "quantity": quantity,
        "price": price,
        "total": price
    })
}

fn product(id: i64, price: &str, status: &str) -> Product {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": format!("Battery {id}"),
        "price": price,
        "images": ["/img/battery.jpg"],
        "status": status
    }))
    .unwrap()
}

#[tokio::test]
async fn every_mutation_is_persisted() {
    let store = MemoryStore::shared();
    let carts = CartStore::load(store.clone()).await.unwrap();

    carts.add_to_cart(&product(7, "10.00", "available"), 2).await.unwrap();
    let raw = store.get(GUEST_CART_KEY).await.unwrap().expect("cart stored");
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored["total"], "20.00");
    assert_eq!(stored["items"][0]["product"]["image"], "/img/battery.jpg");

    carts.remove_from_cart(7).await.unwrap();
    let raw = store.get(GUEST_CART_KEY).await.unwrap().unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored["items"].as_array().unwrap().len(), 0);
    assert_eq!(stored["totalItems"], 0);
}

#[tokio::test]
async fn cart_survives_reload_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("storage.json");

    {
        let store: SharedStore = Arc::new(JsonFileStore::open(path.clone()).await.unwrap());
        let carts = CartStore::load(store).await.unwrap();
        carts.add_to_cart(&product(7, "10.00", "available"), 2).await.unwrap();
        carts.add_to_cart(&product(8, "99.99", "pre_order"), 1).await.unwrap();
    }

    let store: SharedStore = Arc::new(JsonFileStore::open(path).await.unwrap());
    let carts = CartStore::load(store).await.unwrap();
    let cart = carts.cart().await;
    assert_eq!(cart.items().len(), 2);
    assert_eq!(cart.total().to_string(), "119.99");
    assert_eq!(carts.item_count().await, 3);
    assert!(carts.is_in_cart(8).await);
}

#[tokio::test]
async fn malformed_stored_cart_falls_back_to_empty() {
    let store = MemoryStore::shared();
    store
        .set(GUEST_CART_KEY, "{not json".to_string())
        .await
        .unwrap();
    let carts = CartStore::load(store).await.unwrap();
    let cart = carts.cart().await;
    assert!(cart.is_empty());
    assert_eq!(cart.total().to_string(), "0.00");
}

#[tokio::test]
async fn quantity_below_one_is_rejected_before_the_reducer() {
    let carts = CartStore::load(MemoryStore::shared()).await.unwrap();
    carts.add_to_cart(&product(7, "10.00", "available"), 1).await.unwrap();

    let err = carts.update_quantity(7, 0).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidQuantity(0)));
    assert_eq!(carts.cart().await.items()[0].quantity(), 1);

    let err = carts
        .add_to_cart(&product(8, "1.00", "available"), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidQuantity(0)));
}

#[tokio::test]
async fn unavailable_products_cannot_be_added() {
    let carts = CartStore::load(MemoryStore::shared()).await.unwrap();
    let err = carts
        .add_to_cart(&product(9, "10.00", "discontinued"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::BadRequest(_)));
    assert!(carts.cart().await.is_empty());
}

#[tokio::test]
async fn clear_empties_the_cart() {
    let carts = CartStore::load(MemoryStore::shared()).await.unwrap();
    carts.add_to_cart(&product(7, "10.00", "available"), 5).await.unwrap();
    let cart = carts.clear_cart().await.unwrap();
    assert!(cart.is_empty());
    assert_eq!(cart.total_items(), 0);
    assert_eq!(carts.item_count().await, 0);
}

#[tokio::test]
async fn stored_cart_with_out_of_range_numbers_falls_back_to_empty() {
    let carts_on_disk = [
        serde_json::json!({
            "items": [stored_line(7, u64::from(u32::MAX), "1.00"), stored_line(8, 1, "1.00")]
        }),
        serde_json::json!({
            "items": [stored_line(7, 2, "79228162514264337593543950335")]
        }),
    ];
    for stored in carts_on_disk {
        let store = MemoryStore::shared();
        store.set(GUEST_CART_KEY, stored.to_string()).await.unwrap();
        let carts = CartStore::load(store).await.unwrap();
        assert!(carts.cart().await.is_empty());
        assert_eq!(carts.item_count().await, 0);
    }
}

#[tokio::test]
async fn adding_past_the_quantity_range_is_rejected() {
    let store = MemoryStore::shared();
    let carts = CartStore::load(store.clone()).await.unwrap();
    carts
        .add_to_cart(&product(7, "10.00", "available"), u32::MAX)
        .await
        .unwrap();

    let err = carts
        .add_to_cart(&product(8, "1.00", "available"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidQuantity(1)));
    let err = carts
        .add_to_cart(&product(7, "10.00", "available"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidQuantity(1)));

    assert_eq!(carts.item_count().await, u32::MAX);
    assert_eq!(stored_line_count(store.as_ref()).await, 1);
}

#[tokio::test]
async fn failed_persist_leaves_memory_and_storage_in_step() {
    let store = Arc::new(FlakyStore::default());
    let carts = CartStore::load(store.clone()).await.unwrap();
    carts.add_to_cart(&product(7, "10.00", "available"), 1).await.unwrap();

    store.fail_writes.store(true, Ordering::SeqCst);
    let err = carts
        .add_to_cart(&product(8, "5.00", "available"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Storage(_)));
    assert_eq!(carts.cart().await.items().len(), 1);
    assert!(!carts.is_in_cart(8).await);
    assert_eq!(stored_line_count(store.as_ref()).await, 1);

    store.fail_writes.store(false, Ordering::SeqCst);
    carts.update_quantity(7, 3).await.unwrap();
    assert_eq!(stored_line_count(store.as_ref()).await, 1);
    assert_eq!(carts.item_count().await, 3);
}

#[tokio::test]
async fn file_store_keeps_previous_value_when_write_fails() {
    let dir = tempfile::tempdir().unwrap();
    let parent = dir.path().join("state");
    let store = JsonFileStore::open(parent.join("storage.json")).await.unwrap();
    store.set(GUEST_CART_KEY, "first".to_string()).await.unwrap();

    std::fs::remove_dir_all(&parent).unwrap();
    std::fs::write(&parent, b"not a directory").unwrap();

    assert!(store.set(GUEST_CART_KEY, "second".to_string()).await.is_err());
    assert_eq!(
        store.get(GUEST_CART_KEY).await.unwrap().as_deref(),
        Some("first")
    );
}
