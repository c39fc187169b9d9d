//! Carts persisted in a storage file shared between processes.

#![allow(clippy::unwrap_used)]

use std::fs;

use rust_decimal::Decimal;
use timepiece_integration_tests::{id, product};
use timepiece_storefront::storage::{FileStorage, Storage, StorageError};
use timepiece_storefront::{CartStore, StoreError, StorefrontConfig};

#[test]
fn test_cart_survives_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("local-storage.json");

    {
        let mut store = CartStore::new(FileStorage::new(&path));
        store.add(&product("w1", "Watch", "$49.99")).unwrap();
        store.add(&product("w1", "Watch", "$49.99")).unwrap();
    }

    let store = CartStore::new(FileStorage::new(&path));
    assert_eq!(store.item_count().unwrap(), 2);
    assert_eq!(store.total().unwrap(), Decimal::new(9998, 2));
}

#[test]
fn test_cart_shares_file_with_other_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local-storage.json");
    let storage = FileStorage::new(&path);
    storage.set_item("theme", "dark").unwrap();

    let mut store = CartStore::new(storage.clone());
    store.add(&product("w1", "Watch", "1")).unwrap();
    store.clear().unwrap();

    assert_eq!(storage.get_item("theme").unwrap().as_deref(), Some("dark"));
    assert_eq!(storage.get_item("cart").unwrap().as_deref(), Some("[]"));
}

#[test]
fn test_corrupt_file_is_reported_not_hidden() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local-storage.json");
    fs::write(&path, "{ not json").unwrap();

    let store = CartStore::new(FileStorage::new(&path));
    let err = store.read().unwrap_err();
    assert!(matches!(
        err,
        StoreError::Storage(StorageError::Corrupt { .. })
    ));
}

#[test]
fn test_malformed_cart_value_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local-storage.json");
    fs::write(&path, r#"{ "cart": "{\"oops\": true}" }"#).unwrap();

    let mut store = CartStore::new(FileStorage::new(&path));
    assert!(store.read().unwrap().is_empty());

    store.add(&product("w1", "Watch", "1")).unwrap();
    assert_eq!(store.item_count().unwrap(), 1);
}

#[test]
fn test_configured_quota_is_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local-storage.json");
    let config = StorefrontConfig::from_lookup(|key| match key {
        "TIMEPIECE_STORAGE_QUOTA_BYTES" => Some("64".to_string()),
        _ => None,
    })
    .unwrap();

    let storage = FileStorage::new(&path).with_quota(config.storage_quota);
    let mut store = CartStore::with_key(storage, config.cart_key);

    store.add(&product("w1", "Watch", "1")).unwrap();
    let err = store
        .add(&product("long", "A watch with a very long display name", "1"))
        .unwrap_err();
    assert!(err.is_quota_exceeded());

    store.remove(&id("w1")).unwrap();
    assert!(store.read().unwrap().is_empty());
}
