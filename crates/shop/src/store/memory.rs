//! In-memory document store fake.
//!
//! Used by unit and integration tests to exercise the cart/order protocol
//! without a network. Reproduces the remote store's observable semantics:
//! whole-document replace, last-writer-wins, generated keys on `add`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use super::{Document, DocumentStore, StoreError};

type Collections = HashMap<String, BTreeMap<String, Document>>;

/// Process-local document store with the same contract as the remote one.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document under a fixed key (test setup helper).
    pub fn seed(&self, collection: &str, key: &str, document: Document) {
        self.write()
            .entry(collection.to_owned())
            .or_default()
            .insert(key.to_owned(), document);
    }

    /// Snapshot of a collection's contents (test assertion helper).
    #[must_use]
    pub fn dump(&self, collection: &str) -> Vec<(String, Document)> {
        self.read()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(k, d)| (k.clone(), d.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Collections> {
        match self.collections.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Collections> {
        match self.collections.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .read()
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn set(
        &self,
        collection: &str,
        key: &str,
        document: Document,
    ) -> Result<(), StoreError> {
        self.write()
            .entry(collection.to_owned())
            .or_default()
            .insert(key.to_owned(), document);
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<(String, Document)>, StoreError> {
        Ok(self
            .read()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, d)| d.get(field).and_then(|v| v.as_str()) == Some(value))
                    .map(|(k, d)| (k.clone(), d.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        Ok(self.dump(collection))
    }

    async fn add(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        let key = Uuid::new_v4().to_string();
        self.write()
            .entry(collection.to_owned())
            .or_default()
            .insert(key.clone(), document);
        Ok(key)
    }
}
