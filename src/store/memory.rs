use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{CollectionPath, DocumentPath, DocumentStore};
use crate::error::{AppError, AppResult};

/// In-process document store for local runs and tests.
///
/// Supports fault injection so callers can exercise outage and partial
/// bulk-delete paths without a real backend.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<RwLock<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    collections: BTreeMap<CollectionPath, BTreeMap<String, Value>>,
    unavailable: bool,
    fail_after_batches: Option<usize>,
    batches_committed: usize,
}

impl MemoryState {
    fn check_available(&self) -> AppResult<()> {
        if self.unavailable {
            return Err(AppError::StoreUnavailable(
                "memory store marked unavailable".into(),
            ));
        }
        Ok(())
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `StoreUnavailable` while set.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.inner.write().await.unavailable = unavailable;
    }

    /// Lets `n` more delete batches commit, then fails the rest.
    pub async fn fail_after_batches(&self, n: Option<usize>) {
        let mut state = self.inner.write().await;
        let committed = state.batches_committed;
        state.fail_after_batches = n.map(|n| committed + n);
    }

    pub async fn batches_committed(&self) -> usize {
        self.inner.read().await.batches_committed
    }

    pub async fn document_count(&self, collection: &CollectionPath) -> usize {
        self.inner
            .read()
            .await
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn set(&self, path: &DocumentPath, data: Value) -> AppResult<()> {
        let mut state = self.inner.write().await;
        state.check_available()?;
        state
            .collections
            .entry(path.collection().clone())
            .or_default()
            .insert(path.id().to_string(), data);
        Ok(())
    }

    async fn get(&self, path: &DocumentPath) -> AppResult<Option<Value>> {
        let state = self.inner.read().await;
        state.check_available()?;
        Ok(state
            .collections
            .get(path.collection())
            .and_then(|docs| docs.get(path.id()))
            .cloned())
    }

    async fn delete(&self, path: &DocumentPath) -> AppResult<()> {
        let mut state = self.inner.write().await;
        state.check_available()?;
        if let Some(docs) = state.collections.get_mut(path.collection()) {
            docs.remove(path.id());
        }
        Ok(())
    }

    async fn list(&self, collection: &CollectionPath) -> AppResult<Vec<(DocumentPath, Value)>> {
        let state = self.inner.read().await;
        state.check_available()?;
        let Some(docs) = state.collections.get(collection) else {
            return Ok(Vec::new());
        };
        docs.iter()
            .map(|(id, data)| Ok((collection.doc(id)?, data.clone())))
            .collect()
    }

    async fn delete_batch(&self, paths: &[DocumentPath]) -> AppResult<()> {
        let mut state = self.inner.write().await;
        state.check_available()?;
        if state
            .fail_after_batches
            .is_some_and(|limit| state.batches_committed >= limit)
        {
            return Err(AppError::StoreUnavailable(
                "memory store rejected batch commit".into(),
            ));
        }
        for path in paths {
            if let Some(docs) = state.collections.get_mut(path.collection()) {
                docs.remove(path.id());
            }
        }
        state.batches_committed += 1;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        self.inner.read().await.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(user: &str, id: &str) -> DocumentPath {
        CollectionPath::journal_entries(user).unwrap().doc(id).unwrap()
    }

    #[tokio::test]
    async fn test_set_overwrites_without_touching_siblings() {
        let store = MemoryDocumentStore::new();
        store.set(&path("u1", "a"), json!({"v": 1})).await.unwrap();
        store.set(&path("u1", "b"), json!({"v": 2})).await.unwrap();
        store.set(&path("u1", "a"), json!({"v": 3})).await.unwrap();

        assert_eq!(store.get(&path("u1", "a")).await.unwrap(), Some(json!({"v": 3})));
        assert_eq!(store.get(&path("u1", "b")).await.unwrap(), Some(json!({"v": 2})));
    }

    #[tokio::test]
    async fn test_collections_are_isolated_per_user() {
        let store = MemoryDocumentStore::new();
        store.set(&path("u1", "a"), json!({})).await.unwrap();
        store.set(&path("u2", "a"), json!({})).await.unwrap();

        let u1 = CollectionPath::journal_entries("u1").unwrap();
        let listed = store.list(&u1).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].0, path("u1", "a"));
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let store = MemoryDocumentStore::new();
        store.set_unavailable(true).await;
        assert!(matches!(
            store.get(&path("u1", "a")).await,
            Err(AppError::StoreUnavailable(_))
        ));
        assert!(store.ping().await.is_err());
        store.set_unavailable(false).await;
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_fail_after_batches() {
        let store = MemoryDocumentStore::new();
        store.fail_after_batches(Some(1)).await;
        assert!(store.delete_batch(&[path("u1", "a")]).await.is_ok());
        assert!(store.delete_batch(&[path("u1", "b")]).await.is_err());
        assert_eq!(store.batches_committed().await, 1);
    }
}
