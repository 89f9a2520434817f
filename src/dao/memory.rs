use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::EntityStore;
use crate::error::Error;

/// In-process store for dry runs; documents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: Mutex<HashMap<String, HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get(&self, entity: &str, id: &str) -> Result<Option<Value>, Error> {
        let entities = self.entities.lock().await;
        Ok(entities
            .get(entity)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn upsert(
        &self,
        entity: &str,
        id: &str,
        data: Value,
    ) -> Result<(), Error> {
        let mut entities = self.entities.lock().await;
        entities
            .entry(entity.to_owned())
            .or_default()
            .insert(id.to_owned(), data);
        Ok(())
    }

    async fn delete(&self, entity: &str, id: &str) -> Result<(), Error> {
        let mut entities = self.entities.lock().await;
        if let Some(documents) = entities.get_mut(entity) {
            documents.remove(id);
        }
        Ok(())
    }

    async fn count(&self, entity: &str) -> Result<i64, Error> {
        let entities = self.entities.lock().await;
        let count = entities.get(entity).map_or(0, HashMap::len);
        Ok(count as i64)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_overwrites_and_delete_removes() {
        let store = MemoryStore::new();

        store.upsert("Issuer", "0xa", json!({"id": "0xa"})).await.unwrap();
        store
            .upsert("Issuer", "0xa", json!({"id": "0xa", "v": 2}))
            .await
            .unwrap();

        assert_eq!(store.count("Issuer").await.unwrap(), 1);
        assert_eq!(
            store.get("Issuer", "0xa").await.unwrap(),
            Some(json!({"id": "0xa", "v": 2}))
        );

        store.delete("Issuer", "0xa").await.unwrap();
        assert_eq!(store.get("Issuer", "0xa").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entities_do_not_share_ids() {
        let store = MemoryStore::new();

        store.upsert("ActiveStaker", "1", json!({})).await.unwrap();
        assert_eq!(store.get("TotalActiveStaker", "1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_count_is_per_entity() {
        let store = MemoryStore::new();

        store.upsert("ActiveStaker", "0xa", json!({})).await.unwrap();
        store.upsert("ActiveStaker", "0xb", json!({})).await.unwrap();
        store.upsert("Issuer", "0xa", json!({})).await.unwrap();
        store.delete("ActiveStaker", "0xb").await.unwrap();
        store.delete("Trade", "0xa").await.unwrap();

        assert_eq!(store.count("ActiveStaker").await.unwrap(), 1);
        assert_eq!(store.count("Issuer").await.unwrap(), 1);
        assert_eq!(store.count("Trade").await.unwrap(), 0);
    }
}
