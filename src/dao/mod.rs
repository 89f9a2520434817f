use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;

mod memory;
mod postgre;

pub use self::{
    memory::MemoryStore,
    postgre::{PgStore, PoolOption, PoolType},
};

/// Key/value persistence for derived entities.
///
/// Documents are addressed by `(entity, id)`. An upsert creates the document
/// when absent and overwrites it otherwise; there is no atomicity across
/// documents.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get(&self, entity: &str, id: &str) -> Result<Option<Value>, Error>;

    async fn upsert(
        &self,
        entity: &str,
        id: &str,
        data: Value,
    ) -> Result<(), Error>;

    async fn delete(&self, entity: &str, id: &str) -> Result<(), Error>;

    async fn count(&self, entity: &str) -> Result<i64, Error>;

    fn backend(&self) -> &'static str;
}
