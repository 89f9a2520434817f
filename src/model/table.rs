use std::{marker::PhantomData, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};

use crate::{dao::EntityStore, error::Error};

pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const NAME: &'static str;

    fn id(&self) -> &str;
}

pub struct Table<T> {
    store: Arc<dyn EntityStore>,
    _phantomdata: PhantomData<T>,
}

impl<T> Table<T> {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Table {
            store,
            _phantomdata: PhantomData,
        }
    }
}

impl<T: Entity> Table<T> {
    pub async fn get_one(&self, id: &str) -> Result<Option<T>, Error> {
        match self.store.get(T::NAME, id).await? {
            Some(data) => Ok(Some(serde_json::from_value(data)?)),
            None => Ok(None),
        }
    }

    pub async fn upsert(&self, data: &T) -> Result<(), Error> {
        let value = serde_json::to_value(data)?;
        self.store.upsert(T::NAME, data.id(), value).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.store.delete(T::NAME, id).await
    }

    pub async fn count(&self) -> Result<i64, Error> {
        self.store.count(T::NAME).await
    }

    pub async fn exists(&self, id: &str) -> Result<bool, Error> {
        Ok(self.store.get(T::NAME, id).await?.is_some())
    }
}
