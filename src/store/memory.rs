use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;

use crate::{
    prelude::*,
    store::{PointType, TagStore, TagValue, key::TagKey},
};

/// Volatile store for tests and dry runs: the full `TagStore` contract,
/// nothing survives the process.
#[derive(Clone, Default)]
#[must_use]
pub struct MemoryStore(Arc<Inner>);

#[derive(Default)]
struct Inner {
    points: Mutex<HashMap<String, PointType>>,
    values: Mutex<HashMap<String, TagValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct read by rendered key name, bypassing the trait.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<TagValue> {
        self.0.values.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }
}

#[async_trait]
impl TagStore for MemoryStore {
    async fn exists(&self, point: &str) -> Result<bool> {
        Ok(self.0.points.lock().unwrap_or_else(PoisonError::into_inner).contains_key(point))
    }

    async fn create(&self, point: &str, point_type: PointType) -> Result<()> {
        self.0
            .points
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(point.to_owned(), point_type);
        Ok(())
    }

    async fn get(&self, keys: &[TagKey]) -> Result<Vec<Option<TagValue>>> {
        let values = self.0.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(keys.iter().map(|key| values.get(&key.to_string()).cloned()).collect())
    }

    async fn set(&self, updates: Vec<(TagKey, TagValue)>) -> Result<()> {
        let mut values = self.0.values.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in updates {
            values.insert(key.to_string(), value);
        }
        Ok(())
    }
}
