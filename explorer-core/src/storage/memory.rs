use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::broadcast;

use super::{KeyValueStore, Notifier, StorageEvent, StoreHandleId};
use crate::error::StorageError;

/// In-memory store. Share it through an `Arc` to simulate several tabs.
#[derive(Debug)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
    notifier: Notifier,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            notifier: Notifier::new(),
        }
    }

    /// Seed a raw value without notifying anyone.
    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.values.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str, origin: StoreHandleId) -> Result<(), StorageError> {
        let previous = self
            .values
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());

        if previous.as_deref() != Some(value) {
            self.notifier.notify(key, Some(value.to_string()), origin);
        }
        Ok(())
    }

    fn remove(&self, key: &str, origin: StoreHandleId) -> Result<(), StorageError> {
        if self.values.write().unwrap().remove(key).is_some() {
            self.notifier.notify(key, None, origin);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.notifier.subscribe()
    }
}
