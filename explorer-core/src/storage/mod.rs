//! Key-value persistence for small pieces of user state.
//!
//! Stores hold JSON strings under named keys and broadcast every change, so
//! several [`Persisted`] handles bound to the same key stay in sync the way
//! browser tabs sharing local storage do.

mod file;
mod memory;
mod persisted;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use persisted::Persisted;

use std::fmt;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::StorageError;

/// Storage key for the favorites map.
pub const FAVORITES_KEY: &str = "recipeExplorer.favoritesById";

/// Storage key for the weekly meal plan.
pub const MEAL_PLAN_KEY: &str = "recipeExplorer.mealPlan.v1";

/// Pending change notifications kept per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Identifies the writer of a change, so handles can skip their own writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreHandleId(Uuid);

impl StoreHandleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StoreHandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StoreHandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// A change to one key. `new_value` is None when the key was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: Option<String>,
    pub origin: StoreHandleId,
}

/// Trait for key-value stores, enabling in-memory stores in tests.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value for a key.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a raw value. Subscribers are notified only if the value changed.
    fn set(&self, key: &str, value: &str, origin: StoreHandleId) -> Result<(), StorageError>;

    /// Remove a key. Subscribers are notified only if it existed.
    fn remove(&self, key: &str, origin: StoreHandleId) -> Result<(), StorageError>;

    /// Receive every change made through this store from now on.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

/// Broadcast side shared by the store implementations.
#[derive(Debug)]
struct Notifier {
    sender: broadcast::Sender<StorageEvent>,
}

impl Notifier {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.sender.subscribe()
    }

    fn notify(&self, key: &str, new_value: Option<String>, origin: StoreHandleId) {
        // No receivers is fine
        let _ = self.sender.send(StorageEvent {
            key: key.to_string(),
            new_value,
            origin,
        });
    }
}
