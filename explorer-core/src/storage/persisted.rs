//! A value mirrored into a [`KeyValueStore`] slot.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;

use super::{KeyValueStore, StorageEvent, StoreHandleId};

type DefaultFn<T> = Box<dyn Fn() -> T + Send + Sync>;

/// A value bound to a named storage slot.
///
/// - Reads and decodes the stored JSON on bind, falling back to the default.
/// - Writes the JSON encoding on every change.
/// - Adopts values other handles write to the same key (see [`Persisted::sync`]).
///
/// Storage failures never reach the caller. They are logged and the handle
/// keeps working from memory, falling back to the default where a value can't
/// be decoded. An empty key disables storage entirely.
pub struct Persisted<T> {
    key: String,
    value: T,
    default: DefaultFn<T>,
    store: Option<Arc<dyn KeyValueStore>>,
    handle: StoreHandleId,
    events: Option<Receiver<StorageEvent>>,
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Bind `key` in `store`, using `default` whenever no usable value is stored.
    pub fn bind<F>(store: Arc<dyn KeyValueStore>, key: &str, default: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let default: DefaultFn<T> = Box::new(default);

        if key.is_empty() {
            let value = default();
            return Self {
                key: String::new(),
                value,
                default,
                store: None,
                handle: StoreHandleId::new(),
                events: None,
            };
        }

        // Subscribe before reading so no change slips between the two
        let events = store.subscribe();
        let raw = match store.get(key) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read stored value");
                None
            }
        };
        let value = decode_or(key, raw.as_deref(), &default);

        let persisted = Self {
            key: key.to_string(),
            value,
            default,
            store: Some(store),
            handle: StoreHandleId::new(),
            events: Some(events),
        };
        // Mirror the initial value so the slot always holds a well-formed encoding
        persisted.write();
        persisted
    }

    /// Bind with a fixed default value.
    pub fn with_default(store: Arc<dyn KeyValueStore>, key: &str, default: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self::bind(store, key, move || default.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    /// Replace the value and write it through.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.write();
    }

    /// Modify the value in place and write it through.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.value);
        self.write();
        result
    }

    /// Reset to the default value.
    pub fn reset(&mut self) {
        self.value = (self.default)();
        self.write();
    }

    /// Adopt changes other handles made to this key since the last call.
    ///
    /// Returns true if the value was replaced. Only the latest change counts.
    pub fn sync(&mut self) -> bool {
        let Some(events) = self.events.as_mut() else {
            return false;
        };

        let mut latest: Option<Option<String>> = None;
        let mut lagged = false;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    if event.key == self.key && event.origin != self.handle {
                        latest = Some(event.new_value);
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(key = %self.key, skipped, "storage events lagged, rereading");
                    lagged = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        if lagged {
            latest = Some(self.read());
        }

        match latest {
            Some(raw) => {
                self.adopt(raw.as_deref());
                true
            }
            None => false,
        }
    }

    /// Wait until another handle changes this key, then adopt the change.
    ///
    /// Returns false if storage is disabled or the store is gone.
    pub async fn changed(&mut self) -> bool {
        let Some(events) = self.events.as_mut() else {
            return false;
        };

        let outcome = loop {
            match events.recv().await {
                Ok(event) if event.key == self.key && event.origin != self.handle => {
                    break Some(event.new_value);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => break None,
                Err(RecvError::Closed) => return false,
            }
        };

        let raw = match outcome {
            Some(raw) => raw,
            None => self.read(),
        };
        self.adopt(raw.as_deref());
        true
    }

    fn adopt(&mut self, raw: Option<&str>) {
        tracing::debug!(key = %self.key, "adopting external storage change");
        self.value = decode_or(&self.key, raw, &self.default);
    }

    fn read(&self) -> Option<String> {
        let store = self.store.as_ref()?;
        match store.get(&self.key) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read stored value");
                None
            }
        }
    }

    fn write(&self) {
        let Some(store) = &self.store else {
            return;
        };

        let json = match serde_json::to_string(&self.value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to encode value, keeping it in memory");
                return;
            }
        };

        if let Err(e) = store.set(&self.key, &json, self.handle) {
            tracing::warn!(key = %self.key, error = %e, "Failed to write stored value");
        }
    }
}

fn decode_or<T: DeserializeOwned>(key: &str, raw: Option<&str>, default: &DefaultFn<T>) -> T {
    let Some(raw) = raw else {
        return default();
    };

    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "Stored value is not valid, using default");
            default()
        }
    }
}
