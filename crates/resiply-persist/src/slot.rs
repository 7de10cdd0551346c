use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::keys::StorageKey;
use crate::store::LocalStore;

/// Typed JSON view over one storage key.
///
/// Reads never fail: an absent, unreadable or malformed entry is reported
/// as `None` (and logged) so a corrupt cache cannot break startup.
pub struct JsonSlot<T> {
    store: Arc<dyn LocalStore>,
    key: StorageKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonSlot<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key,
            _marker: PhantomData,
        }
    }
}

impl<T> JsonSlot<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn LocalStore>, key: StorageKey) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> StorageKey {
        self.key
    }

    /// Raw JSON, for callers that sanitize loosely typed data themselves.
    pub fn load_value(&self) -> Option<Value> {
        let raw = match self.store.get(self.key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read persisted state");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Discarding corrupt persisted state");
                None
            }
        }
    }

    pub fn load(&self) -> Option<T> {
        let value = self.load_value()?;
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Persisted state has unexpected shape");
                None
            }
        }
    }

    pub fn save(&self, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(self.key.as_str(), &raw)
    }

    /// Save without surfacing failures to the caller.
    pub fn persist(&self, value: &T) {
        if let Err(e) = self.save(value) {
            tracing::error!(key = %self.key, error = %e, "Failed to persist state");
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(self.key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn slot_with(raw: Option<&str>) -> JsonSlot<Vec<String>> {
        let mut store = MemoryStore::new();
        if let Some(raw) = raw {
            store = store.with_entry(StorageKey::Tombstones.as_str(), raw);
        }
        JsonSlot::new(Arc::new(store), StorageKey::Tombstones)
    }

    #[test]
    fn test_absent_is_none() {
        assert_eq!(slot_with(None).load(), None);
    }

    #[test]
    fn test_corrupt_json_is_none() {
        assert_eq!(slot_with(Some("{not json")).load(), None);
    }

    #[test]
    fn test_wrong_shape_is_none() {
        let slot = slot_with(Some(r#"{"a": 1}"#));
        assert!(slot.load_value().is_some());
        assert_eq!(slot.load(), None);
    }

    #[test]
    fn test_save_then_load() {
        let slot = slot_with(None);
        slot.save(&vec!["1".to_string(), "srv-2".to_string()]).unwrap();
        assert_eq!(slot.load(), Some(vec!["1".to_string(), "srv-2".to_string()]));

        slot.clear().unwrap();
        assert_eq!(slot.load(), None);
    }
}
