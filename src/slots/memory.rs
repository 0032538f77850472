//! In-memory slot storage.

use super::{validate_key, SlotStorage};
use crate::error::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Slots held in a map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySlots {
    slots: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed slots up front, e.g. to stage legacy documents.
    pub fn with_slots<I, K, V>(slots: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let map = slots
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            slots: RwLock::new(map),
        }
    }
}

impl SlotStorage for MemorySlots {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.slots.read().get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        validate_key(key)?;
        self.slots.write().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        Ok(self.slots.write().remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.slots.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
