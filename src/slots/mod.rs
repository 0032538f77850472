//! Persisted slot storage.
//!
//! A slot is a named blob. The ledger keeps one JSON document per schema
//! version, each under its own key, and only ever overwrites whole slots.

mod dir;
mod memory;

pub use dir::DirSlots;
pub use memory::MemorySlots;

use crate::error::{LedgerError, Result};

/// Load/save capability for named blobs.
pub trait SlotStorage: Send + Sync {
    /// Read a slot. `Ok(None)` when the slot was never written.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the contents of a slot.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Remove a slot. Returns whether it existed.
    fn remove(&self, key: &str) -> Result<bool>;

    /// All slot keys, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}

impl<T: SlotStorage + ?Sized> SlotStorage for Box<T> {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        (**self).write(key, bytes)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

/// Slot keys double as file names, so keep them to a safe alphabet.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(LedgerError::InvalidSlotKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("sprout_iep_data_v4").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("a/b").is_err());
    }
}
