//! Versioned loader.

use super::legacy::LegacyDocument;
use super::{SchemaVersion, DEFAULT_SLOT_PREFIX};
use crate::error::{LedgerError, Result};
use crate::slots::SlotStorage;
use crate::types::LedgerState;

type Decoder = fn(&[u8]) -> Result<LegacyDocument>;

/// Legacy versions with their decoders, newest first.
const LEGACY_CHAIN: [(SchemaVersion, Decoder); 3] = [
    (SchemaVersion::V3, LegacyDocument::decode_v3),
    (SchemaVersion::V2, LegacyDocument::decode_v2),
    (SchemaVersion::V1, LegacyDocument::decode_v1),
];

/// Where a loaded state came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadSource {
    /// The current-version slot, returned untouched.
    Current,
    /// A legacy slot, upgraded to the current schema.
    Migrated {
        from: SchemaVersion,
        /// Whether the upgraded state was written to the current slot.
        persisted: bool,
    },
    /// No readable slot at any version.
    Empty,
}

/// A loaded state plus how it was obtained.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadOutcome {
    pub state: LedgerState,
    pub source: LoadSource,
}

/// Reads the ledger from slot storage, migrating older documents forward.
///
/// The loader never fails: unreadable or unparseable slots are logged and
/// skipped, and when nothing usable remains it yields the empty state. A
/// current slot that exists but cannot be used is never overwritten.
pub struct Loader<'a, S: SlotStorage + ?Sized> {
    storage: &'a S,
    prefix: String,
    write_through: bool,
}

impl<'a, S: SlotStorage + ?Sized> Loader<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self {
            storage,
            prefix: DEFAULT_SLOT_PREFIX.to_string(),
            write_through: true,
        }
    }

    /// Use a different slot name prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Whether a migrated state is written back to the current slot.
    /// Defaults to true.
    pub fn write_through(mut self, enabled: bool) -> Self {
        self.write_through = enabled;
        self
    }

    pub fn load(&self) -> LedgerState {
        self.load_with_outcome().state
    }

    pub fn load_with_outcome(&self) -> LoadOutcome {
        let current_key = SchemaVersion::CURRENT.slot_key(&self.prefix);

        // Set when the current slot holds something we could not use. A
        // migrated state must not be written over it.
        let mut current_unusable = false;
        match self.storage.read(&current_key) {
            Ok(Some(bytes)) => match serde_json::from_slice::<LedgerState>(&bytes) {
                Ok(state) => {
                    tracing::debug!(key = %current_key, summary = ?state.summary(), "loaded current slot");
                    return LoadOutcome {
                        state,
                        source: LoadSource::Current,
                    };
                }
                Err(e) => {
                    tracing::warn!(key = %current_key, error = %e, "failed to parse current slot");
                    current_unusable = true;
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key = %current_key, error = %e, "failed to read current slot");
                current_unusable = true;
            }
        }

        for (version, decode) in LEGACY_CHAIN {
            let key = version.slot_key(&self.prefix);
            let Some(bytes) = self.read_slot(&key) else {
                continue;
            };

            let document = match decode(&bytes) {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!(key = %key, version = %version, error = %e, "failed to parse legacy slot");
                    continue;
                }
            };

            tracing::info!(from = %version, to = %SchemaVersion::CURRENT, "migrating stored ledger");
            let state = document.into_current();
            let persisted = if current_unusable {
                tracing::warn!(key = %current_key, "keeping unreadable current slot, migrated state not persisted");
                false
            } else {
                self.write_through && self.persist(&current_key, &state)
            };

            return LoadOutcome {
                state,
                source: LoadSource::Migrated {
                    from: version,
                    persisted,
                },
            };
        }

        tracing::debug!(prefix = %self.prefix, "no stored ledger, starting empty");
        LoadOutcome {
            state: LedgerState::empty(),
            source: LoadSource::Empty,
        }
    }

    fn read_slot(&self, key: &str) -> Option<Vec<u8>> {
        match self.storage.read(key) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read slot");
                None
            }
        }
    }

    fn persist(&self, key: &str, state: &LedgerState) -> bool {
        let result = serde_json::to_vec(state)
            .map_err(LedgerError::from)
            .and_then(|bytes| self.storage.write(key, &bytes));

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to persist migrated ledger");
                false
            }
        }
    }
}
