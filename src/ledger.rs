//! The ledger: one live snapshot over slot storage.

use crate::error::Result;
use crate::interchange::{export_pretty, parse_import};
use crate::migrate::{LoadSource, Loader, SchemaVersion, DEFAULT_SLOT_PREFIX};
use crate::progress::{analyze_objective, ObjectiveStatus};
use crate::slots::{validate_key, SlotStorage};
use crate::state::{
    apply_operation, merge_with_report, orphans, LedgerOperation, MergeReport, OrphanReport,
};
use crate::subscriptions::{
    SubscriptionConfig, SubscriptionHandle, SubscriptionId, SubscriptionManager,
};
use crate::types::{LedgerState, ObjectiveId};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Ledger configuration.
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    /// Prefix of the versioned slot keys.
    pub slot_prefix: String,

    /// Whether a migrated legacy document is written back to the current
    /// slot at open time.
    pub write_through: bool,

    /// Buffer size for subscriptions opened with [`Ledger::subscribe_default`].
    pub subscription_buffer: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            slot_prefix: DEFAULT_SLOT_PREFIX.to_string(),
            write_through: true,
            subscription_buffer: 256,
        }
    }
}

/// The live progress ledger.
///
/// Readers take cheap [`Arc`] snapshots. Writers are serialized; each one
/// computes a complete replacement snapshot, persists it to the current
/// slot and only then makes it visible. A failed write leaves both the
/// stored and the in-memory state as they were.
pub struct Ledger<S: SlotStorage> {
    config: LedgerConfig,

    storage: S,

    /// Current snapshot.
    state: RwLock<Arc<LedgerState>>,

    /// How the snapshot was obtained at open time.
    source: LoadSource,

    subscriptions: SubscriptionManager,

    /// Lock for write operations to ensure atomicity.
    write_lock: Mutex<()>,
}

impl<S: SlotStorage> Ledger<S> {
    /// Load the ledger from `storage`, migrating an older document if that
    /// is all there is.
    ///
    /// Fails only when `slot_prefix` cannot name a slot. Unreadable data
    /// never fails the open; it starts from the empty state instead.
    pub fn open(storage: S, config: LedgerConfig) -> Result<Self> {
        validate_key(&config.slot_prefix)?;

        let outcome = Loader::new(&storage)
            .prefix(config.slot_prefix.clone())
            .write_through(config.write_through)
            .load_with_outcome();

        tracing::info!(
            source = ?outcome.source,
            summary = ?outcome.state.summary(),
            "ledger opened"
        );

        Ok(Self {
            config,
            storage,
            state: RwLock::new(Arc::new(outcome.state)),
            source: outcome.source,
            subscriptions: SubscriptionManager::new(),
            write_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn load_source(&self) -> LoadSource {
        self.source
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<LedgerState> {
        Arc::clone(&self.state.read())
    }

    /// Apply an operation and return the new snapshot.
    pub fn apply(&self, operation: LedgerOperation) -> Result<Arc<LedgerState>> {
        if let LedgerOperation::Import(incoming) = operation {
            return self.import(incoming).map(|(state, _)| state);
        }

        let _lock = self.write_lock.lock();
        let name = operation.name();
        let next = apply_operation(&self.snapshot(), operation)?;
        let next = self.commit(next)?;

        tracing::debug!(operation = name, summary = ?next.summary(), "operation applied");
        self.subscriptions.broadcast_replaced(name, next.summary());
        Ok(next)
    }

    /// Merge an already-decoded snapshot into the ledger.
    pub fn import(&self, incoming: LedgerState) -> Result<(Arc<LedgerState>, MergeReport)> {
        let _lock = self.write_lock.lock();
        let (next, report) = merge_with_report(&self.snapshot(), &incoming);

        // A no-op merge leaves the stored document alone.
        let next = if report.is_noop() {
            self.snapshot()
        } else {
            self.commit(next)?
        };

        tracing::info!(
            added = report.total_added(),
            skipped = report.total_skipped(),
            "import merged"
        );
        self.subscriptions.broadcast_imported(report, next.summary());
        Ok((next, report))
    }

    /// Decode an import document and merge it into the ledger.
    pub fn import_json(&self, bytes: &[u8]) -> Result<MergeReport> {
        let incoming = parse_import(bytes)?;
        self.import(incoming).map(|(_, report)| report)
    }

    /// Pretty JSON of the current snapshot.
    pub fn export_json(&self) -> Result<String> {
        export_pretty(&self.snapshot())
    }

    /// Children whose parent is missing. Never consulted by writes.
    pub fn orphans(&self) -> OrphanReport {
        orphans(&self.snapshot())
    }

    /// Status of one objective, or `None` if it does not exist.
    pub fn objective_status(&self, id: &ObjectiveId) -> Option<ObjectiveStatus> {
        let state = self.snapshot();
        let objective = state.objective(id)?;
        Some(analyze_objective(objective, &state.data_points).status)
    }

    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        self.subscriptions.subscribe(config)
    }

    /// Subscribe to every change with the configured buffer size.
    pub fn subscribe_default(&self) -> SubscriptionHandle {
        self.subscribe(SubscriptionConfig {
            buffer_size: self.config.subscription_buffer,
            ..Default::default()
        })
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id);
    }

    /// Persist `next` to the current slot, then make it visible.
    /// Must be called with the write lock held.
    fn commit(&self, next: LedgerState) -> Result<Arc<LedgerState>> {
        let bytes = serde_json::to_vec(&next)?;
        let key = SchemaVersion::CURRENT.slot_key(&self.config.slot_prefix);
        self.storage.write(&key, &bytes)?;

        let next = Arc::new(next);
        *self.state.write() = Arc::clone(&next);
        Ok(next)
    }
}
