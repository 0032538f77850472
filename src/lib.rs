//! # Progress Ledger
//!
//! Storage and reconciliation core for student progress records: students,
//! their goals, the measurable objectives under each goal, and the data
//! points recorded against each objective.
//!
//! ## Core Concepts
//!
//! - **Snapshot**: four flat collections cross-referenced by id, always
//!   replaced whole
//! - **Identity merge**: imports union by id, existing records win
//! - **Cascade delete**: removing a parent removes everything under it
//! - **Versioned slots**: older stored documents are migrated forward on load
//!
//! ## Example
//!
//! ```ignore
//! use progress_ledger::{DirSlots, Ledger, LedgerConfig, LedgerOperation, Student};
//!
//! let ledger = Ledger::open(DirSlots::open("./ledger")?, LedgerConfig::default())?;
//!
//! ledger.apply(LedgerOperation::AddStudent(Student::new("Ada")))?;
//!
//! // Merge a file exported elsewhere
//! let report = ledger.import_json(&std::fs::read("backup.json")?)?;
//! println!("added {} records", report.total_added());
//! ```

pub mod error;
pub mod interchange;
pub mod ledger;
pub mod migrate;
pub mod progress;
pub mod slots;
pub mod state;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{LedgerError, Result};
pub use interchange::{export_pretty, parse_import};
pub use ledger::{Ledger, LedgerConfig};
pub use migrate::{LegacyDocument, LoadOutcome, LoadSource, Loader, SchemaVersion};
pub use progress::{analyze_objective, ObjectiveProgress, ObjectiveStatus};
pub use slots::{DirSlots, MemorySlots, SlotStorage};
pub use state::{
    apply_operation, delete_data_point, delete_goal, delete_objective, delete_student, merge,
    merge_with_report, orphans, CollectionMerge, DeletionClosure, DeletionRoot, LedgerOperation,
    MergeReport, OrphanReport,
};
pub use subscriptions::{
    DropReason, LedgerEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId, SubscriptionManager,
};
pub use types::*;
