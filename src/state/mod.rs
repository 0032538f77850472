//! Pure transformations over whole ledger snapshots.
//!
//! Every function here takes a snapshot by reference and returns a complete
//! replacement. Nothing mutates shared structures, so a caller that swaps the
//! result in atomically never exposes a half-applied change.

mod cascade;
mod integrity;
mod merge;
mod operations;

pub use cascade::{
    delete_data_point, delete_goal, delete_objective, delete_student, DeletionClosure,
    DeletionRoot,
};
pub use integrity::{orphans, OrphanReport};
pub use merge::{merge, merge_with_report, CollectionMerge, MergeReport};
pub use operations::{apply_operation, LedgerOperation};
