//! In-process notifications of ledger changes.
//!
//! Every successful snapshot replacement is broadcast to subscribers over a
//! bounded channel. A subscriber that falls behind far enough to fill its
//! buffer is dropped rather than stalling writers.
//!
//! # Example
//!
//! ```ignore
//! let handle = ledger.subscribe(SubscriptionConfig::default());
//!
//! loop {
//!     match handle.recv() {
//!         Ok(LedgerEvent::Replaced { operation, summary }) => println!("{operation}: {summary:?}"),
//!         Ok(LedgerEvent::Imported { report, .. }) => println!("imported {}", report.total_added()),
//!         Ok(LedgerEvent::Dropped { .. }) | Err(_) => break,
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{
    DropReason, LedgerEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId,
};
