//! Schema versions and forward migration.
//!
//! Each persisted generation of the ledger lives in its own slot, named by
//! version (`sprout_iep_data_v1` .. `sprout_iep_data_v4`). The document inside
//! carries no version marker: a version is identified purely by which slot
//! holds parseable data.
//!
//! Older documents are decoded into their own shapes ([`LegacyDocument`]) and
//! walked forward one step at a time until they reach the current schema.
//! Migration never goes backwards and never drops fields.

mod legacy;
mod loader;
mod upgrade;

pub use legacy::{
    DataPointV1, DocumentV1, DocumentV2, DocumentV3, GoalV1, LegacyDocument, ObjectiveV1,
    ObjectiveV3,
};
pub use loader::{LoadOutcome, LoadSource, Loader};
pub use upgrade::{upgrade_v1_to_v2, upgrade_v2_to_v3, upgrade_v3_to_v4, Upgraded};

use std::fmt;

/// Default slot name prefix.
pub const DEFAULT_SLOT_PREFIX: &str = "sprout_iep_data";

/// A generation of the ledger schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemaVersion {
    /// Goals without categories.
    V1,
    /// Goals gain `category`.
    V2,
    /// Objectives gain `targetComparator`, `masteryCriteria` and
    /// `allowableVariance`.
    V3,
    /// Objectives gain the secondary metric; data points gain
    /// `secondaryValue`.
    V4,
}

impl SchemaVersion {
    /// The version the ledger reads and writes natively.
    pub const CURRENT: SchemaVersion = SchemaVersion::V4;

    /// Versions older than current, newest first.
    pub const LEGACY: [SchemaVersion; 3] =
        [SchemaVersion::V3, SchemaVersion::V2, SchemaVersion::V1];

    pub fn number(self) -> u32 {
        match self {
            SchemaVersion::V1 => 1,
            SchemaVersion::V2 => 2,
            SchemaVersion::V3 => 3,
            SchemaVersion::V4 => 4,
        }
    }

    pub fn next(self) -> Option<SchemaVersion> {
        match self {
            SchemaVersion::V1 => Some(SchemaVersion::V2),
            SchemaVersion::V2 => Some(SchemaVersion::V3),
            SchemaVersion::V3 => Some(SchemaVersion::V4),
            SchemaVersion::V4 => None,
        }
    }

    /// Slot key for this version under `prefix`.
    pub fn slot_key(self, prefix: &str) -> String {
        format!("{}_v{}", prefix, self.number())
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_keys() {
        assert_eq!(
            SchemaVersion::CURRENT.slot_key(DEFAULT_SLOT_PREFIX),
            "sprout_iep_data_v4"
        );
        assert_eq!(SchemaVersion::V1.slot_key("other"), "other_v1");
    }

    #[test]
    fn test_versions_walk_forward() {
        let mut version = SchemaVersion::V1;
        let mut seen = vec![version];
        while let Some(next) = version.next() {
            assert!(next > version);
            seen.push(next);
            version = next;
        }
        assert_eq!(version, SchemaVersion::CURRENT);
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_legacy_newest_first() {
        assert!(SchemaVersion::LEGACY.windows(2).all(|w| w[0] > w[1]));
        assert!(!SchemaVersion::LEGACY.contains(&SchemaVersion::CURRENT));
    }
}
