//! Identity merge of two snapshots.

use crate::types::{Identified, LedgerState};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outcome of merging one collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMerge {
    /// Incoming records appended to the result.
    pub added: usize,
    /// Incoming records dropped because their id was already present.
    pub skipped: usize,
}

/// Per-collection outcome of a merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    pub students: CollectionMerge,
    pub goals: CollectionMerge,
    pub objectives: CollectionMerge,
    pub data_points: CollectionMerge,
}

impl MergeReport {
    pub fn total_added(&self) -> usize {
        self.students.added + self.goals.added + self.objectives.added + self.data_points.added
    }

    pub fn total_skipped(&self) -> usize {
        self.students.skipped
            + self.goals.skipped
            + self.objectives.skipped
            + self.data_points.skipped
    }

    /// True when the merge left the base snapshot unchanged.
    pub fn is_noop(&self) -> bool {
        self.total_added() == 0
    }
}

/// Merge `incoming` into `current`.
///
/// Every record of `current` is kept as is and in order. Incoming records are
/// appended in their own order unless a record with the same id is already
/// present, in which case the incoming one is dropped: the base argument
/// always wins a collision. Referential integrity between collections is not
/// checked.
pub fn merge(current: &LedgerState, incoming: &LedgerState) -> LedgerState {
    merge_with_report(current, incoming).0
}

/// Same as [`merge`], also reporting what was added and skipped.
pub fn merge_with_report(
    current: &LedgerState,
    incoming: &LedgerState,
) -> (LedgerState, MergeReport) {
    let (students, students_report) = merge_collection(&current.students, &incoming.students);
    let (goals, goals_report) = merge_collection(&current.goals, &incoming.goals);
    let (objectives, objectives_report) =
        merge_collection(&current.objectives, &incoming.objectives);
    let (data_points, data_points_report) =
        merge_collection(&current.data_points, &incoming.data_points);

    let merged = LedgerState {
        students,
        goals,
        objectives,
        data_points,
    };
    let report = MergeReport {
        students: students_report,
        goals: goals_report,
        objectives: objectives_report,
        data_points: data_points_report,
    };
    (merged, report)
}

fn merge_collection<T>(current: &[T], incoming: &[T]) -> (Vec<T>, CollectionMerge)
where
    T: Identified + Clone,
{
    let mut seen: HashSet<&T::Id> = current.iter().map(Identified::id).collect();
    let mut merged = current.to_vec();
    let mut report = CollectionMerge::default();

    for record in incoming {
        // Also dedupes repeated ids within the incoming side: first one wins.
        if seen.insert(record.id()) {
            merged.push(record.clone());
            report.added += 1;
        } else {
            report.skipped += 1;
        }
    }

    (merged, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Goal, GoalId, Student, StudentId};

    fn student(id: &str, name: &str) -> Student {
        Student {
            id: StudentId::from(id),
            name: name.to_string(),
            grade: "4".to_string(),
            teacher: "Mr. Park".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_base_wins_on_collision() {
        let current = LedgerState {
            students: vec![student("s1", "Ada")],
            ..Default::default()
        };
        let incoming = LedgerState {
            students: vec![student("s1", "Someone Else"), student("s2", "Grace")],
            ..Default::default()
        };

        let (merged, report) = merge_with_report(&current, &incoming);
        assert_eq!(merged.students.len(), 2);
        assert_eq!(merged.students[0].name, "Ada");
        assert_eq!(merged.students[1].name, "Grace");
        assert_eq!(report.students, CollectionMerge { added: 1, skipped: 1 });
    }

    #[test]
    fn test_merge_is_asymmetric() {
        let a = LedgerState {
            students: vec![student("s1", "Ada")],
            ..Default::default()
        };
        let b = LedgerState {
            students: vec![student("s1", "Ada L.")],
            ..Default::default()
        };

        assert_eq!(merge(&a, &b).students[0].name, "Ada");
        assert_eq!(merge(&b, &a).students[0].name, "Ada L.");
    }

    #[test]
    fn test_duplicates_within_incoming_collapse() {
        let incoming = LedgerState {
            students: vec![student("s1", "first"), student("s1", "second")],
            ..Default::default()
        };

        let merged = merge(&LedgerState::empty(), &incoming);
        assert_eq!(merged.students.len(), 1);
        assert_eq!(merged.students[0].name, "first");
    }

    #[test]
    fn test_orphans_are_accepted() {
        let incoming = LedgerState {
            goals: vec![Goal {
                id: GoalId::from("g1"),
                student_id: StudentId::from("missing"),
                ..Default::default()
            }],
            ..Default::default()
        };

        let merged = merge(&LedgerState::empty(), &incoming);
        assert_eq!(merged.goals.len(), 1);
    }

    #[test]
    fn test_merge_into_self_is_noop() {
        let state = LedgerState {
            students: vec![student("s1", "Ada"), student("s2", "Grace")],
            ..Default::default()
        };

        let (merged, report) = merge_with_report(&state, &state);
        assert_eq!(merged, state);
        assert!(report.is_noop());
        assert_eq!(report.total_skipped(), 2);
    }
}
