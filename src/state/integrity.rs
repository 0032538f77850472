//! Read-only referential integrity diagnostics.
//!
//! Nothing in the ledger calls this on its own: loads and merges tolerate
//! orphaned children. Callers that want to surface them ask explicitly.

use crate::types::{DataPointId, GoalId, LedgerState, ObjectiveId};
use std::collections::HashSet;

/// Child records whose direct parent id is absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrphanReport {
    pub goals: Vec<GoalId>,
    pub objectives: Vec<ObjectiveId>,
    pub data_points: Vec<DataPointId>,
}

impl OrphanReport {
    pub fn is_clean(&self) -> bool {
        self.goals.is_empty() && self.objectives.is_empty() && self.data_points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.goals.len() + self.objectives.len() + self.data_points.len()
    }
}

/// List orphans in `state`. Only the immediate parent is checked, so a data
/// point under an orphaned objective is not itself reported.
pub fn orphans(state: &LedgerState) -> OrphanReport {
    let students: HashSet<_> = state.students.iter().map(|s| &s.id).collect();
    let goals: HashSet<_> = state.goals.iter().map(|g| &g.id).collect();
    let objectives: HashSet<_> = state.objectives.iter().map(|o| &o.id).collect();

    OrphanReport {
        goals: state
            .goals
            .iter()
            .filter(|g| !students.contains(&g.student_id))
            .map(|g| g.id.clone())
            .collect(),
        objectives: state
            .objectives
            .iter()
            .filter(|o| !goals.contains(&o.goal_id))
            .map(|o| o.id.clone())
            .collect(),
        data_points: state
            .data_points
            .iter()
            .filter(|dp| !objectives.contains(&dp.objective_id))
            .map(|dp| dp.id.clone())
            .collect(),
    }
}
