//! Cascade deletion.
//!
//! A deletion first computes the full set of dependent ids, walking down the
//! ownership hierarchy from the root, and only then rewrites all four
//! collections in a single pass.

use crate::types::{DataPointId, GoalId, LedgerState, ObjectiveId, StudentId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The record a deletion starts from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum DeletionRoot {
    Student(StudentId),
    Goal(GoalId),
    Objective(ObjectiveId),
    DataPoint(DataPointId),
}

/// Every id removed by a deletion, per collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeletionClosure {
    pub students: HashSet<StudentId>,
    pub goals: HashSet<GoalId>,
    pub objectives: HashSet<ObjectiveId>,
    pub data_points: HashSet<DataPointId>,
}

impl DeletionClosure {
    /// Collect the root and everything it transitively owns in `state`.
    pub fn compute(state: &LedgerState, root: &DeletionRoot) -> Self {
        let mut closure = DeletionClosure::default();

        match root {
            DeletionRoot::Student(id) => {
                closure.students.insert(id.clone());
                closure.goals = state
                    .goals
                    .iter()
                    .filter(|g| &g.student_id == id)
                    .map(|g| g.id.clone())
                    .collect();
                closure.objectives = objectives_owned_by(state, &closure.goals);
                closure.data_points = data_points_owned_by(state, &closure.objectives);
            }
            DeletionRoot::Goal(id) => {
                closure.goals.insert(id.clone());
                closure.objectives = objectives_owned_by(state, &closure.goals);
                closure.data_points = data_points_owned_by(state, &closure.objectives);
            }
            DeletionRoot::Objective(id) => {
                closure.objectives.insert(id.clone());
                closure.data_points = data_points_owned_by(state, &closure.objectives);
            }
            DeletionRoot::DataPoint(id) => {
                closure.data_points.insert(id.clone());
            }
        }

        closure
    }

    /// Number of ids in the closure, root included.
    pub fn len(&self) -> usize {
        self.students.len() + self.goals.len() + self.objectives.len() + self.data_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rewrite all four collections without the closure's members.
    pub fn apply(&self, state: &LedgerState) -> LedgerState {
        LedgerState {
            students: state
                .students
                .iter()
                .filter(|s| !self.students.contains(&s.id))
                .cloned()
                .collect(),
            goals: state
                .goals
                .iter()
                .filter(|g| !self.goals.contains(&g.id))
                .cloned()
                .collect(),
            objectives: state
                .objectives
                .iter()
                .filter(|o| !self.objectives.contains(&o.id))
                .cloned()
                .collect(),
            data_points: state
                .data_points
                .iter()
                .filter(|dp| !self.data_points.contains(&dp.id))
                .cloned()
                .collect(),
        }
    }
}

fn objectives_owned_by(state: &LedgerState, goals: &HashSet<GoalId>) -> HashSet<ObjectiveId> {
    state
        .objectives
        .iter()
        .filter(|o| goals.contains(&o.goal_id))
        .map(|o| o.id.clone())
        .collect()
}

fn data_points_owned_by(
    state: &LedgerState,
    objectives: &HashSet<ObjectiveId>,
) -> HashSet<DataPointId> {
    state
        .data_points
        .iter()
        .filter(|dp| objectives.contains(&dp.objective_id))
        .map(|dp| dp.id.clone())
        .collect()
}

fn delete_from(state: &LedgerState, root: DeletionRoot) -> LedgerState {
    DeletionClosure::compute(state, &root).apply(state)
}

/// Remove a student with all of its goals, objectives and data points.
pub fn delete_student(state: &LedgerState, id: &StudentId) -> LedgerState {
    delete_from(state, DeletionRoot::Student(id.clone()))
}

/// Remove a goal with all of its objectives and their data points.
pub fn delete_goal(state: &LedgerState, id: &GoalId) -> LedgerState {
    delete_from(state, DeletionRoot::Goal(id.clone()))
}

/// Remove an objective and its data points.
pub fn delete_objective(state: &LedgerState, id: &ObjectiveId) -> LedgerState {
    delete_from(state, DeletionRoot::Objective(id.clone()))
}

pub fn delete_data_point(state: &LedgerState, id: &DataPointId) -> LedgerState {
    delete_from(state, DeletionRoot::DataPoint(id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataPoint, Goal, Objective, Student};

    fn sample() -> LedgerState {
        LedgerState {
            students: vec![
                Student {
                    id: "s1".into(),
                    name: "Ada".into(),
                    ..Default::default()
                },
                Student {
                    id: "s2".into(),
                    name: "Grace".into(),
                    ..Default::default()
                },
            ],
            goals: vec![
                Goal {
                    id: "g1".into(),
                    student_id: "s1".into(),
                    ..Default::default()
                },
                Goal {
                    id: "g2".into(),
                    student_id: "s2".into(),
                    ..Default::default()
                },
            ],
            objectives: vec![
                Objective {
                    id: "o1".into(),
                    goal_id: "g1".into(),
                    target_value: 80.0,
                    baseline_value: 20.0,
                    ..Default::default()
                },
                Objective {
                    id: "o2".into(),
                    goal_id: "g2".into(),
                    ..Default::default()
                },
            ],
            data_points: vec![
                DataPoint {
                    id: "d1".into(),
                    objective_id: "o1".into(),
                    value: 85.0,
                    ..Default::default()
                },
                DataPoint {
                    id: "d2".into(),
                    objective_id: "o1".into(),
                    value: 60.0,
                    ..Default::default()
                },
                DataPoint {
                    id: "d3".into(),
                    objective_id: "o2".into(),
                    value: 5.0,
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_closure_for_student() {
        let state = sample();
        let closure = DeletionClosure::compute(&state, &DeletionRoot::Student("s1".into()));

        assert!(closure.goals.contains(&GoalId::from("g1")));
        assert!(closure.objectives.contains(&ObjectiveId::from("o1")));
        assert_eq!(closure.data_points.len(), 2);
        assert_eq!(closure.len(), 5);
    }

    #[test]
    fn test_delete_student_keeps_other_students() {
        let state = delete_student(&sample(), &"s1".into());

        assert_eq!(state.students.len(), 1);
        assert_eq!(state.goals.len(), 1);
        assert_eq!(state.objectives[0].id.as_str(), "o2");
        assert_eq!(state.data_points[0].id.as_str(), "d3");
    }

    #[test]
    fn test_delete_goal() {
        let state = delete_goal(&sample(), &"g1".into());

        assert_eq!(state.students.len(), 2);
        assert!(state.goal(&"g1".into()).is_none());
        assert!(state.objective(&"o1".into()).is_none());
        assert!(state.data_points.iter().all(|dp| dp.objective_id.as_str() != "o1"));
    }

    #[test]
    fn test_delete_objective() {
        let state = delete_objective(&sample(), &"o2".into());

        assert_eq!(state.goals.len(), 2);
        assert_eq!(state.objectives.len(), 1);
        assert_eq!(state.data_points.len(), 2);
    }

    #[test]
    fn test_delete_data_point_is_leaf() {
        let state = delete_data_point(&sample(), &"d1".into());

        assert_eq!(state.objectives.len(), 2);
        assert_eq!(state.data_points.len(), 2);
    }

    #[test]
    fn test_delete_unknown_id_changes_nothing() {
        let before = sample();
        let after = delete_goal(&before, &"nope".into());
        assert_eq!(before, after);
    }
}
