//! Ledger operation application.

use super::cascade::{DeletionClosure, DeletionRoot};
use super::merge::merge;
use crate::error::{LedgerError, Result};
use crate::types::{
    DataPoint, DataPointId, Goal, GoalId, Identified, LedgerState, Objective, ObjectiveId,
    Student, StudentId,
};
use serde::{Deserialize, Serialize};

/// A change to the ledger, expressed as data.
///
/// Updates replace the whole record matched by id; there is no partial
/// field patching.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data", rename_all = "snake_case")]
pub enum LedgerOperation {
    AddStudent(Student),
    AddGoal(Goal),
    AddObjective(Objective),
    AddDataPoint(DataPoint),

    ReplaceStudent(Student),
    ReplaceGoal(Goal),
    ReplaceObjective(Objective),
    ReplaceDataPoint(DataPoint),

    DeleteStudent(StudentId),
    DeleteGoal(GoalId),
    DeleteObjective(ObjectiveId),
    DeleteDataPoint(DataPointId),

    /// Identity-merge a foreign snapshot into the current one.
    Import(LedgerState),
}

impl LedgerOperation {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            LedgerOperation::AddStudent(_) => "add_student",
            LedgerOperation::AddGoal(_) => "add_goal",
            LedgerOperation::AddObjective(_) => "add_objective",
            LedgerOperation::AddDataPoint(_) => "add_data_point",
            LedgerOperation::ReplaceStudent(_) => "replace_student",
            LedgerOperation::ReplaceGoal(_) => "replace_goal",
            LedgerOperation::ReplaceObjective(_) => "replace_objective",
            LedgerOperation::ReplaceDataPoint(_) => "replace_data_point",
            LedgerOperation::DeleteStudent(_) => "delete_student",
            LedgerOperation::DeleteGoal(_) => "delete_goal",
            LedgerOperation::DeleteObjective(_) => "delete_objective",
            LedgerOperation::DeleteDataPoint(_) => "delete_data_point",
            LedgerOperation::Import(_) => "import",
        }
    }
}

/// Apply an operation to a snapshot, producing the replacement snapshot.
///
/// Adds fail on a duplicate id and replacements fail on an unknown id.
/// Deletes and imports never fail. A child whose parent is missing is
/// accepted as is.
pub fn apply_operation(state: &LedgerState, operation: LedgerOperation) -> Result<LedgerState> {
    match operation {
        LedgerOperation::AddStudent(student) => edit(state, |s| add(&mut s.students, student)),
        LedgerOperation::AddGoal(goal) => edit(state, |s| add(&mut s.goals, goal)),
        LedgerOperation::AddObjective(objective) => {
            edit(state, |s| add(&mut s.objectives, objective))
        }
        LedgerOperation::AddDataPoint(point) => edit(state, |s| add(&mut s.data_points, point)),

        LedgerOperation::ReplaceStudent(student) => edit(state, |s| {
            let id = student.id.to_string();
            replace(&mut s.students, student).ok_or(LedgerError::StudentNotFound(id))
        }),
        LedgerOperation::ReplaceGoal(goal) => edit(state, |s| {
            let id = goal.id.to_string();
            replace(&mut s.goals, goal).ok_or(LedgerError::GoalNotFound(id))
        }),
        LedgerOperation::ReplaceObjective(objective) => edit(state, |s| {
            let id = objective.id.to_string();
            replace(&mut s.objectives, objective).ok_or(LedgerError::ObjectiveNotFound(id))
        }),
        LedgerOperation::ReplaceDataPoint(point) => edit(state, |s| {
            let id = point.id.to_string();
            replace(&mut s.data_points, point).ok_or(LedgerError::DataPointNotFound(id))
        }),

        LedgerOperation::DeleteStudent(id) => Ok(delete(state, DeletionRoot::Student(id))),
        LedgerOperation::DeleteGoal(id) => Ok(delete(state, DeletionRoot::Goal(id))),
        LedgerOperation::DeleteObjective(id) => Ok(delete(state, DeletionRoot::Objective(id))),
        LedgerOperation::DeleteDataPoint(id) => Ok(delete(state, DeletionRoot::DataPoint(id))),

        LedgerOperation::Import(incoming) => Ok(merge(state, &incoming)),
    }
}

/// Run `change` against a copy of `state`.
fn edit<F>(state: &LedgerState, change: F) -> Result<LedgerState>
where
    F: FnOnce(&mut LedgerState) -> Result<()>,
{
    let mut next = state.clone();
    change(&mut next)?;
    Ok(next)
}

fn add<T: Identified>(records: &mut Vec<T>, record: T) -> Result<()> {
    if records.iter().any(|r| r.id() == record.id()) {
        return Err(LedgerError::DuplicateId {
            kind: T::KIND,
            id: record.id().to_string(),
        });
    }
    records.push(record);
    Ok(())
}

/// Swap the record with a matching id in place. `None` when absent.
fn replace<T: Identified>(records: &mut [T], record: T) -> Option<()> {
    let slot = records.iter_mut().find(|r| r.id() == record.id())?;
    *slot = record;
    Some(())
}

fn delete(state: &LedgerState, root: DeletionRoot) -> LedgerState {
    let closure = DeletionClosure::compute(state, &root);
    tracing::debug!(root = ?root, removed = closure.len(), "cascade delete");
    closure.apply(state)
}
