//! One-step upgraders between adjacent schema versions.
//!
//! Each step copies every existing field and fills the fields introduced by
//! the next version:
//!
//! | step    | record     | field                 | default      |
//! |---------|------------|-----------------------|--------------|
//! | v1 → v2 | goal       | `category`            | `"General"`  |
//! | v2 → v3 | goal       | `category` (if unset) | `"General"`  |
//! | v2 → v3 | objective  | `targetComparator`    | `at-least`   |
//! | v2 → v3 | objective  | `masteryCriteria`     | absent       |
//! | v2 → v3 | objective  | `allowableVariance`   | absent       |
//! | v3 → v4 | objective  | `hasSecondaryMetric`  | `false`      |
//! | v3 → v4 | objective  | `secondaryMetricName` | absent       |
//! | v3 → v4 | data point | `secondaryValue`      | absent       |
//!
//! A document stored under an older slot may already carry a field its
//! version did not define; such a value lands in the record's `extra` map
//! and is adopted into the typed field instead of being replaced. Every
//! other value is carried in the form it was read, and a field the input
//! lacked stays absent unless the table above fills it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::legacy::{
    DataPointV1, DocumentV1, DocumentV2, DocumentV3, GoalV1, LegacyDocument, ObjectiveV1,
    ObjectiveV3,
};
use crate::types::{
    general_category, Comparator, DataPoint, Goal, LedgerState, Objective, SourceFields,
};

/// Result of a single upgrade step.
#[derive(Clone, Debug, PartialEq)]
pub enum Upgraded {
    /// Still older than current; more steps follow.
    Legacy(LegacyDocument),
    /// Reached the current schema.
    Current(LedgerState),
}

impl LegacyDocument {
    /// Advance exactly one schema version.
    pub fn upgrade(self) -> Upgraded {
        match self {
            LegacyDocument::V1(doc) => Upgraded::Legacy(LegacyDocument::V2(upgrade_v1_to_v2(doc))),
            LegacyDocument::V2(doc) => Upgraded::Legacy(LegacyDocument::V3(upgrade_v2_to_v3(doc))),
            LegacyDocument::V3(doc) => Upgraded::Current(upgrade_v3_to_v4(doc)),
        }
    }

    /// Chain every remaining step up to the current schema.
    pub fn into_current(self) -> LedgerState {
        let mut doc = self;
        loop {
            let from = doc.version();
            match doc.upgrade() {
                Upgraded::Legacy(next) => {
                    tracing::debug!(from = %from, to = %next.version(), "upgraded document");
                    doc = next;
                }
                Upgraded::Current(state) => {
                    tracing::debug!(from = %from, "upgraded document to current schema");
                    return state;
                }
            }
        }
    }
}

/// Move `key` out of `extra` if it holds a usable `T`.
///
/// An unusable value stays in `extra` untouched.
fn adopt<T: DeserializeOwned>(
    extra: &mut Map<String, Value>,
    source: &mut SourceFields,
    key: &str,
) -> Option<T> {
    let raw = extra.remove(key)?;
    match T::deserialize(&raw) {
        Ok(value) => {
            source.insert(key, raw);
            Some(value)
        }
        Err(_) => {
            extra.insert(key.to_string(), raw);
            None
        }
    }
}

/// Like [`adopt`] for a field the next version always writes: an absent or
/// unusable value is replaced by `default`.
fn fill<T: DeserializeOwned + Serialize>(
    extra: &mut Map<String, Value>,
    source: &mut SourceFields,
    key: &str,
    default: T,
) -> T {
    if let Some(raw) = extra.remove(key) {
        match T::deserialize(&raw) {
            Ok(value) => {
                source.insert(key, raw);
                return value;
            }
            Err(e) => tracing::warn!(field = key, error = %e, "discarding unreadable legacy field"),
        }
    }
    source.insert(key, serde_json::to_value(&default).unwrap_or(Value::Null));
    default
}

pub fn upgrade_v1_to_v2(doc: DocumentV1) -> DocumentV2 {
    DocumentV2 {
        students: doc.students,
        goals: doc.goals.into_iter().map(goal_v1_to_v2).collect(),
        objectives: doc.objectives,
        data_points: doc.data_points,
    }
}

fn goal_v1_to_v2(goal: GoalV1) -> Goal {
    let GoalV1 {
        id,
        student_id,
        description,
        present_level,
        created_at,
        report_observation,
        mut extra,
        mut source,
    } = goal;

    let category = fill(&mut extra, &mut source, "category", general_category());
    Goal {
        id,
        student_id,
        category,
        description,
        present_level,
        created_at,
        report_observation,
        extra,
        source,
    }
}

pub fn upgrade_v2_to_v3(doc: DocumentV2) -> DocumentV3 {
    DocumentV3 {
        students: doc.students,
        goals: doc.goals.into_iter().map(goal_v2_to_v3).collect(),
        objectives: doc.objectives.into_iter().map(objective_v1_to_v3).collect(),
        data_points: doc.data_points,
    }
}

/// From v3 on every goal is written with a non-empty category.
fn goal_v2_to_v3(mut goal: Goal) -> Goal {
    if goal.category.is_empty() {
        goal.category = general_category();
    }
    goal.source.insert("category", Value::from(goal.category.as_str()));
    goal
}

fn objective_v1_to_v3(objective: ObjectiveV1) -> ObjectiveV3 {
    let ObjectiveV1 {
        id,
        goal_id,
        title,
        description,
        unit,
        target_value,
        baseline_value,
        start_date,
        end_date,
        mut extra,
        mut source,
    } = objective;

    let target_comparator = fill(&mut extra, &mut source, "targetComparator", Comparator::AtLeast);
    let mastery_criteria = adopt(&mut extra, &mut source, "masteryCriteria");
    let allowable_variance = adopt(&mut extra, &mut source, "allowableVariance");

    ObjectiveV3 {
        id,
        goal_id,
        title,
        description,
        unit,
        target_value,
        target_comparator,
        baseline_value,
        mastery_criteria,
        allowable_variance,
        start_date,
        end_date,
        extra,
        source,
    }
}

pub fn upgrade_v3_to_v4(doc: DocumentV3) -> LedgerState {
    LedgerState {
        students: doc.students,
        goals: doc.goals,
        objectives: doc.objectives.into_iter().map(objective_v3_to_v4).collect(),
        data_points: doc.data_points.into_iter().map(data_point_v1_to_v4).collect(),
    }
}

fn objective_v3_to_v4(objective: ObjectiveV3) -> Objective {
    let ObjectiveV3 {
        id,
        goal_id,
        title,
        description,
        unit,
        target_value,
        target_comparator,
        baseline_value,
        mastery_criteria,
        allowable_variance,
        start_date,
        end_date,
        mut extra,
        mut source,
    } = objective;

    let has_secondary_metric = fill(&mut extra, &mut source, "hasSecondaryMetric", false);
    let secondary_metric_name = adopt(&mut extra, &mut source, "secondaryMetricName");

    Objective {
        id,
        goal_id,
        title,
        description,
        unit,
        target_value,
        target_comparator,
        baseline_value,
        has_secondary_metric,
        secondary_metric_name,
        mastery_criteria,
        allowable_variance,
        start_date,
        end_date,
        extra,
        source,
    }
}

fn data_point_v1_to_v4(point: DataPointV1) -> DataPoint {
    let DataPointV1 {
        id,
        objective_id,
        date,
        value,
        notes,
        recorded_by,
        mut extra,
        mut source,
    } = point;

    let secondary_value = adopt(&mut extra, &mut source, "secondaryValue");

    DataPoint {
        id,
        objective_id,
        date,
        value,
        secondary_value,
        notes,
        recorded_by,
        extra,
        source,
    }
}
