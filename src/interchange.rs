//! JSON import and export of whole snapshots.
//!
//! An import document must carry `students` and `goals` arrays. Nothing
//! else is checked: `objectives` and `dataPoints` default to empty, missing
//! or mistyped record fields read as their defaults and are exported again
//! as they were found, and entries that are not objects are skipped.

use crate::error::{LedgerError, Result};
use crate::types::LedgerState;
use serde_json::Value;

const REQUIRED_COLLECTIONS: [&str; 2] = ["students", "goals"];

/// Decode an import document into a snapshot.
///
/// The result is not merged into anything; callers feed it to
/// [`merge`](crate::state::merge) or [`LedgerOperation::Import`](crate::state::LedgerOperation::Import).
pub fn parse_import(bytes: &[u8]) -> Result<LedgerState> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| LedgerError::InvalidImport(format!("not valid JSON: {}", e)))?;

    let Value::Object(fields) = &value else {
        return Err(LedgerError::InvalidImport(
            "top-level value is not an object".to_string(),
        ));
    };

    for key in REQUIRED_COLLECTIONS {
        match fields.get(key) {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(LedgerError::InvalidImport(format!(
                    "`{}` is not an array",
                    key
                )))
            }
            None => return Err(LedgerError::InvalidImport(format!("missing `{}`", key))),
        }
    }

    let state: LedgerState = serde_json::from_value(value)
        .map_err(|e| LedgerError::InvalidImport(e.to_string()))?;

    tracing::debug!(summary = ?state.summary(), "parsed import document");
    Ok(state)
}

/// Pretty-printed JSON of the whole snapshot.
pub fn export_pretty(state: &LedgerState) -> Result<String> {
    Ok(serde_json::to_string_pretty(state)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::merge_with_report;
    use crate::types::{Comparator, Goal, Objective, Student};
    use serde_json::json;

    fn sample() -> LedgerState {
        LedgerState {
            students: vec![Student {
                id: "s1".into(),
                name: "Ada".into(),
                grade: "3".into(),
                teacher: "Ms. Lee".into(),
                ..Default::default()
            }],
            goals: vec![Goal {
                id: "g1".into(),
                student_id: "s1".into(),
                category: "Reading".into(),
                ..Default::default()
            }],
            objectives: vec![Objective {
                id: "o1".into(),
                goal_id: "g1".into(),
                target_value: 3.0,
                target_comparator: Comparator::AtMost,
                ..Default::default()
            }],
            data_points: vec![],
        }
    }

    #[test]
    fn test_export_then_import_merges_as_noop() {
        let state = sample();
        let text = export_pretty(&state).unwrap();
        let imported = parse_import(text.as_bytes()).unwrap();

        assert_eq!(imported, state);
        let (merged, report) = merge_with_report(&state, &imported);
        assert_eq!(merged, state);
        assert!(report.is_noop());
    }

    #[test]
    fn test_optional_collections_default_empty() {
        let bytes = serde_json::to_vec(&json!({
            "students": [{"id": "s1", "name": "Ada"}],
            "goals": [{"id": "g1", "studentId": "s1"}]
        }))
        .unwrap();

        let state = parse_import(&bytes).unwrap();
        assert!(state.objectives.is_empty());
        assert!(state.data_points.is_empty());
        assert_eq!(state.goals[0].category, "General");
    }

    #[test]
    fn test_legacy_objective_gets_default_comparator() {
        let bytes = serde_json::to_vec(&json!({
            "students": [],
            "goals": [],
            "objectives": [{"id": "o1", "goalId": "g1", "targetValue": 10}]
        }))
        .unwrap();

        let state = parse_import(&bytes).unwrap();
        assert_eq!(state.objectives[0].target_comparator, Comparator::AtLeast);
        assert!(!state.objectives[0].has_secondary_metric);
    }

    #[test]
    fn test_rejects_missing_goals() {
        let result = parse_import(br#"{"students": []}"#);
        assert!(matches!(result, Err(LedgerError::InvalidImport(msg)) if msg.contains("goals")));
    }

    #[test]
    fn test_rejects_non_array_students() {
        let result = parse_import(br#"{"students": {}, "goals": []}"#);
        assert!(matches!(result, Err(LedgerError::InvalidImport(msg)) if msg.contains("students")));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            parse_import(b"not json at all"),
            Err(LedgerError::InvalidImport(_))
        ));
        assert!(matches!(
            parse_import(b"[1, 2, 3]"),
            Err(LedgerError::InvalidImport(_))
        ));
    }

    #[test]
    fn test_mistyped_fields_are_accepted() {
        let bytes = br#"{"students": [{"id": "s1", "name": "Ada", "grade": 3}], "goals": [],
            "dataPoints": [{"id": "d1", "objectiveId": "o1", "value": null}]}"#;
        let state = parse_import(bytes).unwrap();

        assert_eq!(state.students[0].name, "Ada");
        assert_eq!(state.students[0].grade, "");
        assert_eq!(state.data_points[0].value, 0.0);

        let exported: Value = serde_json::from_str(&export_pretty(&state).unwrap()).unwrap();
        assert_eq!(exported["students"][0]["grade"], json!(3));
        assert_eq!(exported["dataPoints"][0]["value"], Value::Null);
    }

    #[test]
    fn test_non_object_records_are_skipped() {
        let state = parse_import(br#"{"students": [42, {"id": "s1"}], "goals": []}"#).unwrap();
        assert_eq!(state.students.len(), 1);
        assert_eq!(state.students[0].id.as_str(), "s1");
    }
}
