//! Record shapes of earlier schema versions.
//!
//! Fields introduced later are simply absent from the older shapes, so a
//! value an older slot already carries for them lands in `extra`. Goals
//! share the current shape from v2 on; students never changed.

use crate::error::Result;
use crate::types::{
    lenient_record, records, Comparator, DataPointId, Goal, GoalId, ObjectiveId, Student,
    StudentId,
};
use serde::{Deserialize, Serialize};

use super::SchemaVersion;

lenient_record! {
    /// Goal before categories existed.
    pub struct GoalV1 {
        id: GoalId = "id",
        student_id: StudentId = "studentId",
        description: String = "description",
        present_level: String = "presentLevel",
        created_at: String = "createdAt",
        report_observation: Option<String> = "reportObservation",
    }
}

lenient_record! {
    /// Objective of v1 and v2: no comparator, the target was always a floor.
    pub struct ObjectiveV1 {
        id: ObjectiveId = "id",
        goal_id: GoalId = "goalId",
        title: String = "title",
        description: String = "description",
        unit: String = "unit",
        target_value: f64 = "targetValue",
        baseline_value: f64 = "baselineValue",
        start_date: String = "startDate",
        end_date: String = "endDate",
    }
}

lenient_record! {
    /// Objective of v3: comparator and mastery details, no secondary metric.
    pub struct ObjectiveV3 {
        id: ObjectiveId = "id",
        goal_id: GoalId = "goalId",
        title: String = "title",
        description: String = "description",
        unit: String = "unit",
        target_value: f64 = "targetValue",
        target_comparator: Comparator = "targetComparator",
        baseline_value: f64 = "baselineValue",
        mastery_criteria: Option<String> = "masteryCriteria",
        allowable_variance: Option<f64> = "allowableVariance",
        start_date: String = "startDate",
        end_date: String = "endDate",
    }
}

lenient_record! {
    /// Data point of v1 through v3: a single value.
    pub struct DataPointV1 {
        id: DataPointId = "id",
        objective_id: ObjectiveId = "objectiveId",
        date: String = "date",
        value: f64 = "value",
        notes: Option<String> = "notes",
        recorded_by: String = "recordedBy",
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentV1 {
    #[serde(default, deserialize_with = "records")]
    pub students: Vec<Student>,
    #[serde(deserialize_with = "records")]
    pub goals: Vec<GoalV1>,
    #[serde(deserialize_with = "records")]
    pub objectives: Vec<ObjectiveV1>,
    #[serde(default, deserialize_with = "records")]
    pub data_points: Vec<DataPointV1>,
}

/// v2 added goal categories, though not every v2 writer set one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentV2 {
    #[serde(default, deserialize_with = "records")]
    pub students: Vec<Student>,
    #[serde(deserialize_with = "records")]
    pub goals: Vec<Goal>,
    #[serde(deserialize_with = "records")]
    pub objectives: Vec<ObjectiveV1>,
    #[serde(default, deserialize_with = "records")]
    pub data_points: Vec<DataPointV1>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentV3 {
    #[serde(default, deserialize_with = "records")]
    pub students: Vec<Student>,
    #[serde(deserialize_with = "records")]
    pub goals: Vec<Goal>,
    #[serde(deserialize_with = "records")]
    pub objectives: Vec<ObjectiveV3>,
    #[serde(default, deserialize_with = "records")]
    pub data_points: Vec<DataPointV1>,
}

/// A document of some schema older than current.
#[derive(Clone, Debug, PartialEq)]
pub enum LegacyDocument {
    V1(DocumentV1),
    V2(DocumentV2),
    V3(DocumentV3),
}

impl LegacyDocument {
    pub fn decode_v1(bytes: &[u8]) -> Result<Self> {
        Ok(LegacyDocument::V1(serde_json::from_slice(bytes)?))
    }

    pub fn decode_v2(bytes: &[u8]) -> Result<Self> {
        Ok(LegacyDocument::V2(serde_json::from_slice(bytes)?))
    }

    pub fn decode_v3(bytes: &[u8]) -> Result<Self> {
        Ok(LegacyDocument::V3(serde_json::from_slice(bytes)?))
    }

    pub fn version(&self) -> SchemaVersion {
        match self {
            LegacyDocument::V1(_) => SchemaVersion::V1,
            LegacyDocument::V2(_) => SchemaVersion::V2,
            LegacyDocument::V3(_) => SchemaVersion::V3,
        }
    }
}
