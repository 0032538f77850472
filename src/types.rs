//! Core types for the progress ledger.
//!
//! The ledger holds four flat collections cross-referenced by id:
//! students own goals, goals own objectives, objectives own data points.
//! Nothing is nested; ownership is expressed only through the parent id
//! carried on each child record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Category assigned to goals written before categories existed.
pub const GENERAL_CATEGORY: &str = "General";

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Produce a fresh 16-character hex token.
fn generate_token() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let count = ID_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(nanos.to_le_bytes());
    hasher.update(count.to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generate a new unique id.
            pub fn generate() -> Self {
                $name(generate_token())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }
    };
}

record_id!(
    /// Unique identifier for a student.
    StudentId
);
record_id!(
    /// Unique identifier for a goal.
    GoalId
);
record_id!(
    /// Unique identifier for an objective.
    ObjectiveId
);
record_id!(
    /// Unique identifier for a data point.
    DataPointId
);

/// Direction of an objective's target threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Comparator {
    #[default]
    #[serde(rename = "at-least", alias = ">=")]
    AtLeast,
    #[serde(rename = "at-most", alias = "<=")]
    AtMost,
}

impl Comparator {
    /// Whether `value` satisfies `target` in this direction.
    pub fn is_met(self, value: f64, target: f64) -> bool {
        match self {
            Comparator::AtLeast => value >= target,
            Comparator::AtMost => value <= target,
        }
    }

    /// Whether `value` has moved past `baseline` in this direction.
    pub fn improved(self, value: f64, baseline: f64) -> bool {
        match self {
            Comparator::AtLeast => value > baseline,
            Comparator::AtMost => value < baseline,
        }
    }
}

/// Known fields of a record exactly as they were read.
///
/// A field whose typed value is unchanged is written back in its original
/// form, so `80` stays `80` and a `null` or mistyped value survives a
/// round trip. Ignored by equality.
#[derive(Clone, Debug, Default)]
pub struct SourceFields(Map<String, Value>);

impl SourceFields {
    pub(crate) fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub(crate) fn insert(&mut self, key: &str, raw: Value) {
        self.0.insert(key.to_string(), raw);
    }
}

impl PartialEq for SourceFields {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// Splits a JSON object into typed fields, leaving the rest as `extra`.
pub(crate) struct FieldReader {
    fields: Map<String, Value>,
    source: Map<String, Value>,
}

impl FieldReader {
    pub(crate) fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            source: Map::new(),
        }
    }

    /// Absent, `null` and mistyped values all read as `default`.
    pub(crate) fn field<T>(&mut self, key: &str, default: impl FnOnce() -> T) -> T
    where
        T: DeserializeOwned,
    {
        let Some(raw) = self.fields.remove(key) else {
            return default();
        };
        let value = T::deserialize(&raw).ok();
        self.source.insert(key.to_string(), raw);
        value.unwrap_or_else(default)
    }

    pub(crate) fn finish(self) -> (Map<String, Value>, SourceFields) {
        (self.fields, SourceFields(self.source))
    }
}

/// Rebuilds a JSON object from typed fields and their source values.
pub(crate) struct FieldWriter<'a> {
    fields: Map<String, Value>,
    source: &'a SourceFields,
}

impl<'a> FieldWriter<'a> {
    pub(crate) fn new(extra: Map<String, Value>, source: &'a SourceFields) -> Self {
        Self {
            fields: extra,
            source,
        }
    }

    /// A field never read and still at its default stays absent.
    pub(crate) fn field<T>(&mut self, key: &str, value: &T, default: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq,
    {
        if let Some(raw) = self.source.get(key) {
            let unchanged = match T::deserialize(raw) {
                Ok(read) => read == *value,
                Err(_) => value == default,
            };
            if unchanged {
                self.fields.insert(key.to_string(), raw.clone());
                return;
            }
        } else if value == default {
            return;
        }
        let encoded = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.insert(key.to_string(), encoded);
    }

    pub(crate) fn finish(self) -> Map<String, Value> {
        self.fields
    }
}

macro_rules! field_default {
    () => {
        ::core::default::Default::default()
    };
    ($default:expr) => {
        $default
    };
}
pub(crate) use field_default;

/// Declare a record type that decodes from any JSON object.
///
/// Each field names its JSON key and, optionally, a default other than
/// `Default::default()`. Unknown keys go to `extra`; the values read for
/// known keys go to `source`.
macro_rules! lenient_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $field:ident: $ty:ty = $key:literal $(=> $default:expr)?,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(
            from = "serde_json::Map<String, serde_json::Value>",
            into = "serde_json::Map<String, serde_json::Value>"
        )]
        pub struct $name {
            $(pub $field: $ty,)*
            /// Fields this version does not know about, kept verbatim.
            pub extra: ::serde_json::Map<String, ::serde_json::Value>,
            pub source: $crate::types::SourceFields,
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $($field: $crate::types::field_default!($($default)?),)*
                    extra: ::serde_json::Map::new(),
                    source: $crate::types::SourceFields::default(),
                }
            }
        }

        impl From<::serde_json::Map<String, ::serde_json::Value>> for $name {
            fn from(fields: ::serde_json::Map<String, ::serde_json::Value>) -> Self {
                let mut reader = $crate::types::FieldReader::new(fields);
                $(
                    let $field: $ty =
                        reader.field($key, || $crate::types::field_default!($($default)?));
                )*
                let (extra, source) = reader.finish();
                Self {
                    $($field,)*
                    extra,
                    source,
                }
            }
        }

        impl From<$name> for ::serde_json::Map<String, ::serde_json::Value> {
            fn from(record: $name) -> Self {
                let mut writer = $crate::types::FieldWriter::new(record.extra, &record.source);
                $(
                    let default: $ty = $crate::types::field_default!($($default)?);
                    writer.field($key, &record.$field, &default);
                )*
                writer.finish()
            }
        }
    };
}
pub(crate) use lenient_record;

/// Decode a collection, skipping entries that are not JSON objects.
pub(crate) fn records<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<Map<String, Value>>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    let mut records = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Value::Object(fields) => records.push(T::from(fields)),
            other => tracing::warn!(value = %other, "skipping record that is not an object"),
        }
    }
    Ok(records)
}

lenient_record! {
    /// Root entity.
    pub struct Student {
        id: StudentId = "id",
        name: String = "name",
        grade: String = "grade",
        teacher: String = "teacher",
        report_summary: Option<String> = "reportSummary",
    }
}

lenient_record! {
    /// A broad goal owned by a student.
    pub struct Goal {
        id: GoalId = "id",
        student_id: StudentId = "studentId",
        category: String = "category" => general_category(),
        description: String = "description",
        present_level: String = "presentLevel",
        created_at: String = "createdAt",
        report_observation: Option<String> = "reportObservation",
    }
}

lenient_record! {
    /// A measurable objective owned by a goal.
    pub struct Objective {
        id: ObjectiveId = "id",
        goal_id: GoalId = "goalId",
        title: String = "title",
        description: String = "description",
        unit: String = "unit",
        target_value: f64 = "targetValue",
        target_comparator: Comparator = "targetComparator",
        baseline_value: f64 = "baselineValue",
        has_secondary_metric: bool = "hasSecondaryMetric",
        secondary_metric_name: Option<String> = "secondaryMetricName",
        mastery_criteria: Option<String> = "masteryCriteria",
        allowable_variance: Option<f64> = "allowableVariance",
        start_date: String = "startDate",
        end_date: String = "endDate",
    }
}

lenient_record! {
    /// A single measurement recorded against an objective.
    pub struct DataPoint {
        id: DataPointId = "id",
        objective_id: ObjectiveId = "objectiveId",
        date: String = "date",
        value: f64 = "value",
        secondary_value: Option<f64> = "secondaryValue",
        notes: Option<String> = "notes",
        recorded_by: String = "recordedBy",
    }
}

impl Student {
    /// A new student with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: StudentId::generate(),
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Goal {
    /// A new goal with a generated id, stamped with the current time.
    pub fn new(student_id: StudentId, category: impl Into<String>) -> Self {
        Self {
            id: GoalId::generate(),
            student_id,
            category: category.into(),
            created_at: now_rfc3339(),
            ..Default::default()
        }
    }
}

impl Objective {
    pub fn new(goal_id: GoalId, title: impl Into<String>) -> Self {
        Self {
            id: ObjectiveId::generate(),
            goal_id,
            title: title.into(),
            ..Default::default()
        }
    }
}

impl DataPoint {
    pub fn new(objective_id: ObjectiveId, date: impl Into<String>, value: f64) -> Self {
        Self {
            id: DataPointId::generate(),
            objective_id,
            date: date.into(),
            value,
            ..Default::default()
        }
    }
}

pub(crate) fn general_category() -> String {
    GENERAL_CATEGORY.to_string()
}

/// A record with a stable identity within its collection.
pub trait Identified {
    type Id: Clone + Eq + Hash + fmt::Debug + fmt::Display;

    /// Human-readable collection name, used in errors and logs.
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;
}

impl Identified for Student {
    type Id = StudentId;
    const KIND: &'static str = "student";

    fn id(&self) -> &StudentId {
        &self.id
    }
}

impl Identified for Goal {
    type Id = GoalId;
    const KIND: &'static str = "goal";

    fn id(&self) -> &GoalId {
        &self.id
    }
}

impl Identified for Objective {
    type Id = ObjectiveId;
    const KIND: &'static str = "objective";

    fn id(&self) -> &ObjectiveId {
        &self.id
    }
}

impl Identified for DataPoint {
    type Id = DataPointId;
    const KIND: &'static str = "data point";

    fn id(&self) -> &DataPointId {
        &self.id
    }
}

/// The whole-state snapshot: four independent ordered collections.
///
/// Decoding requires the `students` and `goals` arrays; the other two
/// collections default to empty. Record fields are never type-checked:
/// a missing or mistyped field reads as its default and is written back
/// as it was found.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    #[serde(deserialize_with = "records")]
    pub students: Vec<Student>,
    #[serde(deserialize_with = "records")]
    pub goals: Vec<Goal>,
    #[serde(default, deserialize_with = "records")]
    pub objectives: Vec<Objective>,
    #[serde(default, deserialize_with = "records")]
    pub data_points: Vec<DataPoint>,
}

impl LedgerState {
    /// The canonical empty state.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
            && self.goals.is_empty()
            && self.objectives.is_empty()
            && self.data_points.is_empty()
    }

    pub fn summary(&self) -> StateSummary {
        StateSummary {
            students: self.students.len(),
            goals: self.goals.len(),
            objectives: self.objectives.len(),
            data_points: self.data_points.len(),
        }
    }

    pub fn student(&self, id: &StudentId) -> Option<&Student> {
        self.students.iter().find(|s| &s.id == id)
    }

    pub fn goal(&self, id: &GoalId) -> Option<&Goal> {
        self.goals.iter().find(|g| &g.id == id)
    }

    pub fn objective(&self, id: &ObjectiveId) -> Option<&Objective> {
        self.objectives.iter().find(|o| &o.id == id)
    }

    pub fn data_point(&self, id: &DataPointId) -> Option<&DataPoint> {
        self.data_points.iter().find(|dp| &dp.id == id)
    }

    pub fn goals_for_student<'a>(&'a self, id: &'a StudentId) -> impl Iterator<Item = &'a Goal> {
        self.goals.iter().filter(move |g| &g.student_id == id)
    }

    pub fn objectives_for_goal<'a>(
        &'a self,
        id: &'a GoalId,
    ) -> impl Iterator<Item = &'a Objective> {
        self.objectives.iter().filter(move |o| &o.goal_id == id)
    }

    /// Data points for an objective, oldest first.
    pub fn data_points_for_objective(&self, id: &ObjectiveId) -> Vec<&DataPoint> {
        let mut points: Vec<&DataPoint> = self
            .data_points
            .iter()
            .filter(|dp| &dp.objective_id == id)
            .collect();
        points.sort_by_key(|dp| (date_key(&dp.date), dp.date.clone()));
        points
    }
}

/// Record counts per collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSummary {
    pub students: usize,
    pub goals: usize,
    pub objectives: usize,
    pub data_points: usize,
}

/// Current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| OffsetDateTime::UNIX_EPOCH.to_string())
}

/// Sort key for a stored date: RFC 3339 timestamps and bare
/// `YYYY-MM-DD` dates map to unix nanos, anything else to `None`.
pub(crate) fn date_key(date: &str) -> Option<i128> {
    if let Ok(ts) = OffsetDateTime::parse(date, &Rfc3339) {
        return Some(ts.unix_timestamp_nanos());
    }
    Date::parse(date, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc().unix_timestamp_nanos())
}
