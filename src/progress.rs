//! Progress analysis for a single objective.

use crate::types::{DataPoint, Objective};
use serde::{Deserialize, Serialize};

/// Where an objective stands relative to its baseline and target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveStatus {
    /// No data point recorded yet.
    NoData,
    /// The latest value meets the target.
    TargetMet,
    /// The latest value moved past the baseline toward the target.
    MakingProgress,
    /// The latest value equals the baseline.
    MaintainedBaseline,
    /// The latest value is on the wrong side of the baseline.
    NeedsAttention,
}

/// The data series of an objective and its evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectiveProgress<'a> {
    /// Points recorded against the objective, oldest first.
    pub points: Vec<&'a DataPoint>,
    pub status: ObjectiveStatus,
}

impl<'a> ObjectiveProgress<'a> {
    pub fn latest(&self) -> Option<&'a DataPoint> {
        self.points.last().copied()
    }
}

/// Evaluate `objective` against the points in `data_points` that belong to it.
///
/// Points for other objectives are ignored, so the whole collection can be
/// passed in. The target check comes first, then progress from baseline.
pub fn analyze_objective<'a>(
    objective: &Objective,
    data_points: &'a [DataPoint],
) -> ObjectiveProgress<'a> {
    let mut points: Vec<&DataPoint> = data_points
        .iter()
        .filter(|dp| dp.objective_id == objective.id)
        .collect();
    points.sort_by_key(|dp| (crate::types::date_key(&dp.date), dp.date.clone()));

    let status = match points.last() {
        None => ObjectiveStatus::NoData,
        Some(latest) => status_for(objective, latest.value),
    };

    ObjectiveProgress { points, status }
}

fn status_for(objective: &Objective, value: f64) -> ObjectiveStatus {
    let comparator = objective.target_comparator;
    if comparator.is_met(value, objective.target_value) {
        ObjectiveStatus::TargetMet
    } else if comparator.improved(value, objective.baseline_value) {
        ObjectiveStatus::MakingProgress
    } else if value == objective.baseline_value {
        ObjectiveStatus::MaintainedBaseline
    } else {
        ObjectiveStatus::NeedsAttention
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Comparator;

    fn objective(comparator: Comparator, baseline: f64, target: f64) -> Objective {
        Objective {
            id: "o1".into(),
            goal_id: "g1".into(),
            baseline_value: baseline,
            target_value: target,
            target_comparator: comparator,
            ..Default::default()
        }
    }

    fn point(id: &str, date: &str, value: f64) -> DataPoint {
        DataPoint {
            id: id.into(),
            objective_id: "o1".into(),
            date: date.into(),
            value,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_data() {
        let progress = analyze_objective(&objective(Comparator::AtLeast, 40.0, 80.0), &[]);
        assert_eq!(progress.status, ObjectiveStatus::NoData);
        assert!(progress.latest().is_none());
    }

    #[test]
    fn test_latest_is_by_date_not_position() {
        let points = vec![
            point("d2", "2024-03-01", 85.0),
            point("d1", "2024-01-01", 50.0),
        ];
        let progress = analyze_objective(&objective(Comparator::AtLeast, 40.0, 80.0), &points);

        assert_eq!(progress.latest().map(|dp| dp.id.as_str()), Some("d2"));
        assert_eq!(progress.status, ObjectiveStatus::TargetMet);
    }

    #[test]
    fn test_statuses_aiming_high() {
        let obj = objective(Comparator::AtLeast, 40.0, 80.0);
        let cases = [
            (80.0, ObjectiveStatus::TargetMet),
            (55.0, ObjectiveStatus::MakingProgress),
            (40.0, ObjectiveStatus::MaintainedBaseline),
            (30.0, ObjectiveStatus::NeedsAttention),
        ];
        for (value, expected) in cases {
            let points = [point("d1", "2024-01-01", value)];
            assert_eq!(analyze_objective(&obj, &points).status, expected, "value {}", value);
        }
    }

    #[test]
    fn test_statuses_aiming_low() {
        let obj = objective(Comparator::AtMost, 10.0, 2.0);
        let cases = [
            (2.0, ObjectiveStatus::TargetMet),
            (6.0, ObjectiveStatus::MakingProgress),
            (10.0, ObjectiveStatus::MaintainedBaseline),
            (12.0, ObjectiveStatus::NeedsAttention),
        ];
        for (value, expected) in cases {
            let points = [point("d1", "2024-01-01", value)];
            assert_eq!(analyze_objective(&obj, &points).status, expected, "value {}", value);
        }
    }

    #[test]
    fn test_ignores_other_objectives() {
        let mut foreign = point("d9", "2025-01-01", 100.0);
        foreign.objective_id = "o2".into();
        let points = vec![point("d1", "2024-01-01", 30.0), foreign];

        let progress = analyze_objective(&objective(Comparator::AtLeast, 40.0, 80.0), &points);
        assert_eq!(progress.points.len(), 1);
        assert_eq!(progress.status, ObjectiveStatus::NeedsAttention);
    }
}
