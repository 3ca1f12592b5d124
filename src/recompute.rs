use tracing::debug;

use crate::leaderboard::{
    build_department_table, build_top_list, combined_results, statistics, CombinedResultRow,
    DepartmentEntry, EmployeeStanding, Statistics, TopList,
};
use crate::model::{Employee, Exercise, ExerciseResult};
use crate::scoring::{PointsCorrection, PointsSchedule, ScoringConfig};
use crate::store::Snapshot;

#[derive(Debug, Clone, PartialEq)]
pub struct RecomputeSettings {
    pub min_participants: usize,
    pub schedule: PointsSchedule,
}

impl Default for RecomputeSettings {
    fn default() -> Self {
        (&ScoringConfig::default()).into()
    }
}

impl From<&ScoringConfig> for RecomputeSettings {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            min_participants: config.min_participants(),
            schedule: config.schedule(),
        }
    }
}

/// Everything a recompute pass derives from one snapshot.
///
/// Corrections are returned, not written: the caller decides when (and
/// whether) to persist them.
#[derive(Debug, Clone, PartialEq)]
pub struct RecomputeOutput {
    pub top_list: TopList,
    pub department_table: Vec<DepartmentEntry>,
    pub combined_results: Vec<CombinedResultRow>,
    pub standings: Vec<EmployeeStanding>,
    pub statistics: Statistics,
    pub corrections: Vec<PointsCorrection>,
}

/// Pure recompute of every derived value. Same input, same output.
pub fn recompute(
    employees: &[Employee],
    exercises: &[Exercise],
    results: &[ExerciseResult],
    settings: &RecomputeSettings,
) -> RecomputeOutput {
    let build = build_top_list(employees, exercises, results, &settings.schedule);
    let department_table = build_department_table(&build.standings, settings.min_participants);
    let combined_results = combined_results(employees, exercises, &build.results);
    let statistics = statistics(employees, exercises, &build.results);

    debug!(
        employees = employees.len(),
        exercises = exercises.len(),
        results = results.len(),
        corrections = build.corrections.len(),
        "recomputed leaderboard"
    );

    RecomputeOutput {
        top_list: build.top_list,
        department_table,
        combined_results,
        standings: build.standings,
        statistics,
        corrections: build.corrections,
    }
}

pub fn recompute_snapshot(snapshot: &Snapshot, settings: &RecomputeSettings) -> RecomputeOutput {
    recompute(
        &snapshot.employees,
        &snapshot.exercises,
        &snapshot.results,
        settings,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let config = ScoringConfig {
            min_participants: Some(2),
            points: Some(vec![3, 2]),
            points_floor: Some(0),
        };
        let settings = RecomputeSettings::from(&config);
        assert_eq!(settings.min_participants, 2);
        assert_eq!(settings.schedule.points_for(3), 0);
    }

    #[test]
    fn test_sample_data_recompute() {
        let mut snapshot = Snapshot::new();
        snapshot.seed_sample_data();
        let output = recompute_snapshot(&snapshot, &RecomputeSettings::default());

        assert_eq!(output.top_list.len(), snapshot.employees.len());
        assert_eq!(output.standings.len(), snapshot.employees.len());
        assert_eq!(output.combined_results.len(), snapshot.results.len());
        assert!(!output.corrections.is_empty());
    }

    #[test]
    fn test_corrections_reach_views() {
        let mut snapshot = Snapshot::new();
        snapshot.seed_sample_data();
        let output = recompute_snapshot(&snapshot, &RecomputeSettings::default());

        for correction in &output.corrections {
            let row = output
                .combined_results
                .iter()
                .find(|r| r.result_id == correction.result_id)
                .unwrap();
            assert_eq!(row.points, correction.points);
        }
    }
}
