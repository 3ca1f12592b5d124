use std::cmp::Ordering;

use super::config::PointsSchedule;
use super::factors::score;
use crate::model::{Exercise, ExerciseResult};

/// One approved result placed within its exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub result_id: u32,
    pub result_key: String,
    pub employee_id: u32,
    pub score: f64,
    pub position: usize, // 1-based
    pub points: u32,
    pub stored_points: u32, // points as they were in the snapshot
}

/// A points value that differs from what storage currently holds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointsCorrection {
    pub result_id: u32,
    pub result_key: String,
    pub previous: u32,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseRanking {
    pub exercise_id: u32,
    pub entries: Vec<RankedResult>,
}

impl ExerciseRanking {
    pub fn corrections(&self) -> Vec<PointsCorrection> {
        self.entries
            .iter()
            .filter(|e| e.points != e.stored_points)
            .map(|e| PointsCorrection {
                result_id: e.result_id,
                result_key: e.result_key.clone(),
                previous: e.stored_points,
                points: e.points,
            })
            .collect()
    }
}

/// Tie-break rule shared by every ranking in the crate: higher score first,
/// equal scores keep the order they were encountered in. Callers must pair
/// this with a stable sort.
pub fn best_first(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Rank the approved results of one exercise and assign points.
///
/// Results for other exercises and non-approved results are skipped, so the
/// full result list can be passed in.
pub fn rank_exercise<'a, I>(
    results: I,
    exercise: &Exercise,
    schedule: &PointsSchedule,
) -> ExerciseRanking
where
    I: IntoIterator<Item = &'a ExerciseResult>,
{
    let mut scored: Vec<(&ExerciseResult, f64)> = results
        .into_iter()
        .filter(|r| r.exercise_id == exercise.id && r.is_approved())
        .map(|r| (r, score(r, exercise)))
        .collect();

    // Vec::sort_by is stable
    scored.sort_by(|a, b| best_first(a.1, b.1));

    let entries = scored
        .into_iter()
        .enumerate()
        .map(|(idx, (result, score))| {
            let position = idx + 1;
            RankedResult {
                result_id: result.id,
                result_key: result.key.clone(),
                employee_id: result.employee_id,
                score,
                position,
                points: schedule.points_for(position),
                stored_points: result.points,
            }
        })
        .collect();

    ExerciseRanking {
        exercise_id: exercise.id,
        entries,
    }
}

/// Rank every exercise, in exercise order
pub fn rank_all(
    exercises: &[Exercise],
    results: &[ExerciseResult],
    schedule: &PointsSchedule,
) -> Vec<ExerciseRanking> {
    exercises
        .iter()
        .map(|exercise| rank_exercise(results, exercise, schedule))
        .collect()
}
