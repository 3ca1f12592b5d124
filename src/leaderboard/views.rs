use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::model::{Employee, Exercise, ExerciseResult, ResultStatus};
use crate::pace::pace_label;
use crate::scoring::engine::best_first;
use crate::scoring::score;

/// A result joined with its employee and exercise, for the results listing
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedResultRow {
    pub result_id: u32,
    pub result_key: String,
    pub exercise_name: String,
    pub exercise_type: String,
    pub employee_name: String,
    pub value: String,
    /// "M:SS/km" for timed exercises with a known distance, otherwise empty
    pub pace: String,
    pub date: DateTime<Utc>,
    pub status: ResultStatus,
    pub points: u32,
}

/// Every result, newest first. Results whose employee or exercise is gone are
/// left out.
pub fn combined_results(
    employees: &[Employee],
    exercises: &[Exercise],
    results: &[ExerciseResult],
) -> Vec<CombinedResultRow> {
    let employees: HashMap<u32, &Employee> = employees.iter().map(|e| (e.id, e)).collect();
    let exercises: HashMap<u32, &Exercise> = exercises.iter().map(|e| (e.id, e)).collect();

    let mut rows: Vec<CombinedResultRow> = results
        .iter()
        .filter_map(|r| {
            let employee = employees.get(&r.employee_id)?;
            let exercise = exercises.get(&r.exercise_id)?;
            let pace = if exercise.kind().is_time_based() {
                pace_label(&r.value, &exercise.name)
            } else {
                String::new()
            };
            Some(CombinedResultRow {
                result_id: r.id,
                result_key: r.key.clone(),
                exercise_name: exercise.name.clone(),
                exercise_type: exercise.kind_label.clone(),
                employee_name: employee.name.clone(),
                value: r.value.clone(),
                pace,
                date: r.date,
                status: r.status,
                points: r.points,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardCell {
    pub value: Option<String>,
    /// The value equals the best approved value of the whole exercise
    pub exercise_best: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardRow {
    pub employee_name: String,
    pub cells: Vec<BoardCell>,
}

/// Employee-by-exercise matrix of personal bests, both axes sorted by name
#[derive(Debug, Clone, PartialEq)]
pub struct BestResultBoard {
    pub exercises: Vec<String>,
    pub rows: Vec<BoardRow>,
}

fn best_value<'a>(
    candidates: impl Iterator<Item = &'a ExerciseResult>,
    exercise: &Exercise,
) -> Option<&'a ExerciseResult> {
    let mut scored: Vec<(&ExerciseResult, f64)> =
        candidates.map(|r| (r, score(r, exercise))).collect();
    scored.sort_by(|a, b| best_first(a.1, b.1));
    scored.first().map(|(r, _)| *r)
}

pub fn best_result_board(
    employees: &[Employee],
    exercises: &[Exercise],
    results: &[ExerciseResult],
) -> BestResultBoard {
    let mut exercises: Vec<&Exercise> = exercises.iter().collect();
    exercises.sort_by(|a, b| a.name.cmp(&b.name));
    let mut employees: Vec<&Employee> = employees.iter().collect();
    employees.sort_by(|a, b| a.name.cmp(&b.name));

    let approved: Vec<&ExerciseResult> = results.iter().filter(|r| r.is_approved()).collect();

    let overall: Vec<Option<&str>> = exercises
        .iter()
        .map(|ex| {
            best_value(approved.iter().copied().filter(|r| r.exercise_id == ex.id), ex)
                .map(|r| r.value.as_str())
        })
        .collect();

    let rows = employees
        .iter()
        .map(|employee| {
            let cells = exercises
                .iter()
                .zip(&overall)
                .map(|(ex, top)| {
                    let own = approved
                        .iter()
                        .copied()
                        .filter(|r| r.exercise_id == ex.id && r.employee_id == employee.id);
                    let value = best_value(own, ex).map(|r| r.value.clone());
                    let exercise_best = value.is_some() && value.as_deref() == *top;
                    BoardCell {
                        value,
                        exercise_best,
                    }
                })
                .collect();
            BoardRow {
                employee_name: employee.name.clone(),
                cells,
            }
        })
        .collect();

    BestResultBoard {
        exercises: exercises.iter().map(|e| e.name.clone()).collect(),
        rows,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub employees: usize,
    pub exercises: usize,
    pub approved_results: usize,
    pub pending_results: usize,
}

pub fn statistics(
    employees: &[Employee],
    exercises: &[Exercise],
    results: &[ExerciseResult],
) -> Statistics {
    let approved = results.iter().filter(|r| r.is_approved()).count();
    Statistics {
        employees: employees.len(),
        exercises: exercises.len(),
        approved_results: approved,
        pending_results: results.len() - approved,
    }
}
