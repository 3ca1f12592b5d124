use std::collections::HashMap;

use super::badges::{badge_label, badges_for};
use crate::model::{Employee, Exercise, ExerciseResult};
use crate::scoring::engine::best_first;
use crate::scoring::{rank_all, PointsCorrection, PointsSchedule};

/// Derived fields for one employee, recomputed on every pass
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeStanding {
    pub employee_id: u32,
    pub name: String,
    pub department: String,
    pub total_points: u32,
    pub badges: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopListEntry {
    pub rank: usize,
    pub employee_id: u32,
    pub name: String,
    pub department: String,
    pub badges: String,
    pub total_points: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopList {
    entries: Vec<TopListEntry>,
}

impl TopList {
    pub fn entries(&self) -> &[TopListEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn gold(&self) -> Option<&TopListEntry> {
        self.entries.first()
    }

    pub fn silver(&self) -> Option<&TopListEntry> {
        self.entries.get(1)
    }

    pub fn bronze(&self) -> Option<&TopListEntry> {
        self.entries.get(2)
    }

    /// Case-insensitive match on name or department; ranks are kept
    pub fn search(&self, text: &str) -> Vec<&TopListEntry> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|e| {
                e.name.to_lowercase().contains(&needle)
                    || e.department.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

/// Output of a leaderboard build: the ranked list plus everything derived on
/// the way there.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardBuild {
    pub top_list: TopList,
    /// One per employee, in input order
    pub standings: Vec<EmployeeStanding>,
    /// Input results with freshly ranked points written in
    pub results: Vec<ExerciseResult>,
    pub corrections: Vec<PointsCorrection>,
}

/// Rank every exercise, write the new points into a copy of the results and
/// rank employees by their summed points.
///
/// Results whose exercise no longer exists are left as they are and do not
/// count towards any total. Employees with equal totals keep input order.
pub fn build_top_list(
    employees: &[Employee],
    exercises: &[Exercise],
    results: &[ExerciseResult],
    schedule: &PointsSchedule,
) -> LeaderboardBuild {
    let rankings = rank_all(exercises, results, schedule);

    let corrections: Vec<PointsCorrection> =
        rankings.iter().flat_map(|r| r.corrections()).collect();

    let mut ranked_points: HashMap<u32, u32> = HashMap::new();
    for entry in rankings.iter().flat_map(|r| r.entries.iter()) {
        ranked_points.insert(entry.result_id, entry.points);
    }

    let results: Vec<ExerciseResult> = results
        .iter()
        .map(|r| {
            let mut r = r.clone();
            if let Some(points) = ranked_points.get(&r.id) {
                r.points = *points;
            }
            r
        })
        .collect();

    // Results of deleted exercises keep their stale points but earn nothing
    let ranked: Vec<ExerciseResult> = results
        .iter()
        .filter(|r| ranked_points.contains_key(&r.id))
        .cloned()
        .collect();

    let mut totals: HashMap<u32, u32> = HashMap::new();
    for r in &ranked {
        *totals.entry(r.employee_id).or_default() += r.points;
    }

    let first_place = schedule.first_place();
    let standings: Vec<EmployeeStanding> = employees
        .iter()
        .map(|e| EmployeeStanding {
            employee_id: e.id,
            name: e.name.clone(),
            department: e.department.clone(),
            total_points: totals.get(&e.id).copied().unwrap_or(0),
            badges: badge_label(&badges_for(e.id, &ranked, first_place)),
        })
        .collect();

    let mut ordered: Vec<&EmployeeStanding> = standings.iter().collect();
    ordered.sort_by(|a, b| best_first(a.total_points as f64, b.total_points as f64));

    let entries = ordered
        .into_iter()
        .enumerate()
        .map(|(idx, s)| TopListEntry {
            rank: idx + 1,
            employee_id: s.employee_id,
            name: s.name.clone(),
            department: s.department.clone(),
            badges: s.badges.clone(),
            total_points: s.total_points,
        })
        .collect();

    LeaderboardBuild {
        top_list: TopList { entries },
        standings,
        results,
        corrections,
    }
}
