use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::{Employee, Exercise, ExerciseResult, ResultStatus};
use crate::scoring::{check_value, ValidationError};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("no employee with id {0}")]
    UnknownEmployee(u32),
    #[error("no exercise with id {0}")]
    UnknownExercise(u32),
    #[error("no result with id {0}")]
    UnknownResult(u32),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Everything the engine reads in one pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub results: Vec<ExerciseResult>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    /// Create a new empty snapshot with the current version
    pub fn new() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            employees: Vec::new(),
            exercises: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty() && self.exercises.is_empty() && self.results.is_empty()
    }

    fn next_id<T>(items: &[T], id: impl Fn(&T) -> u32) -> u32 {
        items.iter().map(id).max().map_or(1, |max| max + 1)
    }

    pub fn employee(&self, id: u32) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn exercise(&self, id: u32) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn add_employee(
        &mut self,
        name: &str,
        department: &str,
    ) -> Result<&Employee, SnapshotError> {
        let name = name.trim();
        let department = department.trim();
        if name.is_empty() {
            return Err(SnapshotError::MissingField("name"));
        }
        if department.is_empty() {
            return Err(SnapshotError::MissingField("department"));
        }

        let id = Self::next_id(&self.employees, |e| e.id);
        self.employees.push(Employee {
            key: format!("emp-{:06}", id),
            id,
            name: name.to_string(),
            department: department.to_string(),
        });
        Ok(&self.employees[self.employees.len() - 1])
    }

    pub fn add_exercise(
        &mut self,
        name: &str,
        kind_label: &str,
    ) -> Result<&Exercise, SnapshotError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SnapshotError::MissingField("name"));
        }
        let kind_label = match kind_label.trim() {
            "" => "Other",
            label => label,
        };

        let id = Self::next_id(&self.exercises, |e| e.id);
        self.exercises.push(Exercise {
            key: format!("ex-{:06}", id),
            id,
            name: name.to_string(),
            kind_label: kind_label.to_string(),
            unit: Some(kind_label.to_string()),
        });
        Ok(&self.exercises[self.exercises.len() - 1])
    }

    /// Register a result after validating its value against the exercise kind.
    ///
    /// Results entered by an admin are approved immediately; everyone else's
    /// wait for approval.
    pub fn add_result(
        &mut self,
        employee_id: u32,
        exercise_id: u32,
        value: &str,
        date: DateTime<Utc>,
        by_admin: bool,
    ) -> Result<&ExerciseResult, SnapshotError> {
        if self.employee(employee_id).is_none() {
            return Err(SnapshotError::UnknownEmployee(employee_id));
        }
        let kind = self
            .exercise(exercise_id)
            .map(|e| e.kind())
            .ok_or(SnapshotError::UnknownExercise(exercise_id))?;
        check_value(value, kind)?;

        let id = Self::next_id(&self.results, |r| r.id);
        self.results.push(ExerciseResult {
            key: format!("res-{:06}", id),
            id,
            employee_id,
            exercise_id,
            value: value.to_string(),
            date,
            status: if by_admin {
                ResultStatus::Approved
            } else {
                ResultStatus::Pending
            },
            points: 0,
        });
        Ok(&self.results[self.results.len() - 1])
    }

    pub fn approve_result(&mut self, id: u32) -> Result<(), SnapshotError> {
        let result = self
            .results
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(SnapshotError::UnknownResult(id))?;
        result.status = ResultStatus::Approved;
        Ok(())
    }

    /// Rejecting a result deletes it
    pub fn reject_result(&mut self, id: u32) -> Result<(), SnapshotError> {
        let before = self.results.len();
        self.results.retain(|r| r.id != id);
        if self.results.len() == before {
            return Err(SnapshotError::UnknownResult(id));
        }
        Ok(())
    }

    /// Remove an employee. Their results are left for the caller to clean up.
    pub fn remove_employee(&mut self, id: u32) -> bool {
        let before = self.employees.len();
        self.employees.retain(|e| e.id != id);
        self.employees.len() != before
    }

    pub fn remove_exercise(&mut self, id: u32) -> bool {
        let before = self.exercises.len();
        self.exercises.retain(|e| e.id != id);
        self.exercises.len() != before
    }

    /// Give every record without a unique storage key one derived from its id.
    ///
    /// Points corrections address results by key, so two results sharing a
    /// key (or both lacking one) could never be corrected independently.
    /// Returns how many keys were assigned.
    pub fn assign_missing_keys(&mut self) -> usize {
        let mut assigned = fill_keys(&mut self.employees, "emp", |e| (&mut e.key, e.id));
        assigned += fill_keys(&mut self.exercises, "ex", |e| (&mut e.key, e.id));
        assigned += fill_keys(&mut self.results, "res", |r| (&mut r.key, r.id));
        assigned
    }

    /// Overwrite the stored points of the result with the given storage key.
    /// Returns false when no such result exists.
    pub fn set_points(&mut self, result_key: &str, points: u32) -> bool {
        match self.results.iter_mut().find(|r| r.key == result_key) {
            Some(result) => {
                result.points = points;
                true
            }
            None => false,
        }
    }

    /// Populate an empty store with a small demo roster
    pub fn seed_sample_data(&mut self) {
        let employees = [
            ("Kristoffer Gaarden", "IT"),
            ("Ole Nordmann", "Sales"),
            ("Kari Nordmann", "HR"),
        ];
        for (name, department) in employees {
            let _ = self.add_employee(name, department);
        }

        let exercises = [
            ("3000m running", "Running (HH:MM:SS)"),
            ("Bench press", "Strength (kg)"),
            ("Pull-ups", "Repetitions (reps)"),
        ];
        for (name, kind) in exercises {
            let _ = self.add_exercise(name, kind);
        }

        let date = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).single().unwrap_or_default();
        let results = [(1, 1, "12:45"), (2, 1, "13:10"), (2, 2, "95"), (3, 3, "14")];
        for (employee_id, exercise_id, value) in results {
            let _ = self.add_result(employee_id, exercise_id, value, date, true);
        }
    }
}

fn fill_keys<T>(
    items: &mut [T],
    prefix: &str,
    slot: impl Fn(&mut T) -> (&mut String, u32),
) -> usize {
    let mut seen: HashSet<String> = HashSet::new();
    let mut assigned = 0;
    for item in items.iter_mut() {
        let (key, id) = slot(item);
        if !key.is_empty() && seen.insert(key.clone()) {
            continue;
        }
        let mut candidate = format!("{}-{:06}", prefix, id);
        let mut suffix = 1;
        while seen.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}-{:06}-{}", prefix, id, suffix);
        }
        seen.insert(candidate.clone());
        *key = candidate;
        assigned += 1;
    }
    assigned
}
