use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::ExerciseKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Opaque storage key assigned by the store
    #[serde(default)]
    pub key: String,
    pub id: u32,
    pub name: String,
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default)]
    pub key: String,
    pub id: u32,
    pub name: String,
    /// Free-text type label, e.g. "Running", "Strength (kg)"
    #[serde(rename = "type")]
    pub kind_label: String,
    #[serde(default)]
    pub unit: Option<String>,
}

impl Exercise {
    /// Classify the free-text type label into a comparison family
    pub fn kind(&self) -> ExerciseKind {
        ExerciseKind::from_label(&self.kind_label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultStatus {
    #[default]
    Pending,
    Approved,
}

impl ResultStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ResultStatus::Pending => "Pending",
            ResultStatus::Approved => "Approved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseResult {
    #[serde(default)]
    pub key: String,
    pub id: u32,
    pub employee_id: u32,
    pub exercise_id: u32,
    /// Raw value as entered: "H:MM:SS"/"M:SS" for timed exercises, decimal otherwise
    pub value: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub status: ResultStatus,
    #[serde(default)]
    pub points: u32,
}

impl ExerciseResult {
    pub fn is_approved(&self) -> bool {
        self.status == ResultStatus::Approved
    }
}
