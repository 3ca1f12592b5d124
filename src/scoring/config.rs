use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_PARTICIPANTS: usize = 3;
pub const DEFAULT_POINTS: [u32; 5] = [10, 6, 4, 3, 2];
pub const DEFAULT_POINTS_FLOOR: u32 = 1;

/// Ranking and aggregation settings.
///
/// Every key is optional; missing keys fall back to the built-in defaults.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   min_participants: 3
///   points: [10, 6, 4, 3, 2]
///   points_floor: 1
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Departments with fewer members are left out of the department table
    #[serde(default)]
    pub min_participants: Option<usize>,

    /// Points for positions 1, 2, 3, ... in order
    #[serde(default)]
    pub points: Option<Vec<u32>>,

    /// Points for every position past the end of `points`
    #[serde(default)]
    pub points_floor: Option<u32>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_participants: Some(DEFAULT_MIN_PARTICIPANTS),
            points: Some(DEFAULT_POINTS.to_vec()),
            points_floor: Some(DEFAULT_POINTS_FLOOR),
        }
    }
}

impl ScoringConfig {
    pub fn min_participants(&self) -> usize {
        self.min_participants.unwrap_or(DEFAULT_MIN_PARTICIPANTS)
    }

    pub fn schedule(&self) -> PointsSchedule {
        PointsSchedule {
            table: self
                .points
                .clone()
                .unwrap_or_else(|| DEFAULT_POINTS.to_vec()),
            floor: self.points_floor.unwrap_or(DEFAULT_POINTS_FLOOR),
        }
    }
}

/// Position-to-points table. Independent of how many results an exercise has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsSchedule {
    table: Vec<u32>,
    floor: u32,
}

impl Default for PointsSchedule {
    fn default() -> Self {
        Self {
            table: DEFAULT_POINTS.to_vec(),
            floor: DEFAULT_POINTS_FLOOR,
        }
    }
}

impl PointsSchedule {
    pub fn new(table: Vec<u32>, floor: u32) -> Self {
        Self { table, floor }
    }

    /// Points for a 1-based position
    pub fn points_for(&self, position: usize) -> u32 {
        position
            .checked_sub(1)
            .and_then(|i| self.table.get(i))
            .copied()
            .unwrap_or(self.floor)
    }

    /// Points awarded for first place, used by the "Triple Gold" badge
    pub fn first_place(&self) -> u32 {
        self.points_for(1)
    }
}
