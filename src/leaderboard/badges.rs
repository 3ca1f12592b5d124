use std::collections::HashSet;

use crate::model::ExerciseResult;

pub const TRIPLE_GOLD_WINS: usize = 3;
pub const VERSATILE_EXERCISES: usize = 5;
pub const DEDICATED_RESULTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    TripleGold,
    Versatile,
    Dedicated,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::TripleGold => "Triple Gold",
            Badge::Versatile => "Versatile",
            Badge::Dedicated => "Dedicated",
        }
    }
}

/// Badges earned from an employee's full approved history, in display order.
///
/// `first_place_points` is the points value of a first-place finish.
pub fn badges_for(
    employee_id: u32,
    results: &[ExerciseResult],
    first_place_points: u32,
) -> Vec<Badge> {
    let own: Vec<&ExerciseResult> = results
        .iter()
        .filter(|r| r.employee_id == employee_id && r.is_approved())
        .collect();

    let wins = own.iter().filter(|r| r.points == first_place_points).count();
    let exercises: HashSet<u32> = own.iter().map(|r| r.exercise_id).collect();

    let mut badges = Vec::new();
    if wins >= TRIPLE_GOLD_WINS {
        badges.push(Badge::TripleGold);
    }
    if exercises.len() >= VERSATILE_EXERCISES {
        badges.push(Badge::Versatile);
    }
    if own.len() >= DEDICATED_RESULTS {
        badges.push(Badge::Dedicated);
    }
    badges
}

/// Space-separated display string, empty when no badge applies
pub fn badge_label(badges: &[Badge]) -> String {
    badges
        .iter()
        .map(|b| b.label())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Entry in the achievement catalogue shown to employees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub name: &'static str,
    pub description: &'static str,
    pub reward: &'static str,
    /// None for achievements that are announced but not awarded yet
    pub badge: Option<Badge>,
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        name: "Triple Gold",
        description: "Finish first in 3 exercises",
        reward: "3x10p",
        badge: Some(Badge::TripleGold),
    },
    Achievement {
        name: "Versatile",
        description: "Compete in 5 or more different exercises",
        reward: "Bonus",
        badge: Some(Badge::Versatile),
    },
    Achievement {
        name: "Dedicated",
        description: "Register 10 or more results",
        reward: "Bonus",
        badge: Some(Badge::Dedicated),
    },
    Achievement {
        name: "On Top",
        description: "Hold first place for 7 days",
        reward: "Upcoming",
        badge: None,
    },
    Achievement {
        name: "Comeback",
        description: "Improve your own result by 20%",
        reward: "Upcoming",
        badge: None,
    },
];
