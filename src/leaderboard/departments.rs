use std::collections::HashMap;

use super::toplist::EmployeeStanding;
use crate::scoring::engine::best_first;

#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentEntry {
    pub rank: usize,
    pub department: String,
    pub participant_count: usize,
    pub total_points: u32,
    pub avg_points: f64,
    /// Average as a percentage of the department's best member
    pub score_percent: f64,
}

/// Rank departments by how close their average is to their own best member.
///
/// Departments with fewer than `min_participants` members are dropped. Groups
/// keep first-appearance order before sorting, so equal percentages rank in
/// the order their departments first appear.
pub fn build_department_table(
    standings: &[EmployeeStanding],
    min_participants: usize,
) -> Vec<DepartmentEntry> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<u32>> = HashMap::new();
    for s in standings {
        let members = groups.entry(s.department.as_str()).or_insert_with(|| {
            order.push(s.department.as_str());
            Vec::new()
        });
        members.push(s.total_points);
    }

    let mut table: Vec<DepartmentEntry> = order
        .into_iter()
        .filter_map(|department| {
            let members = groups.get(department)?;
            if members.len() < min_participants {
                return None;
            }
            let total: u32 = members.iter().sum();
            let avg = total as f64 / members.len() as f64;
            let best = members.iter().copied().max().unwrap_or(0).max(1);
            Some(DepartmentEntry {
                rank: 0,
                department: department.to_string(),
                participant_count: members.len(),
                total_points: total,
                avg_points: avg,
                score_percent: avg / best as f64 * 100.0,
            })
        })
        .collect();

    table.sort_by(|a, b| best_first(a.score_percent, b.score_percent));
    for (idx, entry) in table.iter_mut().enumerate() {
        entry.rank = idx + 1;
    }
    table
}
