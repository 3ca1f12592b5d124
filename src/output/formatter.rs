use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::leaderboard::{
    Achievement, BestResultBoard, CombinedResultRow, DepartmentEntry, Statistics, TopList,
    TopListEntry,
};
use crate::model::ResultStatus;
use crate::pace::{PaceFromSpeed, PaceFromTime};
use crate::scoring::{format_clock, format_pace};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Pad by character count, so names with non-ASCII letters line up
fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.chars().count())
}

/// Name column width for a row whose other columns take `fixed_width`
fn name_width(natural: usize, fixed_width: usize) -> usize {
    match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => natural.min(width - fixed_width),
        // Very narrow terminal
        Some(_) => natural.min(20),
        // No terminal (pipe), don't truncate
        None => natural,
    }
}

/// Gold, silver and bronze on one line, e.g. "1st Ada (20p)  2nd Bo (16p)"
pub fn format_podium(top_list: &TopList, use_colors: bool) -> String {
    let places = [
        ("1st", top_list.gold()),
        ("2nd", top_list.silver()),
        ("3rd", top_list.bronze()),
    ];

    places
        .iter()
        .filter_map(|(place, entry)| entry.map(|e| (place, e)))
        .map(|(place, entry)| {
            let points = format!("({}p)", entry.total_points);
            if use_colors {
                format!("{} {} {}", place.yellow().bold(), entry.name.bold(), points.dimmed())
            } else {
                format!("{} {} {}", place, entry.name, points)
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Format top-list rows as a table: Rank, Points, Name, Department, Badges
/// Rank column: 4 chars (fits "999."), Points column right-aligned, 5 chars
pub fn format_top_list(entries: &[&TopListEntry], use_colors: bool) -> String {
    if entries.is_empty() {
        return "No employees found.".to_string();
    }

    let points_width = 5;
    let separator = "  ";
    let dept_width = column_width(entries.iter().map(|e| e.department.as_str()), "");
    let natural = column_width(entries.iter().map(|e| e.name.as_str()), "");
    let fixed_width = 4 + 1 + points_width + 1 + separator.len() * 3 + dept_width;
    let width = name_width(natural, fixed_width);

    entries
        .iter()
        .map(|entry| {
            let rank_str = format!("{:>3}.", entry.rank);
            let points_str = format!("{:>width$}p", entry.total_points, width = points_width);
            let name = pad(&truncate_name(&entry.name, width), width);
            let department = pad(&entry.department, dept_width);

            let line = if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    rank_str.dimmed(),
                    points_str.bold(),
                    separator,
                    name,
                    separator,
                    department.cyan(),
                    separator,
                    entry.badges.yellow()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    rank_str,
                    points_str,
                    separator,
                    name,
                    separator,
                    department,
                    separator,
                    entry.badges
                )
            };
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the department table with participant count, totals and score
pub fn format_department_table(entries: &[DepartmentEntry], use_colors: bool) -> String {
    if entries.is_empty() {
        return "No departments with enough participants.".to_string();
    }

    let dept_width = column_width(entries.iter().map(|e| e.department.as_str()), "Department");
    let header = format!(
        "{:>4} {}  {:>7}  {:>6}  {:>7}  {:>7}",
        "#",
        pad("Department", dept_width),
        "Members",
        "Points",
        "Average",
        "Score"
    );

    let rows = entries.iter().map(|entry| {
        let score = format!("{:.2}%", entry.score_percent);
        let line = format!(
            "{:>3}. {}  {:>7}  {:>6}  {:>7.1}  {:>7}",
            entry.rank,
            pad(&entry.department, dept_width),
            entry.participant_count,
            entry.total_points,
            entry.avg_points,
            score
        );
        if use_colors && entry.rank == 1 {
            line.bold().to_string()
        } else {
            line
        }
    });

    let header = if use_colors {
        header.dimmed().to_string()
    } else {
        header
    };
    std::iter::once(header)
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format every result, one per line:
/// "{date} | {employee} | {exercise} | {value} ({pace}) | {status} | {points}p"
pub fn format_combined_results(rows: &[CombinedResultRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No results registered.".to_string();
    }

    rows.iter()
        .map(|row| {
            let date = row.date.format("%Y-%m-%d").to_string();
            let value = if row.pace.is_empty() {
                row.value.clone()
            } else {
                format!("{} ({})", row.value, row.pace)
            };
            let status = row.status.label();

            if use_colors {
                let status = if row.status == ResultStatus::Approved {
                    status.green().to_string()
                } else {
                    status.yellow().to_string()
                };
                format!(
                    "{} | {} | {} | {} | {} | {}p",
                    date.dimmed(),
                    row.employee_name.bold(),
                    row.exercise_name.cyan(),
                    value,
                    status,
                    row.points
                )
            } else {
                format!(
                    "{} | {} | {} | {} | {} | {}p",
                    date, row.employee_name, row.exercise_name, value, status, row.points
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the best-result matrix. Missing values show as "-"; an exercise's
/// overall best is marked with "*".
pub fn format_board(board: &BestResultBoard, use_colors: bool) -> String {
    if board.rows.is_empty() || board.exercises.is_empty() {
        return "Nothing to show yet.".to_string();
    }

    let name_col = column_width(board.rows.iter().map(|r| r.employee_name.as_str()), "Employee");
    let widths: Vec<usize> = board
        .exercises
        .iter()
        .enumerate()
        .map(|(i, exercise)| {
            let longest = board
                .rows
                .iter()
                .filter_map(|r| r.cells.get(i))
                .map(|c| c.value.as_deref().unwrap_or("-").chars().count() + 1)
                .max()
                .unwrap_or(1);
            longest.max(exercise.chars().count())
        })
        .collect();

    let mut lines = Vec::with_capacity(board.rows.len() + 1);
    let header = std::iter::once(pad("Employee", name_col))
        .chain(board.exercises.iter().zip(&widths).map(|(e, w)| pad(e, *w)))
        .collect::<Vec<_>>()
        .join("  ");
    lines.push(if use_colors {
        header.bold().to_string()
    } else {
        header
    });

    for row in &board.rows {
        let mut line = pad(&row.employee_name, name_col);
        for (cell, width) in row.cells.iter().zip(&widths) {
            let text = match &cell.value {
                Some(value) if cell.exercise_best => format!("{}*", value),
                Some(value) => value.clone(),
                None => "-".to_string(),
            };
            let text = pad(&text, *width);
            line.push_str("  ");
            if use_colors && cell.exercise_best {
                line.push_str(&text.green().bold().to_string());
            } else {
                line.push_str(&text);
            }
        }
        lines.push(line.trim_end().to_string());
    }

    lines.join("\n")
}

pub fn format_statistics(stats: &Statistics) -> String {
    format!(
        "Employees: {}\nExercises: {}\nApproved results: {}\nPending approval: {}",
        stats.employees, stats.exercises, stats.approved_results, stats.pending_results
    )
}

/// Format the achievement catalogue: "{name} - {description} [{reward}]"
pub fn format_achievements(achievements: &[Achievement], use_colors: bool) -> String {
    achievements
        .iter()
        .map(|a| {
            let reward = format!("[{}]", a.reward);
            if use_colors {
                if a.badge.is_some() {
                    format!("{} - {} {}", a.name.bold(), a.description, reward.yellow())
                } else {
                    format!("{} - {} {}", a.name.dimmed(), a.description.dimmed(), reward.dimmed())
                }
            } else {
                format!("{} - {} {}", a.name, a.description, reward)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// "Pace: 4:00 per km" and "Speed: 15.00 km/h"
pub fn format_pace_from_time(result: &PaceFromTime) -> String {
    format!(
        "Pace: {} per km\nSpeed: {:.2} km/h",
        format_pace(result.pace_sec_per_km),
        result.speed_kmh
    )
}

/// "Time: 00:12:00" and "Pace: 4:00 per km"
pub fn format_pace_from_speed(result: &PaceFromSpeed) -> String {
    format!(
        "Time: {}\nPace: {} per km",
        format_clock(result.elapsed_seconds),
        format_pace(result.pace_sec_per_km)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::{build_top_list, BoardCell, BoardRow, ACHIEVEMENTS};
    use crate::model::{Employee, Exercise, ExerciseResult};
    use crate::pace::{from_distance_and_speed, from_distance_and_time};
    use crate::scoring::PointsSchedule;
    use chrono::{TimeZone, Utc};

    fn entry(rank: usize, name: &str, department: &str, points: u32) -> TopListEntry {
        TopListEntry {
            rank,
            employee_id: rank as u32,
            name: name.to_string(),
            department: department.to_string(),
            badges: String::new(),
            total_points: points,
        }
    }

    // truncate_name tests
    #[test]
    fn test_truncate_name_short() {
        assert_eq!(truncate_name("Ada", 20), "Ada");
    }

    #[test]
    fn test_truncate_name_long() {
        assert_eq!(truncate_name("Kristoffer Gaarden", 10), "Kristof...");
    }

    #[test]
    fn test_truncate_name_unicode() {
        assert_eq!(truncate_name("Bjørn Ødegård", 13), "Bjørn Ødegård");
        assert_eq!(truncate_name("Bjørn Ødegård", 8), "Bjørn...");
    }

    #[test]
    fn test_truncate_name_very_narrow() {
        assert_eq!(truncate_name("Hello world", 3), "Hel");
    }

    #[test]
    fn test_pad_counts_chars() {
        assert_eq!(pad("Ø", 3), "Ø  ");
        assert_eq!(pad("long", 2), "long");
    }

    #[test]
    fn test_format_top_list_empty() {
        assert_eq!(format_top_list(&[], false), "No employees found.");
    }

    #[test]
    fn test_format_top_list_rows() {
        let mut first = entry(1, "Ada", "IT", 20);
        first.badges = "Triple Gold".to_string();
        let second = entry(2, "Bo", "Sales", 6);
        let result = format_top_list(&[&first, &second], false);
        let lines: Vec<&str> = result.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  1."));
        assert!(lines[0].contains("20p"));
        assert!(lines[0].contains("Ada"));
        assert!(lines[0].ends_with("Triple Gold"));
        assert!(lines[1].starts_with("  2."));
        assert!(lines[1].contains("Sales"));
    }

    #[test]
    fn test_format_podium() {
        assert_eq!(format_podium(&TopList::default(), false), "");

        let employees: Vec<Employee> = ["Ada", "Bo"]
            .iter()
            .enumerate()
            .map(|(i, name)| Employee {
                key: String::new(),
                id: i as u32 + 1,
                name: name.to_string(),
                department: "IT".to_string(),
            })
            .collect();
        let exercises = vec![Exercise {
            key: String::new(),
            id: 1,
            name: "Squat".to_string(),
            kind_label: "Strength".to_string(),
            unit: None,
        }];
        let results: Vec<ExerciseResult> = [(1, "100"), (2, "120")]
            .iter()
            .map(|(id, value)| ExerciseResult {
                key: format!("res-{}", id),
                id: *id,
                employee_id: *id,
                exercise_id: 1,
                value: value.to_string(),
                date: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
                status: ResultStatus::Approved,
                points: 0,
            })
            .collect();
        let build = build_top_list(&employees, &exercises, &results, &PointsSchedule::default());

        assert_eq!(format_podium(&build.top_list, false), "1st Bo (10p)  2nd Ada (6p)");
    }

    #[test]
    fn test_format_department_table() {
        let entries = vec![DepartmentEntry {
            rank: 1,
            department: "IT".to_string(),
            participant_count: 3,
            total_points: 60,
            avg_points: 20.0,
            score_percent: 66.666_666,
        }];
        let result = format_department_table(&entries, false);
        let lines: Vec<&str> = result.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Department"));
        assert!(lines[1].contains("IT"));
        assert!(lines[1].contains("66.67%"));
        assert!(lines[1].contains("20.0"));
    }

    #[test]
    fn test_format_department_table_empty() {
        assert_eq!(
            format_department_table(&[], false),
            "No departments with enough participants."
        );
    }

    #[test]
    fn test_format_combined_results() {
        let rows = vec![CombinedResultRow {
            result_id: 1,
            result_key: "res-000001".to_string(),
            exercise_name: "3km".to_string(),
            exercise_type: "Running".to_string(),
            employee_name: "Ada".to_string(),
            value: "12:00".to_string(),
            pace: "4:00/km".to_string(),
            date: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
            status: ResultStatus::Pending,
            points: 0,
        }];
        let result = format_combined_results(&rows, false);
        assert_eq!(
            result,
            format!(
                "2024-06-01 | Ada | 3km | 12:00 (4:00/km) | {} | 0p",
                ResultStatus::Pending.label()
            )
        );
    }

    #[test]
    fn test_format_board_marks() {
        let board = BestResultBoard {
            exercises: vec!["Squat".to_string()],
            rows: vec![
                BoardRow {
                    employee_name: "Ada".to_string(),
                    cells: vec![BoardCell {
                        value: Some("110".to_string()),
                        exercise_best: true,
                    }],
                },
                BoardRow {
                    employee_name: "Bo".to_string(),
                    cells: vec![BoardCell {
                        value: None,
                        exercise_best: false,
                    }],
                },
            ],
        };
        let result = format_board(&board, false);
        let lines: Vec<&str> = result.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Employee"));
        assert!(lines[1].ends_with("110*"));
        assert!(lines[2].ends_with("-"));
    }

    #[test]
    fn test_format_statistics() {
        let stats = Statistics {
            employees: 3,
            exercises: 2,
            approved_results: 5,
            pending_results: 1,
        };
        let result = format_statistics(&stats);
        assert!(result.contains("Employees: 3"));
        assert!(result.contains("Pending approval: 1"));
    }

    #[test]
    fn test_format_achievements() {
        let result = format_achievements(ACHIEVEMENTS, false);
        assert_eq!(result.lines().count(), ACHIEVEMENTS.len());
        assert!(result.contains("Triple Gold - Finish first in 3 exercises [3x10p]"));
        assert!(result.contains("[Upcoming]"));
    }

    #[test]
    fn test_format_pace_from_time() {
        let pace = from_distance_and_time(3.0, 720.0).unwrap();
        assert_eq!(format_pace_from_time(&pace), "Pace: 4:00 per km\nSpeed: 15.00 km/h");
    }

    #[test]
    fn test_format_pace_from_speed() {
        let pace = from_distance_and_speed(3.0, 15.0).unwrap();
        assert_eq!(format_pace_from_speed(&pace), "Time: 00:12:00\nPace: 4:00 per km");
    }
}
