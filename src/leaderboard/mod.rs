pub mod badges;
pub mod departments;
pub mod toplist;
pub mod views;

pub use badges::{badge_label, badges_for, Achievement, Badge, ACHIEVEMENTS};
pub use departments::{build_department_table, DepartmentEntry};
pub use toplist::{build_top_list, EmployeeStanding, LeaderboardBuild, TopList, TopListEntry};
pub use views::{
    best_result_board, combined_results, statistics, BestResultBoard, BoardCell, BoardRow,
    CombinedResultRow, Statistics,
};
