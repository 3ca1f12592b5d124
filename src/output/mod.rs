pub mod formatter;

pub use formatter::{
    format_achievements, format_board, format_combined_results, format_department_table,
    format_pace_from_speed, format_pace_from_time, format_podium, format_statistics,
    format_top_list, should_use_colors,
};
