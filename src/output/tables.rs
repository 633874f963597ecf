use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::providers::pipelines::types::StatusCode;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

pub fn color_coded_status_cell(status: Option<StatusCode>) -> Cell {
    let Some(status) = status else {
        return Cell::new("-").fg(TableColor::DarkGrey);
    };

    let cell = Cell::new(status.to_string());
    match status {
        StatusCode::Success => cell.fg(TableColor::Green),
        StatusCode::Failure | StatusCode::Error | StatusCode::TimedOut => cell.fg(TableColor::Red),
        StatusCode::Skipped | StatusCode::Cancelled | StatusCode::Stopped => {
            cell.fg(TableColor::DarkGrey)
        }
        _ => cell.fg(TableColor::Yellow),
    }
}

pub fn duration_cell(seconds: Option<u64>) -> Cell {
    match seconds {
        Some(seconds) if seconds >= 60 => Cell::new(format!("{}m {}s", seconds / 60, seconds % 60)),
        Some(seconds) => Cell::new(format!("{seconds}s")),
        None => Cell::new("-"),
    }
}
