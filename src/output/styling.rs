use console::style;

use crate::providers::pipelines::types::StatusCode;

/// Styling helpers for terminal output
pub fn bright_yellow(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn bright_green(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn bright_red(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright().red()
}

pub fn cyan(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).cyan()
}

pub fn dim(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn bright(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).bright()
}

pub fn magenta_bold(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

/// Colours a run status: green on success, red on any other final status,
/// yellow while still going.
pub fn run_status(status: Option<StatusCode>) -> String {
    match status {
        Some(status) if status.is_success() => bright_green(status).to_string(),
        Some(status) if status.is_terminal() => bright_red(status).to_string(),
        Some(status) => bright_yellow(status).to_string(),
        None => dim("unknown").to_string(),
    }
}
