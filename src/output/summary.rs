use std::fmt::Write;

use crate::providers::pipelines::types::{PipelineStep, StatusCode};

use super::styling::{bright, bright_yellow, cyan, dim, run_status};
use super::tables::{color_coded_status_cell, create_cyan_header, create_table, duration_cell};

/// Everything needed to report a finished run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pipeline_name: String,
    pub run_number: i64,
    pub branch: String,
    pub commit_sha: String,
    pub status: Option<StatusCode>,
    pub steps: Vec<PipelineStep>,
    pub url: Option<String>,
}

/// Prints the run overview and its step table to stdout.
pub fn print_run_summary(summary: &RunSummary) {
    println!("{}", render_run_summary(summary));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn render_run_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Run");
    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}",
        dim("Pipeline:"),
        cyan(&summary.pipeline_name),
        dim("Run:"),
        bright_yellow(format!("#{}", summary.run_number)),
        dim("Branch:"),
        cyan(&summary.branch),
        dim("Commit:"),
        cyan(&summary.commit_sha),
        dim("Status:"),
        run_status(summary.status),
    );
    if let Some(url) = &summary.url {
        let _ = writeln!(output, "  {} {}", dim("Link:"), cyan(url));
    }
    output.push('\n');

    if summary.steps.is_empty() {
        let _ = writeln!(output, "  {}", dim("No steps reported for this run"));
        return output;
    }

    add_section_header(&mut output, "🧱", "Steps");
    let mut table = create_table();
    table.set_header(create_cyan_header(&["Step", "Status", "Duration"]));
    for step in &summary.steps {
        table.add_row(vec![
            comfy_table::Cell::new(&step.name),
            color_coded_status_cell(step.status_code),
            duration_cell(step.duration_seconds),
        ]);
    }
    let _ = writeln!(output, "{table}");

    output
}
