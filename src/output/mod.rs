mod progress;
mod styling;
mod summary;
mod tables;

pub use progress::StepProgress;
pub use styling::{bright_red, dim, magenta_bold};
pub use summary::{print_run_summary, RunSummary};

/// Prints the `pipewatch` banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🚦 pipewatch"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Trigger and track CI runs for your commit")
    );
}
