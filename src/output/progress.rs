use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright_green, bright_red, bright_yellow, dim};

/// Spinner shown on stderr while a pipeline step is running.
pub struct StepProgress {
    pb: ProgressBar,
    label: String,
}

impl StepProgress {
    pub fn start(label: &str) -> Self {
        let pb = create_spinner(bright_yellow(label).to_string());
        Self {
            pb,
            label: label.to_string(),
        }
    }

    /// Shows the latest progress message next to the step label.
    pub fn update(&self, message: &str) {
        if message.is_empty() {
            return;
        }
        self.pb.set_message(format!(
            "{} {}",
            bright_yellow(&self.label),
            dim(format!("({message})"))
        ));
    }

    pub fn finish(self) {
        self.pb
            .finish_with_message(bright_green(format!("{} ✓", self.label)).to_string());
    }

    pub fn fail(self) {
        self.pb
            .finish_with_message(bright_red(format!("{} ✗", self.label)).to_string());
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
