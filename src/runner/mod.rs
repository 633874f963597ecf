//! Sequential, retrying step pipeline that finds or triggers a run for the
//! current commit and follows it to completion.

mod backoff;
mod context;
mod retrying;
mod state;
mod step;
mod steps;

pub use backoff::BackoffConfig;
pub use context::{PipelineSettings, RunContext};
pub use retrying::RetryingStep;
pub use state::PipedState;
pub use step::Step;
pub use steps::{FindRun, PrintRun, SyncSource, ValidateGitState, WaitRun};

use log::{debug, info};

use crate::error::Result;
use crate::providers::pipelines::PipelinesApi;

/// Ordered list of steps executed against one [`PipedState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeRunner {
    steps: Vec<RetryingStep>,
}

impl PipeRunner {
    pub fn new(steps: Vec<RetryingStep>) -> Self {
        Self { steps }
    }

    /// The full build flow: validate, sync, find or trigger, wait, print.
    ///
    /// Every step uses `backoff` except waiting for the run, which uses
    /// `wait_backoff`.
    pub fn standard(backoff: BackoffConfig, wait_backoff: BackoffConfig) -> Self {
        Self::new(vec![
            RetryingStep::new(
                "validate git state",
                Step::ValidateGitState(ValidateGitState),
                backoff,
            ),
            RetryingStep::new("sync pipelines sources", Step::SyncSource(SyncSource), backoff),
            RetryingStep::new("find or trigger active run", Step::FindRun(FindRun), backoff),
            RetryingStep::new("wait for run to finish", Step::WaitRun(WaitRun), wait_backoff),
            RetryingStep::new("print run results", Step::PrintRun(PrintRun), backoff),
        ])
    }

    #[cfg(test)]
    pub fn steps(&self) -> &[RetryingStep] {
        &self.steps
    }

    /// Runs every step in order, stopping at the first error.
    pub async fn run<A: PipelinesApi>(
        &self,
        ctx: &RunContext<'_, A>,
        mut state: PipedState,
    ) -> Result<PipedState> {
        for step in &self.steps {
            debug!("Starting '{}'", step.label());
            step.run(ctx, &mut state).await?;
        }
        info!(
            "Pipeline finished for run {:?} (#{:?})",
            state.run_id, state.run_number
        );
        Ok(state)
    }
}
