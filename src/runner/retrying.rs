use log::{debug, info, warn};

use crate::error::{PipeError, Result};
use crate::output::StepProgress;
use crate::providers::pipelines::PipelinesApi;

use super::backoff::BackoffConfig;
use super::context::RunContext;
use super::state::PipedState;
use super::step::{PipedStep, Step};

/// A step plus the policy that keeps ticking it until it is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryingStep {
    label: &'static str,
    step: Step,
    backoff: BackoffConfig,
}

impl RetryingStep {
    pub fn new(label: &'static str, step: Step, backoff: BackoffConfig) -> Self {
        Self {
            label,
            step,
            backoff,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    #[cfg(test)]
    pub fn backoff(&self) -> BackoffConfig {
        self.backoff
    }

    /// Runs `init`, ticks until done, then runs `on_complete`.
    ///
    /// Tick errors are not retried. Every error leaving here carries the
    /// step label.
    pub async fn run<A: PipelinesApi>(
        &self,
        ctx: &RunContext<'_, A>,
        state: &mut PipedState,
    ) -> Result<()> {
        let progress = StepProgress::start(self.label);

        match self.execute(ctx, state, &progress).await {
            Ok(()) => {
                progress.finish();
                Ok(())
            }
            Err(err) => {
                progress.fail();
                Err(err.in_step(self.label))
            }
        }
    }

    async fn execute<A: PipelinesApi>(
        &self,
        ctx: &RunContext<'_, A>,
        state: &mut PipedState,
        progress: &StepProgress,
    ) -> Result<()> {
        let message = ctx.within(self.step.init(ctx, state)).await?;
        progress.update(&message);

        let mut attempt = 0;
        let status = loop {
            if attempt >= self.backoff.max_retries {
                warn!(
                    "{}: not done after {} attempts, giving up",
                    self.label, attempt
                );
                return Err(PipeError::RetryExhausted {
                    step: self.label.to_string(),
                    attempts: attempt,
                });
            }
            attempt += 1;
            debug!(
                "{}: attempt {}/{}",
                self.label, attempt, self.backoff.max_retries
            );

            let status = ctx.within(self.step.tick(ctx, state)).await?;
            progress.update(&status.message);
            if status.done {
                break status;
            }

            if attempt < self.backoff.max_retries {
                ctx.sleep(self.backoff.interval).await?;
            }
        };

        let message = ctx
            .within(self.step.on_complete(ctx, state, &status))
            .await?;
        progress.update(&message);

        info!("{}: done after {} attempt(s)", self.label, attempt);
        Ok(())
    }
}
