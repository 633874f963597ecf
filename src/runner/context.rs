use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{PipeError, Result};
use crate::providers::pipelines::PipelinesApi;

/// Settings the steps read but never change.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Pipeline names to restrict the branch lookup to.
    pub pipeline_names: Vec<String>,
    /// Remote step triggered when no active run can be reused.
    pub trigger_step: String,
    /// Pause after triggering so the service can materialise the run.
    pub trigger_grace: Duration,
    pub ui_url: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            pipeline_names: Vec::new(),
            trigger_step: "trigger_all".to_string(),
            trigger_grace: Duration::from_secs(3),
            ui_url: String::new(),
        }
    }
}

/// Execution context handed to every step.
///
/// Carries the remote service handle and the overall deadline; every remote
/// call and every sleep goes through [`RunContext::within`] so the deadline
/// interrupts them promptly.
pub struct RunContext<'a, A> {
    pub api: &'a A,
    pub settings: &'a PipelineSettings,
    deadline: Instant,
}

impl<'a, A: PipelinesApi> RunContext<'a, A> {
    pub fn new(api: &'a A, settings: &'a PipelineSettings, timeout: Duration) -> Self {
        Self {
            api,
            settings,
            deadline: Instant::now() + timeout,
        }
    }

    /// Runs `fut` unless the deadline passes first.
    pub async fn within<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout_at(self.deadline, fut)
            .await
            .map_err(|_| PipeError::Cancelled)?
    }

    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.within(async {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::pipelines::fake::FakePipelines;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_within_deadline() {
        let api = FakePipelines::new();
        let settings = PipelineSettings::default();
        let ctx = RunContext::new(&api, &settings, Duration::from_secs(10));

        tokio_test::assert_ok!(ctx.sleep(Duration::from_secs(5)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_past_deadline_is_cancelled_at_deadline() {
        let api = FakePipelines::new();
        let settings = PipelineSettings::default();
        let ctx = RunContext::new(&api, &settings, Duration::from_secs(10));
        let started = Instant::now();

        let result = ctx.sleep(Duration::from_secs(3600)).await;

        assert!(matches!(result, Err(PipeError::Cancelled)));
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }
}
