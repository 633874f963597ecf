use log::info;

use crate::error::{PipeError, Result};
use crate::providers::pipelines::types::GetRunsOptions;
use crate::providers::pipelines::PipelinesApi;
use crate::runner::context::RunContext;
use crate::runner::state::PipedState;
use crate::runner::step::{PipedStep, StepStatus};

/// Polls the resolved run until it reaches a terminal status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitRun;

impl PipedStep for WaitRun {
    async fn tick<A: PipelinesApi>(
        &self,
        ctx: &RunContext<'_, A>,
        state: &mut PipedState,
    ) -> Result<StepStatus> {
        let run_id = state.require_run_id()?;
        let runs = ctx
            .api
            .get_runs(&GetRunsOptions {
                run_ids: vec![run_id],
                ..Default::default()
            })
            .await?;
        let run = runs
            .first()
            .ok_or_else(|| PipeError::RunNotFound(format!("run {run_id}")))?;

        state.run_status = Some(run.status_code);
        if run.status_code.is_terminal() {
            Ok(StepStatus::done_with(format!(
                "Run #{} finished: {}",
                run.run_number, run.status_code
            )))
        } else {
            Ok(StepStatus::pending(format!(
                "Run #{} is {}",
                run.run_number, run.status_code
            )))
        }
    }

    async fn on_complete<A: PipelinesApi>(
        &self,
        _ctx: &RunContext<'_, A>,
        state: &mut PipedState,
        status: &StepStatus,
    ) -> Result<String> {
        info!("{} (run id {:?})", status.message, state.run_id);
        Ok(String::new())
    }
}
