use crate::error::Result;
use crate::output::{print_run_summary, RunSummary};
use crate::providers::pipelines::links::run_url;
use crate::providers::pipelines::types::GetStepsOptions;
use crate::providers::pipelines::PipelinesApi;
use crate::runner::context::RunContext;
use crate::runner::state::PipedState;
use crate::runner::step::{PipedStep, StepStatus};

/// Prints the finished run and its steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintRun;

impl PrintRun {
    async fn summary<A: PipelinesApi>(
        ctx: &RunContext<'_, A>,
        state: &PipedState,
    ) -> Result<RunSummary> {
        let run_id = state.require_run_id()?;
        let run_number = state.require_run_number()?;
        let pipeline_name = state.pipeline_name.clone().unwrap_or_default();

        let steps = ctx
            .api
            .get_steps(&GetStepsOptions {
                run_ids: vec![run_id],
                ..Default::default()
            })
            .await?;

        let url = (!ctx.settings.ui_url.is_empty()).then(|| {
            run_url(
                &ctx.settings.ui_url,
                &state.project_name,
                &pipeline_name,
                run_number,
                &state.git_branch,
            )
        });

        Ok(RunSummary {
            pipeline_name,
            run_number,
            branch: state.git_branch.clone(),
            commit_sha: state.head_commit_sha.clone(),
            status: state.run_status,
            steps,
            url,
        })
    }
}

impl PipedStep for PrintRun {
    async fn tick<A: PipelinesApi>(
        &self,
        _ctx: &RunContext<'_, A>,
        _state: &mut PipedState,
    ) -> Result<StepStatus> {
        Ok(StepStatus::done())
    }

    async fn on_complete<A: PipelinesApi>(
        &self,
        ctx: &RunContext<'_, A>,
        state: &mut PipedState,
        _status: &StepStatus,
    ) -> Result<String> {
        let summary = Self::summary(ctx, state).await?;
        eprintln!();
        print_run_summary(&summary);
        Ok(String::new())
    }
}
