//! Finds the active run for the current commit, or triggers a new one.
//!
//! A run is reused only when it is still processing and one of its git
//! resource versions points at `HEAD`. Otherwise the configured trigger step
//! is fired and the newest run of the pipeline is taken as the result. Two
//! concurrent invocations for the same commit can still both trigger.

use std::collections::HashSet;

use log::{debug, info};

use crate::error::{PipeError, Result};
use crate::providers::pipelines::types::{
    GetPipelinesOptions, GetRunResourcesOptions, GetRunsOptions, GetStepsOptions, Pipeline,
    RunResourceVersion, SortOrder, StatusCode,
};
use crate::providers::pipelines::PipelinesApi;
use crate::runner::context::RunContext;
use crate::runner::state::PipedState;
use crate::runner::step::{PipedStep, StepStatus};

const ACTIVE_RUNS_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindRun;

impl FindRun {
    async fn resolve_pipeline<A: PipelinesApi>(
        ctx: &RunContext<'_, A>,
        state: &PipedState,
    ) -> Result<Pipeline> {
        let pipelines = ctx
            .api
            .get_pipelines(&GetPipelinesOptions {
                sort_by: Some("latestRunId".to_string()),
                sort_order: Some(SortOrder::Descending),
                filter_by: Some(state.git_branch.clone()),
                names: ctx.settings.pipeline_names.clone(),
                light: true,
                limit: None,
            })
            .await?;

        pipelines
            .into_iter()
            .next()
            .ok_or_else(|| PipeError::PipelineNotFound {
                branch: state.git_branch.clone(),
            })
    }

    fn trigger_new(state: &mut PipedState, message: &str) -> StepStatus {
        state.should_trigger_run = true;
        StepStatus::done_with(message)
    }

    async fn trigger<A: PipelinesApi>(
        ctx: &RunContext<'_, A>,
        state: &mut PipedState,
    ) -> Result<String> {
        let pipeline_id = state.require_pipeline_id()?;
        let step_name = &ctx.settings.trigger_step;

        let steps = ctx
            .api
            .get_steps(&GetStepsOptions {
                pipeline_ids: vec![pipeline_id],
                pipeline_source_ids: vec![state.pipelines_source_id],
                names: vec![step_name.clone()],
                ..Default::default()
            })
            .await?;
        let step = steps
            .first()
            .ok_or_else(|| PipeError::TriggerTargetNotFound(step_name.clone()))?;

        ctx.api.trigger_step(step.id).await?;
        info!("Triggered step '{}' ({}) of pipeline {}", step_name, step.id, pipeline_id);

        // run creation is asynchronous on the service side
        ctx.sleep(ctx.settings.trigger_grace).await?;

        let runs = ctx
            .api
            .get_runs(&GetRunsOptions {
                pipeline_ids: vec![pipeline_id],
                sort_by: Some("createdAt".to_string()),
                sort_order: Some(SortOrder::Descending),
                limit: Some(1),
                light: true,
                ..Default::default()
            })
            .await?;
        let run = runs.first().ok_or_else(|| {
            PipeError::RunNotFound(format!(
                "no run appeared for pipeline {pipeline_id} after triggering"
            ))
        })?;

        state.run_id = Some(run.id);
        state.run_number = Some(run.run_number);
        Ok(format!("Triggered run #{}", run.run_number))
    }

    async fn resolve_run_number<A: PipelinesApi>(
        ctx: &RunContext<'_, A>,
        state: &mut PipedState,
    ) -> Result<()> {
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

        state.run_number = Some(run.run_number);
        Ok(())
    }
}

/// Run ids whose git resource version matches `commit_sha`.
///
/// Keeps every match rather than stopping at the first one; resource
/// versions come back in resource-type order, so the choice between several
/// matching runs is left to [`most_recent_match`], which goes by run number.
fn matching_run_ids(versions: &[RunResourceVersion], commit_sha: &str) -> HashSet<i64> {
    versions
        .iter()
        .filter(|v| v.is_git_repo() && v.commit_sha() == Some(commit_sha))
        .map(|v| v.run_id)
        .collect()
}

/// First run in `ordered_run_ids` that is a candidate.
///
/// `ordered_run_ids` comes sorted by run number descending, so this is the
/// most recent matching run.
fn most_recent_match(ordered_run_ids: &[i64], candidates: &HashSet<i64>) -> Option<i64> {
    ordered_run_ids
        .iter()
        .copied()
        .find(|run_id| candidates.contains(run_id))
}

impl PipedStep for FindRun {
    async fn init<A: PipelinesApi>(
        &self,
        _ctx: &RunContext<'_, A>,
        state: &mut PipedState,
    ) -> Result<String> {
        state.run_id = None;
        state.run_number = None;
        state.should_trigger_run = false;
        Ok(String::new())
    }

    async fn tick<A: PipelinesApi>(
        &self,
        ctx: &RunContext<'_, A>,
        state: &mut PipedState,
    ) -> Result<StepStatus> {
        let pipeline = Self::resolve_pipeline(ctx, state).await?;
        debug!("Resolved pipeline '{}' ({})", pipeline.name, pipeline.id);
        state.pipeline_id = Some(pipeline.id);
        state.pipeline_name = Some(pipeline.name);

        if state.force {
            return Ok(Self::trigger_new(
                state,
                "Force flag set, triggering a new run",
            ));
        }

        let runs = ctx
            .api
            .get_runs(&GetRunsOptions {
                pipeline_ids: vec![pipeline.id],
                status_codes: vec![StatusCode::Processing],
                sort_by: Some("runNumber".to_string()),
                sort_order: Some(SortOrder::Descending),
                limit: Some(ACTIVE_RUNS_LIMIT),
                light: true,
                ..Default::default()
            })
            .await?;
        if runs.is_empty() {
            return Ok(Self::trigger_new(state, ""));
        }

        let run_ids: Vec<i64> = runs.iter().map(|run| run.id).collect();
        let versions = ctx
            .api
            .get_run_resource_versions(&GetRunResourcesOptions {
                pipeline_source_ids: vec![state.pipelines_source_id],
                run_ids: run_ids.clone(),
                sort_by: Some("resourceTypeCode".to_string()),
                sort_order: Some(SortOrder::Ascending),
            })
            .await?;
        if versions.is_empty() {
            return Ok(Self::trigger_new(state, ""));
        }

        let candidates = matching_run_ids(&versions, &state.head_commit_sha);
        match most_recent_match(&run_ids, &candidates) {
            Some(run_id) => {
                debug!(
                    "Run {} is active for commit {}",
                    run_id,
                    state.short_sha()
                );
                state.run_id = Some(run_id);
                Ok(StepStatus::done_with("Found an active run id"))
            }
            None => Ok(Self::trigger_new(state, "Triggering a new run")),
        }
    }

    async fn on_complete<A: PipelinesApi>(
        &self,
        ctx: &RunContext<'_, A>,
        state: &mut PipedState,
        _status: &StepStatus,
    ) -> Result<String> {
        if state.should_trigger_run {
            return Self::trigger(ctx, state).await;
        }

        if state.run_number.is_none() {
            Self::resolve_run_number(ctx, state).await?;
        }
        Ok(format!("Following run #{}", state.require_run_number()?))
    }
}
