use crate::error::Result;

use super::types::{
    GetPipelinesOptions, GetRunResourcesOptions, GetRunsOptions, GetStepsOptions, Pipeline,
    PipelineSource, PipelineStep, Project, Run, RunResourceVersion, SyncStatus,
};

/// Operations the run pipeline needs from the remote pipelines service.
///
/// Implementations must not retry on their own; the step wrapper owns retry
/// policy and treats every error returned here as fatal.
#[allow(async_fn_in_trait)]
pub trait PipelinesApi {
    /// Pipelines matching the filter, in server order.
    async fn get_pipelines(&self, options: &GetPipelinesOptions) -> Result<Vec<Pipeline>>;

    /// Runs matching the filter, in server order.
    async fn get_runs(&self, options: &GetRunsOptions) -> Result<Vec<Run>>;

    async fn get_run_resource_versions(
        &self,
        options: &GetRunResourcesOptions,
    ) -> Result<Vec<RunResourceVersion>>;

    async fn get_steps(&self, options: &GetStepsOptions) -> Result<Vec<PipelineStep>>;

    /// Fire-and-acknowledge; the new run shows up asynchronously.
    async fn trigger_step(&self, step_id: i64) -> Result<()>;

    async fn sync_source(&self, source_id: i64, branch: &str) -> Result<()>;

    async fn get_sync_statuses(&self, source_id: i64, branch: &str) -> Result<Vec<SyncStatus>>;

    async fn get_pipeline_source(&self, source_id: i64) -> Result<PipelineSource>;

    async fn get_project(&self, project_id: i64) -> Result<Project>;
}
