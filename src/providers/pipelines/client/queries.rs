use crate::error::Result;
use crate::providers::pipelines::api::PipelinesApi;
use crate::providers::pipelines::types::{
    GetPipelinesOptions, GetRunResourcesOptions, GetRunsOptions, GetStepsOptions, Pipeline,
    PipelineSource, PipelineStep, Project, Run, RunResourceVersion, SyncStatus,
};

use super::core::{PipelinesClient, QueryParams};

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn push_list<T: ToString>(query: &mut QueryParams, key: &'static str, values: &[T]) {
    if !values.is_empty() {
        query.push((key, join(values)));
    }
}

fn push_opt<T: ToString>(query: &mut QueryParams, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        query.push((key, value.to_string()));
    }
}

pub(super) fn pipelines_query(options: &GetPipelinesOptions) -> QueryParams {
    let mut query = QueryParams::new();
    push_opt(&mut query, "sortBy", options.sort_by.as_deref());
    push_opt(
        &mut query,
        "sortOrder",
        options.sort_order.map(|o| o.as_param()),
    );
    push_opt(&mut query, "filterBy", options.filter_by.as_deref());
    push_list(&mut query, "names", &options.names);
    push_opt(&mut query, "limit", options.limit);
    if options.light {
        query.push(("light", "true".to_string()));
    }
    query
}

pub(super) fn runs_query(options: &GetRunsOptions) -> QueryParams {
    let status_codes: Vec<u32> = options.status_codes.iter().map(|s| u32::from(*s)).collect();

    let mut query = QueryParams::new();
    push_list(&mut query, "pipelineIds", &options.pipeline_ids);
    push_list(&mut query, "runIds", &options.run_ids);
    push_list(&mut query, "statusCodes", &status_codes);
    push_opt(&mut query, "sortBy", options.sort_by.as_deref());
    push_opt(
        &mut query,
        "sortOrder",
        options.sort_order.map(|o| o.as_param()),
    );
    push_opt(&mut query, "limit", options.limit);
    if options.light {
        query.push(("light", "true".to_string()));
    }
    query
}

pub(super) fn run_resources_query(options: &GetRunResourcesOptions) -> QueryParams {
    let mut query = QueryParams::new();
    push_list(&mut query, "pipelineSourceIds", &options.pipeline_source_ids);
    push_list(&mut query, "runIds", &options.run_ids);
    push_opt(&mut query, "sortBy", options.sort_by.as_deref());
    push_opt(
        &mut query,
        "sortOrder",
        options.sort_order.map(|o| o.as_param()),
    );
    query
}

pub(super) fn steps_query(options: &GetStepsOptions) -> QueryParams {
    let mut query = QueryParams::new();
    push_list(&mut query, "pipelineIds", &options.pipeline_ids);
    push_list(&mut query, "pipelineSourceIds", &options.pipeline_source_ids);
    push_list(&mut query, "runIds", &options.run_ids);
    push_list(&mut query, "names", &options.names);
    query
}

impl PipelinesApi for PipelinesClient {
    async fn get_pipelines(&self, options: &GetPipelinesOptions) -> Result<Vec<Pipeline>> {
        self.get_json("pipelines", &pipelines_query(options)).await
    }

    async fn get_runs(&self, options: &GetRunsOptions) -> Result<Vec<Run>> {
        self.get_json("runs", &runs_query(options)).await
    }

    async fn get_run_resource_versions(
        &self,
        options: &GetRunResourcesOptions,
    ) -> Result<Vec<RunResourceVersion>> {
        self.get_json("runResourceVersions", &run_resources_query(options))
            .await
    }

    async fn get_steps(&self, options: &GetStepsOptions) -> Result<Vec<PipelineStep>> {
        self.get_json("steps", &steps_query(options)).await
    }

    async fn trigger_step(&self, step_id: i64) -> Result<()> {
        self.post(&format!("steps/{step_id}/trigger"), &QueryParams::new())
            .await
    }

    async fn sync_source(&self, source_id: i64, branch: &str) -> Result<()> {
        self.post(
            &format!("pipelineSources/{source_id}/sync"),
            &vec![("branch", branch.to_string())],
        )
        .await
    }

    async fn get_sync_statuses(&self, source_id: i64, branch: &str) -> Result<Vec<SyncStatus>> {
        let query = vec![
            ("pipelineSourceIds", source_id.to_string()),
            ("pipelineSourceBranches", branch.to_string()),
        ];
        self.get_json("pipelineSyncStatuses", &query).await
    }

    async fn get_pipeline_source(&self, source_id: i64) -> Result<PipelineSource> {
        self.get_json(&format!("pipelineSources/{source_id}"), &QueryParams::new())
            .await
    }

    async fn get_project(&self, project_id: i64) -> Result<Project> {
        self.get_json(&format!("projects/{project_id}"), &QueryParams::new())
            .await
    }
}
