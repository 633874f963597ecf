//! In-memory pipelines service used by tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{PipeError, Result};

use super::api::PipelinesApi;
use super::types::{
    GetPipelinesOptions, GetRunResourcesOptions, GetRunsOptions, GetStepsOptions, Pipeline,
    PipelineSource, PipelineStep, Project, ResourceVersionContent, Run, RunResourceVersion,
    SortOrder, StatusCode, SyncStatus, GIT_REPO_RESOURCE_TYPE,
};

pub fn run(id: i64, run_number: i64, status: StatusCode) -> Run {
    Run {
        id,
        run_number,
        pipeline_id: 7,
        created_at: created_at(run_number),
        status_code: status,
        started_at: None,
        ended_at: None,
    }
}

fn created_at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn git_version(run_id: i64, commit_sha: &str) -> RunResourceVersion {
    RunResourceVersion {
        run_id,
        resource_type_code: GIT_REPO_RESOURCE_TYPE,
        resource_version_content_property_bag: ResourceVersionContent {
            commit_sha: Some(commit_sha.to_string()),
        },
    }
}

/// Scriptable fake that records every call it receives.
#[derive(Default)]
pub struct FakePipelines {
    pub pipelines: Vec<Pipeline>,
    pub runs: Mutex<Vec<Run>>,
    pub resource_versions: Vec<RunResourceVersion>,
    pub trigger_steps: Vec<PipelineStep>,
    pub run_steps: Vec<PipelineStep>,
    /// Run that appears once a step is triggered.
    pub triggered_run: Option<Run>,
    /// Statuses handed out to successive lookups of a single run.
    pub status_script: Mutex<VecDeque<StatusCode>>,
    pub sync_script: Mutex<VecDeque<SyncStatus>>,
    /// Runs that are listed but disappear when looked up by id.
    pub vanished_runs: Vec<i64>,
    pub projects: Vec<Project>,
    /// Project owning every pipeline source, if any.
    pub source_project_id: Option<i64>,
    /// Calls that fail with a 503 instead of answering.
    pub failing: Vec<&'static str>,
    pub calls: Mutex<Vec<String>>,
}

impl FakePipelines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pipeline(mut self, id: i64, name: &str) -> Self {
        self.pipelines.push(Pipeline {
            id,
            name: name.to_string(),
            latest_run_id: None,
            pipeline_source_branch: Some("main".to_string()),
        });
        self
    }

    pub fn with_run(self, run: Run) -> Self {
        self.runs.lock().unwrap().push(run);
        self
    }

    pub fn with_resource(mut self, version: RunResourceVersion) -> Self {
        self.resource_versions.push(version);
        self
    }

    pub fn with_trigger_step(mut self, id: i64, name: &str) -> Self {
        self.trigger_steps.push(PipelineStep {
            id,
            name: name.to_string(),
            status_code: None,
            duration_seconds: None,
        });
        self
    }

    pub fn with_run_step(mut self, id: i64, name: &str, status: StatusCode) -> Self {
        self.run_steps.push(PipelineStep {
            id,
            name: name.to_string(),
            status_code: Some(status),
            duration_seconds: Some(90),
        });
        self
    }

    pub fn with_triggered_run(mut self, run: Run) -> Self {
        self.triggered_run = Some(run);
        self
    }

    pub fn with_statuses(self, statuses: &[StatusCode]) -> Self {
        self.status_script.lock().unwrap().extend(statuses);
        self
    }

    pub fn with_sync(self, status: SyncStatus) -> Self {
        self.sync_script.lock().unwrap().push_back(status);
        self
    }

    pub fn vanishing_run(mut self, run_id: i64) -> Self {
        self.vanished_runs.push(run_id);
        self
    }

    pub fn with_project(mut self, id: i64, name: &str) -> Self {
        self.projects.push(Project {
            id,
            name: name.to_string(),
        });
        self.source_project_id = Some(id);
        self
    }

    pub fn failing_on(mut self, call: &'static str) -> Self {
        self.failing.push(call);
        self
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn answer(&self, name: &'static str, call: impl Into<String>) -> Result<()> {
        self.record(call);
        if self.failing.contains(&name) {
            return Err(PipeError::ApiError {
                status: 503,
                message: format!("{name} unavailable"),
            });
        }
        Ok(())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

impl PipelinesApi for FakePipelines {
    async fn get_pipelines(&self, _options: &GetPipelinesOptions) -> Result<Vec<Pipeline>> {
        self.answer("get_pipelines", "get_pipelines")?;
        Ok(self.pipelines.clone())
    }

    async fn get_runs(&self, options: &GetRunsOptions) -> Result<Vec<Run>> {
        self.answer("get_runs", "get_runs")?;

        let mut runs = self.runs.lock().unwrap();

        if options.run_ids.len() == 1 && self.vanished_runs.contains(&options.run_ids[0]) {
            return Ok(Vec::new());
        }
        if options.run_ids.len() == 1 {
            if let Some(next) = self.status_script.lock().unwrap().pop_front() {
                for run in runs.iter_mut().filter(|r| r.id == options.run_ids[0]) {
                    run.status_code = next;
                }
            }
        }

        let mut matching: Vec<Run> = runs
            .iter()
            .filter(|r| options.pipeline_ids.is_empty() || options.pipeline_ids.contains(&r.pipeline_id))
            .filter(|r| options.run_ids.is_empty() || options.run_ids.contains(&r.id))
            .filter(|r| {
                options.status_codes.is_empty() || options.status_codes.contains(&r.status_code)
            })
            .cloned()
            .collect();

        match options.sort_by.as_deref() {
            Some("runNumber") => matching.sort_by_key(|r| r.run_number),
            Some("createdAt") => matching.sort_by_key(|r| r.created_at),
            _ => {}
        }
        if options.sort_order == Some(SortOrder::Descending) {
            matching.reverse();
        }
        if let Some(limit) = options.limit {
            matching.truncate(limit);
        }

        Ok(matching)
    }

    async fn get_run_resource_versions(
        &self,
        options: &GetRunResourcesOptions,
    ) -> Result<Vec<RunResourceVersion>> {
        self.answer("get_run_resource_versions", "get_run_resource_versions")?;
        let mut versions: Vec<RunResourceVersion> = self
            .resource_versions
            .iter()
            .filter(|v| options.run_ids.contains(&v.run_id))
            .cloned()
            .collect();
        if options.sort_by.as_deref() == Some("resourceTypeCode") {
            versions.sort_by_key(|v| v.resource_type_code);
        }
        Ok(versions)
    }

    async fn get_steps(&self, options: &GetStepsOptions) -> Result<Vec<PipelineStep>> {
        self.answer("get_steps", "get_steps")?;
        if options.run_ids.is_empty() {
            Ok(self
                .trigger_steps
                .iter()
                .filter(|s| options.names.is_empty() || options.names.contains(&s.name))
                .cloned()
                .collect())
        } else {
            Ok(self.run_steps.clone())
        }
    }

    async fn trigger_step(&self, step_id: i64) -> Result<()> {
        self.answer("trigger_step", format!("trigger_step:{step_id}"))?;
        if let Some(run) = &self.triggered_run {
            self.runs.lock().unwrap().push(run.clone());
        }
        Ok(())
    }

    async fn sync_source(&self, source_id: i64, branch: &str) -> Result<()> {
        self.answer("sync_source", format!("sync_source:{source_id}:{branch}"))?;
        Ok(())
    }

    async fn get_sync_statuses(&self, source_id: i64, branch: &str) -> Result<Vec<SyncStatus>> {
        self.answer(
            "get_sync_statuses",
            format!("get_sync_statuses:{source_id}:{branch}"),
        )?;
        Ok(self.sync_script.lock().unwrap().pop_front().into_iter().collect())
    }

    async fn get_pipeline_source(&self, source_id: i64) -> Result<PipelineSource> {
        self.answer(
            "get_pipeline_source",
            format!("get_pipeline_source:{source_id}"),
        )?;
        Ok(PipelineSource {
            id: source_id,
            project_id: self.source_project_id,
        })
    }

    async fn get_project(&self, project_id: i64) -> Result<Project> {
        self.answer("get_project", format!("get_project:{project_id}"))?;
        self.projects
            .iter()
            .find(|project| project.id == project_id)
            .cloned()
            .ok_or_else(|| PipeError::ApiError {
                status: 404,
                message: format!("project {project_id} not found"),
            })
    }
}
