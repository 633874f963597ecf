use crate::error::{PipeError, Result};
use crate::providers::pipelines::types::StatusCode;

/// Record threaded through every step of a single invocation.
///
/// Caller inputs are set up front; the remaining fields are written by the
/// steps in order and stay `None` until the owning step has run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipedState {
    /// Branch to build. Empty until the caller or the git step fills it.
    pub git_branch: String,
    pub head_commit_sha: String,
    pub pipelines_source_id: i64,
    /// Project owning the source; empty means the default project.
    pub project_name: String,
    /// Always trigger a new run, even if one is already active.
    pub force: bool,

    pub pipeline_id: Option<i64>,
    pub pipeline_name: Option<String>,
    pub run_id: Option<i64>,
    pub run_number: Option<i64>,
    pub should_trigger_run: bool,
    pub run_status: Option<StatusCode>,
}

impl PipedState {
    pub fn new(branch: Option<String>, pipelines_source_id: i64, force: bool) -> Self {
        Self {
            git_branch: branch.unwrap_or_default(),
            pipelines_source_id,
            force,
            ..Self::default()
        }
    }

    pub fn with_project(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = project_name.into();
        self
    }

    pub fn require_pipeline_id(&self) -> Result<i64> {
        self.pipeline_id.ok_or_else(|| PipeError::PipelineNotFound {
            branch: self.git_branch.clone(),
        })
    }

    pub fn require_run_id(&self) -> Result<i64> {
        self.run_id
            .ok_or_else(|| PipeError::RunNotFound("run id has not been resolved".to_string()))
    }

    pub fn require_run_number(&self) -> Result<i64> {
        self.run_number
            .ok_or_else(|| PipeError::RunNotFound("run number has not been resolved".to_string()))
    }

    /// First characters of the head commit, for messages.
    pub fn short_sha(&self) -> &str {
        let end = self.head_commit_sha.len().min(8);
        &self.head_commit_sha[..end]
    }
}
