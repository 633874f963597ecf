use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status code shared by runs, steps and syncs.
///
/// Unknown codes are kept verbatim so newer servers don't break parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum StatusCode {
    Queued,
    Processing,
    Success,
    Failure,
    Error,
    Waiting,
    Cancelled,
    Unstable,
    Skipped,
    TimedOut,
    Stopping,
    Stopped,
    Ready,
    Creating,
    Other(u32),
}

impl StatusCode {
    /// Whether a run or step in this status will never change again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success
                | Self::Failure
                | Self::Error
                | Self::Cancelled
                | Self::Unstable
                | Self::Skipped
                | Self::TimedOut
                | Self::Stopped
        )
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl From<u32> for StatusCode {
    fn from(code: u32) -> Self {
        match code {
            4000 => Self::Queued,
            4001 => Self::Processing,
            4002 => Self::Success,
            4003 => Self::Failure,
            4004 => Self::Error,
            4005 => Self::Waiting,
            4006 => Self::Cancelled,
            4007 => Self::Unstable,
            4008 => Self::Skipped,
            4009 => Self::TimedOut,
            4010 => Self::Stopping,
            4011 => Self::Stopped,
            4013 => Self::Ready,
            4014 => Self::Creating,
            other => Self::Other(other),
        }
    }
}

impl From<StatusCode> for u32 {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::Queued => 4000,
            StatusCode::Processing => 4001,
            StatusCode::Success => 4002,
            StatusCode::Failure => 4003,
            StatusCode::Error => 4004,
            StatusCode::Waiting => 4005,
            StatusCode::Cancelled => 4006,
            StatusCode::Unstable => 4007,
            StatusCode::Skipped => 4008,
            StatusCode::TimedOut => 4009,
            StatusCode::Stopping => 4010,
            StatusCode::Stopped => 4011,
            StatusCode::Ready => 4013,
            StatusCode::Creating => 4014,
            StatusCode::Other(code) => code,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => f.write_str("queued"),
            Self::Processing => f.write_str("processing"),
            Self::Success => f.write_str("success"),
            Self::Failure => f.write_str("failure"),
            Self::Error => f.write_str("error"),
            Self::Waiting => f.write_str("waiting"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::Unstable => f.write_str("unstable"),
            Self::Skipped => f.write_str("skipped"),
            Self::TimedOut => f.write_str("timed out"),
            Self::Stopping => f.write_str("stopping"),
            Self::Stopped => f.write_str("stopped"),
            Self::Ready => f.write_str("ready"),
            Self::Creating => f.write_str("creating"),
            Self::Other(code) => write!(f, "unknown ({code})"),
        }
    }
}

/// Resource type codes attached to run resource versions.
pub const GIT_REPO_RESOURCE_TYPE: u32 = 2000;

/// A configured pipeline definition on the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub latest_run_id: Option<i64>,
    #[serde(default)]
    pub pipeline_source_branch: Option<String>,
}

/// One execution of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: i64,
    pub run_number: i64,
    pub pipeline_id: i64,
    pub created_at: DateTime<Utc>,
    pub status_code: StatusCode,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceVersionContent {
    #[serde(default)]
    pub commit_sha: Option<String>,
}

/// Snapshot of a resource (e.g. a git commit) attached to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResourceVersion {
    pub run_id: i64,
    pub resource_type_code: u32,
    #[serde(default)]
    pub resource_version_content_property_bag: ResourceVersionContent,
}

impl RunResourceVersion {
    pub fn is_git_repo(&self) -> bool {
        self.resource_type_code == GIT_REPO_RESOURCE_TYPE
    }

    pub fn commit_sha(&self) -> Option<&str> {
        self.resource_version_content_property_bag
            .commit_sha
            .as_deref()
    }
}

/// A triggerable step inside a pipeline, or a step execution inside a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStep {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub status_code: Option<StatusCode>,
    #[serde(default)]
    pub duration_seconds: Option<u64>,
}

/// Sync state of a pipeline source for one branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub pipeline_source_id: i64,
    #[serde(default)]
    pub pipeline_source_branch: Option<String>,
    pub is_syncing: bool,
    #[serde(default)]
    pub last_sync_status_code: Option<StatusCode>,
    #[serde(default)]
    pub last_sync_logs: Option<String>,
    #[serde(default)]
    pub commit_data: Option<ResourceVersionContent>,
}

impl SyncStatus {
    pub fn commit_sha(&self) -> Option<&str> {
        self.commit_data.as_ref()?.commit_sha.as_deref()
    }
}

/// Where a repository's pipeline definitions come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSource {
    pub id: i64,
    /// Owning project; absent or 0 for sources in the default project.
    #[serde(default)]
    pub project_id: Option<i64>,
}

impl PipelineSource {
    pub fn in_default_project(&self) -> bool {
        matches!(self.project_id, None | Some(0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Ascending => "1",
            Self::Descending => "-1",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetPipelinesOptions {
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub filter_by: Option<String>,
    pub names: Vec<String>,
    pub light: bool,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetRunsOptions {
    pub pipeline_ids: Vec<i64>,
    pub run_ids: Vec<i64>,
    pub status_codes: Vec<StatusCode>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub limit: Option<usize>,
    pub light: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetRunResourcesOptions {
    pub pipeline_source_ids: Vec<i64>,
    pub run_ids: Vec<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetStepsOptions {
    pub pipeline_ids: Vec<i64>,
    pub pipeline_source_ids: Vec<i64>,
    pub run_ids: Vec<i64>,
    pub names: Vec<String>,
}
