use crate::error::{PipeError, Result};
use crate::git;
use crate::providers::pipelines::PipelinesApi;
use crate::runner::context::RunContext;
use crate::runner::state::PipedState;
use crate::runner::step::{PipedStep, StepStatus};

/// Reads branch and `HEAD` and checks the commit has been pushed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateGitState;

/// Compares the local head with what `origin` has for the branch.
fn check_pushed(branch: &str, local: &str, remote: Option<&str>) -> Result<StepStatus> {
    match remote {
        None => Err(PipeError::Git(format!(
            "branch '{branch}' does not exist on origin; push it first"
        ))),
        Some(remote) if remote != local => Err(PipeError::Git(format!(
            "local commit {local} differs from origin/{branch} ({remote}); push or pull first"
        ))),
        Some(_) => Ok(StepStatus::done_with(format!("{branch} @ {local}"))),
    }
}

impl PipedStep for ValidateGitState {
    async fn init<A: PipelinesApi>(
        &self,
        _ctx: &RunContext<'_, A>,
        state: &mut PipedState,
    ) -> Result<String> {
        if state.git_branch.is_empty() {
            state.git_branch = git::current_branch().await?;
        }
        state.head_commit_sha = git::head_commit().await?;
        Ok(format!("Building branch {}", state.git_branch))
    }

    async fn tick<A: PipelinesApi>(
        &self,
        _ctx: &RunContext<'_, A>,
        state: &mut PipedState,
    ) -> Result<StepStatus> {
        let remote = git::remote_head(&state.git_branch).await?;
        check_pushed(&state.git_branch, &state.head_commit_sha, remote.as_deref())
    }
}
