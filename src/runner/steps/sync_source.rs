use log::debug;

use crate::error::{PipeError, Result};
use crate::providers::pipelines::PipelinesApi;
use crate::runner::context::RunContext;
use crate::runner::state::PipedState;
use crate::runner::step::{PipedStep, StepStatus};

/// Makes the pipeline source pick up the commit being built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSource;

impl PipedStep for SyncSource {
    async fn init<A: PipelinesApi>(
        &self,
        ctx: &RunContext<'_, A>,
        state: &mut PipedState,
    ) -> Result<String> {
        ctx.api
            .sync_source(state.pipelines_source_id, &state.git_branch)
            .await?;
        Ok(format!("Requested sync of branch {}", state.git_branch))
    }

    async fn tick<A: PipelinesApi>(
        &self,
        ctx: &RunContext<'_, A>,
        state: &mut PipedState,
    ) -> Result<StepStatus> {
        let statuses = ctx
            .api
            .get_sync_statuses(state.pipelines_source_id, &state.git_branch)
            .await?;
        let Some(status) = statuses.first() else {
            return Ok(StepStatus::pending("Waiting for sync status"));
        };

        if status.is_syncing {
            return Ok(StepStatus::pending("Syncing pipeline source"));
        }

        if let Some(code) = status.last_sync_status_code {
            if code.is_terminal() && !code.is_success() {
                return Err(PipeError::SyncFailed(
                    status
                        .last_sync_logs
                        .clone()
                        .unwrap_or_else(|| format!("last sync ended with status {code}")),
                ));
            }
        }

        debug!(
            "Source {} synced commit {:?}",
            state.pipelines_source_id,
            status.commit_sha()
        );
        if status.commit_sha() == Some(state.head_commit_sha.as_str()) {
            Ok(StepStatus::done_with("Pipeline source is in sync"))
        } else {
            Ok(StepStatus::pending(format!(
                "Waiting for commit {} to sync",
                state.short_sha()
            )))
        }
    }
}
