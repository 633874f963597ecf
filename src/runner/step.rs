use crate::error::Result;
use crate::providers::pipelines::PipelinesApi;

use super::context::RunContext;
use super::state::PipedState;
use super::steps::{FindRun, PrintRun, SyncSource, ValidateGitState, WaitRun};

/// Outcome of a single tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepStatus {
    pub done: bool,
    pub message: String,
}

impl StepStatus {
    pub fn done() -> Self {
        Self {
            done: true,
            message: String::new(),
        }
    }

    pub fn done_with(message: impl Into<String>) -> Self {
        Self {
            done: true,
            message: message.into(),
        }
    }

    pub fn pending(message: impl Into<String>) -> Self {
        Self {
            done: false,
            message: message.into(),
        }
    }
}

/// Three-phase contract every pipeline step follows.
///
/// `init` runs once, `tick` runs until it reports done (under the wrapper's
/// backoff), then `on_complete` runs once. Returned strings are progress
/// messages; empty means nothing to report.
#[allow(async_fn_in_trait)]
pub trait PipedStep {
    async fn init<A: PipelinesApi>(
        &self,
        _ctx: &RunContext<'_, A>,
        _state: &mut PipedState,
    ) -> Result<String> {
        Ok(String::new())
    }

    async fn tick<A: PipelinesApi>(
        &self,
        ctx: &RunContext<'_, A>,
        state: &mut PipedState,
    ) -> Result<StepStatus>;

    async fn on_complete<A: PipelinesApi>(
        &self,
        _ctx: &RunContext<'_, A>,
        _state: &mut PipedState,
        _status: &StepStatus,
    ) -> Result<String> {
        Ok(String::new())
    }
}

/// The fixed set of steps a pipeline can be built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    ValidateGitState(ValidateGitState),
    SyncSource(SyncSource),
    FindRun(FindRun),
    WaitRun(WaitRun),
    PrintRun(PrintRun),
}

impl PipedStep for Step {
    async fn init<A: PipelinesApi>(
        &self,
        ctx: &RunContext<'_, A>,
        state: &mut PipedState,
    ) -> Result<String> {
        match self {
            Self::ValidateGitState(step) => step.init(ctx, state).await,
            Self::SyncSource(step) => step.init(ctx, state).await,
            Self::FindRun(step) => step.init(ctx, state).await,
            Self::WaitRun(step) => step.init(ctx, state).await,
            Self::PrintRun(step) => step.init(ctx, state).await,
        }
    }

    async fn tick<A: PipelinesApi>(
        &self,
        ctx: &RunContext<'_, A>,
        state: &mut PipedState,
    ) -> Result<StepStatus> {
        match self {
            Self::ValidateGitState(step) => step.tick(ctx, state).await,
            Self::SyncSource(step) => step.tick(ctx, state).await,
            Self::FindRun(step) => step.tick(ctx, state).await,
            Self::WaitRun(step) => step.tick(ctx, state).await,
            Self::PrintRun(step) => step.tick(ctx, state).await,
        }
    }

    async fn on_complete<A: PipelinesApi>(
        &self,
        ctx: &RunContext<'_, A>,
        state: &mut PipedState,
        status: &StepStatus,
    ) -> Result<String> {
        match self {
            Self::ValidateGitState(step) => step.on_complete(ctx, state, status).await,
            Self::SyncSource(step) => step.on_complete(ctx, state, status).await,
            Self::FindRun(step) => step.on_complete(ctx, state, status).await,
            Self::WaitRun(step) => step.on_complete(ctx, state, status).await,
            Self::PrintRun(step) => step.on_complete(ctx, state, status).await,
        }
    }
}
