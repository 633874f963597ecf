use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipeError {
    #[error("API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Git error: {0}")]
    Git(String),

    #[error("No pipeline found for branch '{branch}'")]
    PipelineNotFound { branch: String },

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Tried to trigger step '{0}' but couldn't find its id")]
    TriggerTargetNotFound(String),

    #[error("Pipeline source sync failed: {0}")]
    SyncFailed(String),

    #[error("Step '{step}' did not complete after {attempts} attempts")]
    RetryExhausted { step: String, attempts: u32 },

    #[error("Deadline exceeded before the pipeline finished")]
    Cancelled,

    #[error("{step}: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<PipeError>,
    },
}

impl PipeError {
    /// Attaches the label of the step an error escaped from.
    ///
    /// Errors that already name their step are returned untouched.
    pub fn in_step(self, step: &str) -> Self {
        match self {
            err @ (Self::Step { .. } | Self::RetryExhausted { .. }) => err,
            err => Self::Step {
                step: step.to_string(),
                source: Box::new(err),
            },
        }
    }

    /// Unwraps step labels down to the originating error.
    pub fn root(&self) -> &Self {
        match self {
            Self::Step { source, .. } => source.root(),
            err => err,
        }
    }

    /// Label of the step the error escaped from, if known.
    pub fn step(&self) -> Option<&str> {
        match self {
            Self::Step { step, .. } | Self::RetryExhausted { step, .. } => Some(step),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipeError>;
