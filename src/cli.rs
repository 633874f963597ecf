use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;

use crate::auth::Token;
use crate::config::Config;
use crate::output::bright_red;
use crate::providers::pipelines::projects::project_name_for_source;
use crate::providers::pipelines::PipelinesClient;
use crate::runner::{BackoffConfig, PipeRunner, PipedState, RunContext};

#[derive(Parser)]
#[command(name = "pipewatch")]
#[command(author, version, about = "Trigger and track CI runs for your commit", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./pipewatch.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find or start a run for the current commit and wait for it to finish
    #[command(alias = "b")]
    Build {
        #[arg(short, long, env = "PIPEWATCH_TOKEN")]
        token: Option<String>,

        /// Platform base URL
        #[arg(short, long)]
        url: Option<String>,

        /// Branch to build (defaults to the checked out branch)
        #[arg(short, long)]
        branch: Option<String>,

        /// Trigger a new run even if one is already active for the commit
        #[arg(short, long, default_value_t = false)]
        force: bool,

        #[arg(short, long)]
        source_id: Option<i64>,
    },
}

impl Cli {
    async fn execute_build(
        &self,
        mut config: Config,
        branch: Option<&str>,
        force: bool,
    ) -> Result<()> {
        config.validate()?;

        let base_url = config.server.base_url.clone().unwrap_or_default();
        let source_id = config.pipelines.source_id.unwrap_or_default();
        let token = config.server.token.take().map(Token::from);

        let client = PipelinesClient::new(&base_url, token)?;
        info!(
            "Building against {} (pipeline source {})",
            client.api_url(),
            source_id
        );
        let settings = config.pipeline_settings();
        let backoff = BackoffConfig::from(config.backoff);
        let wait_backoff = BackoffConfig::from(config.wait_backoff);
        info!(
            "Waiting up to {:?} for the run, {:?} overall",
            wait_backoff.max_wait(),
            config.deadline()
        );

        let ctx = RunContext::new(&client, &settings, config.deadline());
        let project = match config.pipelines.project.take() {
            Some(project) => project,
            None => ctx.within(project_name_for_source(&client, source_id)).await?,
        };
        let state =
            PipedState::new(branch.map(str::to_owned), source_id, force).with_project(project);

        let state = PipeRunner::standard(backoff, wait_backoff)
            .run(&ctx, state)
            .await
            .map_err(|err| {
                if let Some(step) = err.step() {
                    error!("'{}' failed: {}", step, err.root());
                }
                err
            })?;

        match state.run_status {
            Some(status) if status.is_success() => Ok(()),
            Some(status) => bail!(
                "{}",
                bright_red(format!(
                    "Run #{} finished with status {}",
                    state.run_number.unwrap_or_default(),
                    status
                ))
            ),
            None => bail!("Run finished without a status"),
        }
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Build {
                token,
                url,
                branch,
                force,
                source_id,
            } => {
                let mut config = Config::load(self.config.as_deref())?;

                if let Some(url) = url {
                    config.server.base_url = Some(url.clone());
                }
                if let Some(token) = token {
                    config.server.token = Some(token.clone());
                }
                if let Some(source_id) = source_id {
                    config.pipelines.source_id = Some(*source_id);
                }

                self.execute_build(config, branch.as_deref(), *force).await
            }
        }
    }
}
