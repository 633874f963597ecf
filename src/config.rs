use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::runner::{BackoffConfig, PipelineSettings};

/// Configuration file structure for pipewatch.
///
/// Holds the server coordinates and the pipeline mapping for a repository so
/// `pipewatch build` can run without flags. Command-line flags override it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Server connection settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Which pipelines to look at and trigger
    #[serde(default)]
    pub pipelines: PipelinesConfig,

    /// Polling policy for every step except waiting for the run
    #[serde(default)]
    pub backoff: BackoffSettings,

    /// Polling policy while waiting for the run to finish
    #[serde(default = "default_wait_backoff")]
    pub wait_backoff: BackoffSettings,

    /// Overall time budget for one invocation
    #[serde(default = "default_deadline_hours")]
    pub deadline_hours: u64,

    /// Pause between triggering a run and looking it up
    #[serde(default = "default_trigger_grace_secs")]
    pub trigger_grace_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Platform base URL (e.g., 'https://acme.example.com')
    pub base_url: Option<String>,

    /// Base URL for UI links, when different from the API host
    pub ui_url: Option<String>,

    /// Access token
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelinesConfig {
    /// Pipeline source id of this repository
    pub source_id: Option<i64>,

    /// Pipeline names to consider for the branch
    #[serde(default)]
    pub names: Vec<String>,

    /// Project owning the source; looked up from the server when unset
    #[serde(default)]
    pub project: Option<String>,

    /// Step triggered to start a new run
    #[serde(default = "default_trigger_step")]
    pub trigger_step: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BackoffSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            pipelines: PipelinesConfig::default(),
            backoff: BackoffSettings::default(),
            wait_backoff: default_wait_backoff(),
            deadline_hours: default_deadline_hours(),
            trigger_grace_secs: default_trigger_grace_secs(),
        }
    }
}

impl Default for PipelinesConfig {
    fn default() -> Self {
        Self {
            source_id: None,
            names: Vec::new(),
            project: None,
            trigger_step: default_trigger_step(),
        }
    }
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl From<BackoffSettings> for BackoffConfig {
    fn from(settings: BackoffSettings) -> Self {
        BackoffConfig::new(
            Duration::from_secs(settings.interval_secs),
            settings.max_retries,
        )
    }
}

fn default_trigger_step() -> String {
    "trigger_all".to_string()
}

fn default_interval_secs() -> u64 {
    1
}

fn default_max_retries() -> u32 {
    30
}

fn default_wait_backoff() -> BackoffSettings {
    BackoffSettings {
        interval_secs: 10,
        max_retries: 1080,
    }
}

fn default_deadline_hours() -> u64 {
    3
}

fn default_trigger_grace_secs() -> u64 {
    3
}

/// Longest overall deadline accepted from configuration (one week).
const MAX_DEADLINE_HOURS: u64 = 7 * 24;

const CANDIDATES: [&str; 4] = [
    "pipewatch.toml",
    "pipewatch.json",
    "pipewatch.yaml",
    "pipewatch.yml",
];

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./pipewatch.toml
    /// 3. ./pipewatch.json
    /// 4. ./pipewatch.yaml
    /// 5. ./pipewatch.yml
    /// 6. `<config dir>/pipewatch/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let user_config = dirs::config_dir().map(|dir| dir.join("pipewatch").join("config.toml"));

        match Self::find_config(&cwd, user_config) {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    fn find_config(dir: &Path, user_config: Option<PathBuf>) -> Option<PathBuf> {
        CANDIDATES
            .iter()
            .map(|candidate| dir.join(candidate))
            .chain(user_config)
            .find(|path| path.exists())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
        }
    }

    /// Checks the values needed to talk to the server are present and sane.
    pub fn validate(&self) -> Result<()> {
        if self.server.base_url.as_deref().unwrap_or("").is_empty() {
            bail!("No server URL configured; set server.base-url or pass --url");
        }
        if self.pipelines.source_id.is_none() {
            bail!("No pipeline source configured; set pipelines.source-id or pass --source-id");
        }
        if self.pipelines.names.iter().all(|name| name.trim().is_empty()) {
            bail!("No pipeline names configured; set pipelines.names to the pipeline(s) to build");
        }
        if self.backoff.max_retries == 0 || self.wait_backoff.max_retries == 0 {
            bail!("max-retries must be at least 1");
        }
        if self.deadline_hours == 0 || self.deadline_hours > MAX_DEADLINE_HOURS {
            bail!(
                "deadline-hours must be between 1 and {}",
                MAX_DEADLINE_HOURS
            );
        }
        Ok(())
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_hours.saturating_mul(3600))
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        let ui_url = self
            .server
            .ui_url
            .clone()
            .or_else(|| self.server.base_url.clone())
            .unwrap_or_default();

        PipelineSettings {
            pipeline_names: self.pipelines.names.clone(),
            trigger_step: self.pipelines.trigger_step.clone(),
            trigger_grace: Duration::from_secs(self.trigger_grace_secs),
            ui_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pipelines.trigger_step, "trigger_all");
        assert_eq!(config.backoff.interval_secs, 1);
        assert_eq!(config.backoff.max_retries, 30);
        assert_eq!(config.wait_backoff.interval_secs, 10);
        assert_eq!(config.deadline(), Duration::from_secs(3 * 3600));
        assert!(config.server.base_url.is_none());
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
deadline-hours = 5

[server]
base-url = "https://acme.example.com"
token = "tok"

[pipelines]
source-id = 12
names = ["build", "release"]

[wait-backoff]
interval-secs = 30
"#;
        write!(temp_file, "{}", toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(
            config.server.base_url.as_deref(),
            Some("https://acme.example.com")
        );
        assert_eq!(config.pipelines.source_id, Some(12));
        assert_eq!(config.pipelines.names, vec!["build", "release"]);
        assert_eq!(config.pipelines.trigger_step, "trigger_all");
        assert_eq!(config.wait_backoff.interval_secs, 30);
        assert_eq!(config.wait_backoff.max_retries, 30);
        assert_eq!(config.deadline_hours, 5);
        tokio_test::assert_ok!(config.validate());
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yml").unwrap();
        let yaml_content = r#"
server:
  base-url: https://acme.example.com
pipelines:
  source-id: 4
  trigger-step: run_all
"#;
        write!(temp_file, "{}", yaml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.pipelines.source_id, Some(4));
        assert_eq!(config.pipelines.trigger_step, "run_all");
    }

    #[test]
    fn test_load_json_without_extension() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, r#"{{"pipelines": {{"source-id": 9}}}}"#).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.pipelines.source_id, Some(9));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = Config::load(Some(Path::new("definitely-missing.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_find_config_prefers_local_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let user_config = temp_dir.path().join("user.toml");
        std::fs::write(&user_config, "").unwrap();

        assert_eq!(
            Config::find_config(temp_dir.path(), Some(user_config.clone())),
            Some(user_config.clone())
        );

        let local = temp_dir.path().join("pipewatch.yaml");
        std::fs::write(&local, "").unwrap();
        assert_eq!(
            Config::find_config(temp_dir.path(), Some(user_config)),
            Some(local)
        );
    }

    #[test]
    fn test_validate_requires_server_and_source() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.server.base_url = Some("https://acme.example.com".to_string());
        assert!(config.validate().is_err());

        config.pipelines.source_id = Some(1);
        config.pipelines.names = vec!["build".to_string()];
        assert!(config.validate().is_ok());

        config.backoff.max_retries = 0;
        assert!(config.validate().is_err());
    }

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.server.base_url = Some("https://acme.example.com".to_string());
        config.pipelines.source_id = Some(1);
        config.pipelines.names = vec!["build".to_string()];
        config
    }

    #[test]
    fn test_validate_requires_pipeline_names() {
        let mut config = valid_config();
        config.pipelines.names.clear();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pipelines.names"));

        config.pipelines.names = vec!["  ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_deadline() {
        let mut config = valid_config();
        config.deadline_hours = u64::MAX / 1000;

        assert!(config.validate().is_err());
        assert_eq!(config.deadline(), Duration::from_secs(u64::MAX));

        config.deadline_hours = MAX_DEADLINE_HOURS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_project_key_is_optional() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(
            temp_file,
            "[pipelines]\nsource-id = 2\nnames = [\"build\"]\nproject = \"payments\"\n"
        )
        .unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.pipelines.project.as_deref(), Some("payments"));
        assert!(Config::default().pipelines.project.is_none());
    }

    #[test]
    fn test_pipeline_settings_falls_back_to_base_url() {
        let mut config = Config::default();
        config.server.base_url = Some("https://acme.example.com".to_string());
        config.trigger_grace_secs = 5;

        let settings = config.pipeline_settings();
        assert_eq!(settings.ui_url, "https://acme.example.com");
        assert_eq!(settings.trigger_grace, Duration::from_secs(5));

        config.server.ui_url = Some("https://ui.example.com".to_string());
        assert_eq!(config.pipeline_settings().ui_url, "https://ui.example.com");
    }

    #[test]
    fn test_backoff_settings_convert() {
        let backoff: BackoffConfig = default_wait_backoff().into();
        assert_eq!(backoff, BackoffConfig::new(Duration::from_secs(10), 1080));
    }
}
