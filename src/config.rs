use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::backoff::Backoff;

/// Config file looked up in the project root when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "runtask-watch.toml";

#[derive(Default, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WatchConfig {
    pub remote: RemoteConfig,
    pub polling: PollingConfig,
    pub output: OutputConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RemoteConfig {
    pub address: String,
    /// Environment variable holding the API token.
    pub token_env: String,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PollingConfig {
    pub backoff_min_ms: u64,
    pub backoff_max_ms: u64,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Banner printed at the top of the report block.
    pub title: String,
    pub color: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            address: "https://app.terraform.io".to_string(),
            token_env: "TFE_TOKEN".to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            backoff_min_ms: 1000,
            backoff_max_ms: 3000,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            title: "Run tasks".to_string(),
            color: true,
        }
    }
}

impl PollingConfig {
    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.backoff_min_ms),
            Duration::from_millis(self.backoff_max_ms),
        )
    }
}

impl RemoteConfig {
    /// Token read from the configured environment variable, if set and non-empty.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

pub fn validate(config: &WatchConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.polling.backoff_min_ms < 1 {
        errors.push("polling.backoff_min_ms must be >= 1".to_string());
    }

    if config.polling.backoff_min_ms > config.polling.backoff_max_ms {
        errors.push(format!(
            "polling.backoff_min_ms ({}) must not exceed polling.backoff_max_ms ({})",
            config.polling.backoff_min_ms, config.polling.backoff_max_ms
        ));
    }

    if config.remote.address.trim().is_empty() {
        errors.push("remote.address must not be empty".to_string());
    }

    if config.output.title.trim().is_empty() {
        errors.push("output.title must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Load `runtask-watch.toml` from `project_root`, falling back to defaults.
pub fn load_config(project_root: &Path) -> Result<WatchConfig, String> {
    let config_path = project_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        return Ok(WatchConfig::default());
    }

    load_config_file(&config_path)
}

/// Load and validate an explicit config file. The file must exist.
pub fn load_config_file(config_path: &Path) -> Result<WatchConfig, String> {
    let contents = std::fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read {}: {}", config_path.display(), e))?;

    let config: WatchConfig = toml::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", config_path.display(), e))?;

    validate(&config).map_err(|errors| {
        format!(
            "Config validation failed:\n{}",
            errors
                .iter()
                .map(|e| format!("  - {}", e))
                .collect::<Vec<_>>()
                .join("\n")
        )
    })?;

    Ok(config)
}
