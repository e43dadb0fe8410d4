use anyhow::{Context, Result};
use mmrag_model::{JudgeConfig, RetryConfig};
use mmrag_telemetry::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Retry settings as written in the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub enabled: bool,
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            enabled: defaults.enabled,
            max_retries: defaults.max_retries,
            initial_delay_ms: defaults.initial_delay.as_millis() as u64,
            max_delay_ms: defaults.max_delay.as_millis() as u64,
            backoff_multiplier: defaults.backoff_multiplier,
        }
    }
}

impl RetrySettings {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            enabled: self.enabled,
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
        }
    }
}

/// Settings for an `evaluate` run.
///
/// Layers, lowest first: defaults, TOML file, environment, command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub judge: JudgeConfig,
    pub retry: RetrySettings,
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Read a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults, or the file at `path` when one is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply `MMRAG_API_KEY` (or `OPENAI_API_KEY`), `MMRAG_BASE_URL` and `MMRAG_MODEL`
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = non_empty("MMRAG_API_KEY").or_else(|| non_empty("OPENAI_API_KEY")) {
            self.judge.api_key = api_key;
        }
        if let Some(base_url) = non_empty("MMRAG_BASE_URL") {
            self.judge.base_url = base_url;
        }
        if let Some(model) = non_empty("MMRAG_MODEL") {
            self.judge.model = model;
        }
    }

    /// Apply the process environment
    pub fn apply_process_env(&mut self) {
        self.apply_env(|name| std::env::var(name).ok());
    }

    pub fn apply_overrides(
        &mut self,
        model: Option<String>,
        base_url: Option<String>,
        log_format: Option<LogFormat>,
    ) {
        if let Some(model) = model {
            self.judge.model = model;
        }
        if let Some(base_url) = base_url {
            self.judge.base_url = base_url;
        }
        if let Some(log_format) = log_format {
            self.log_format = log_format;
        }
    }
}
