use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(default = "default_worker_config")]
    pub worker: WorkerConfig,
    #[serde(default = "default_observability_config")]
    pub observability: ObservabilityConfig,
    /// Known provider substrings, in match-priority order.
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkerConfig {
    #[serde(default = "default_worker_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_worker_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_bind_addr() -> String {
    "127.0.0.1:3001".to_string()
}

fn default_providers() -> Vec<String> {
    ["instagram.com", "tiktok.com", "youtube.com", "youtu.be"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_worker_config() -> WorkerConfig {
    WorkerConfig {
        base_url: default_worker_base_url(),
        request_timeout_secs: default_request_timeout_secs(),
    }
}

fn default_observability_config() -> ObservabilityConfig {
    ObservabilityConfig {
        bind_addr: default_bind_addr(),
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }
}
