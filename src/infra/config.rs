// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub policy: PolicyClientConfig,

    #[serde(default)]
    pub policy_server: ServerConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub bind: String,
    pub port: u16,
    pub simulate_latency: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: 8081,
            simulate_latency: true,
        }
    }
}

/// Where the executor gets its decisions from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyMode {
    #[default]
    Remote,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyClientConfig {
    pub mode: PolicyMode,
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for PolicyClientConfig {
    fn default() -> Self {
        Self {
            mode: PolicyMode::Remote,
            url: "http://localhost:8080".into(),
            timeout_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind: String,
    pub port: u16,
    /// OpenAI-compatible chat completions endpoint.
    pub upstream_url: String,
    /// Name of the environment variable holding the upstream API key.
    pub api_key_env: String,
    pub block_on_pii: bool,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: 8082,
            upstream_url: "https://api.deepseek.com/v1/chat/completions".into(),
            api_key_env: "DEEPSEEK_API_KEY".into(),
            block_on_pii: true,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bearer token required on executor endpoints. Unset disables auth.
    pub token: Option<String>,
}

fn default_bind() -> String {
    "127.0.0.1".into()
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `POLICY_ENGINE_URL` from the environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("POLICY_ENGINE_URL").filter(|v| !v.trim().is_empty()) {
            self.policy.url = url;
        }
    }
}

/// Port from the `PORT` environment variable, if set and valid.
pub fn env_port() -> Option<u16> {
    parse_port(std::env::var("PORT").ok().as_deref())
}

fn parse_port(value: Option<&str>) -> Option<u16> {
    value.and_then(|v| v.trim().parse().ok())
}
