use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub notify: NotifyConfig,
    pub store: StoreConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub fallback: Option<FallbackConfig>,
}

#[derive(Debug, Deserialize)]
pub struct FallbackConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub enabled: bool,
    pub base_url: String,
    pub tokens: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub sqlite_path: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind: String,
    pub port: u16,
    pub admin_id: String,
    pub admin_password: String,
    pub ingest_token: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist. Secrets can be
    /// supplied or overridden through `AUTHBOX_*` environment variables so
    /// they never have to live in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("AUTHBOX_GEMINI_API_KEY") {
            self.llm.gemini_api_key = v;
        }
        if let Ok(v) = std::env::var("AUTHBOX_GEMINI_MODEL") {
            self.llm.gemini_model = v;
        }
        if let Ok(v) = std::env::var("AUTHBOX_ADMIN_ID") {
            self.gateway.admin_id = v;
        }
        if let Ok(v) = std::env::var("AUTHBOX_ADMIN_PASSWORD") {
            self.gateway.admin_password = v;
        }
        if let Ok(v) = std::env::var("AUTHBOX_INGEST_TOKEN") {
            self.gateway.ingest_token = Some(v);
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_model: "gemini-1.5-flash-latest".into(),
            fallback: None,
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.day.app".into(),
            tokens: Vec::new(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "./data/authbox.db".into(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8080,
            admin_id: "admin".into(),
            admin_password: String::new(),
            ingest_token: None,
        }
    }
}
