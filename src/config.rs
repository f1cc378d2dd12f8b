use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const CONFIG_DIR_NAME: &str = "intake";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_WORKSPACE_ID: &str = "skyslope";
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";
pub const DEFAULT_ALLOWED_DOMAIN: &str = "skyslope.com";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredConfig {
    pub slack_bot_token: Option<String>,
    pub slack_channel_id: Option<String>,
    pub slack_workspace_id: Option<String>,
    pub slack_api_base_url: Option<String>,
    pub user_email: Option<String>,
    pub allowed_domain: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid config file: {err}"))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| {
            AppError::Configuration("could not determine the config directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

/// Slack settings as loaded; nothing here is checked until a submission needs it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlackSettings {
    pub bot_token: Option<String>,
    pub channel_id: Option<String>,
    pub workspace_id: Option<String>,
    pub api_base_url: String,
}

impl SlackSettings {
    pub fn resolve(&self) -> AppResult<DeliveryTarget> {
        let bot_token = self.bot_token.clone().ok_or_else(|| {
            AppError::Configuration(
                "Slack integration not configured. Please set SLACK_BOT_TOKEN.".to_string(),
            )
        })?;
        let channel_id = self.channel_id.clone().ok_or_else(|| {
            AppError::Configuration(
                "Slack integration not configured. Please set SLACK_CHANNEL_ID.".to_string(),
            )
        })?;
        let workspace_id = self
            .workspace_id
            .clone()
            .unwrap_or_else(|| DEFAULT_WORKSPACE_ID.to_string());

        Ok(DeliveryTarget {
            bot_token,
            channel_id,
            workspace_id,
        })
    }
}

/// Everything a submission needs to reach its channel.
#[derive(Clone, PartialEq)]
pub struct DeliveryTarget {
    pub bot_token: String,
    pub channel_id: String,
    pub workspace_id: String,
}

impl std::fmt::Debug for DeliveryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryTarget")
            .field("bot_token", &"[REDACTED]")
            .field("channel_id", &self.channel_id)
            .field("workspace_id", &self.workspace_id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slack: SlackSettings,
    pub user_email: Option<String>,
    pub allowed_domain: String,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Ok(Self::from_sources(stored, |name| env::var(name).ok()))
    }

    /// Environment values take precedence over the stored file; blank values count as unset.
    pub fn from_sources(stored: StoredConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |name: &str, stored: Option<String>| {
            non_empty(env(name)).or_else(|| non_empty(stored))
        };

        Self {
            slack: SlackSettings {
                bot_token: pick("SLACK_BOT_TOKEN", stored.slack_bot_token),
                channel_id: pick("SLACK_CHANNEL_ID", stored.slack_channel_id),
                workspace_id: pick("SLACK_WORKSPACE_ID", stored.slack_workspace_id),
                api_base_url: pick("SLACK_API_BASE_URL", stored.slack_api_base_url)
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            },
            user_email: pick("INTAKE_USER_EMAIL", stored.user_email),
            allowed_domain: pick("INTAKE_ALLOWED_DOMAIN", stored.allowed_domain)
                .unwrap_or_else(|| DEFAULT_ALLOWED_DOMAIN.to_string()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
