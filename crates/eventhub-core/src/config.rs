use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::CATEGORIES;
use crate::store::{DEFAULT_EVENTS_KEY, EventStore, FileBackend};
use crate::validate::EventPolicy;

/// Directory under the project root holding config, data and lock files.
pub const DATA_DIR: &str = ".eventhub";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_key")]
    pub key: String,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_bytes: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            lock_timeout_ms: default_lock_timeout_ms(),
            quota_bytes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub require_approval: bool,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            require_approval: false,
        }
    }
}

impl ProjectConfig {
    #[must_use]
    pub fn policy(&self) -> EventPolicy {
        EventPolicy {
            categories: self.events.categories.clone(),
            require_approval: self.events.require_approval,
        }
    }

    /// File backend rooted at `<project_root>/.eventhub`.
    #[must_use]
    pub fn backend(&self, project_root: &Path) -> FileBackend {
        FileBackend::new(data_dir(project_root))
            .with_lock_timeout(Duration::from_millis(self.storage.lock_timeout_ms))
            .with_quota(self.storage.quota_bytes)
    }

    #[must_use]
    pub fn open_store(&self, project_root: &Path) -> EventStore<FileBackend> {
        EventStore::with_key(self.backend(project_root), self.storage.key.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    /// Default identity when neither `--as` nor `EVENTHUB_USER` is set.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[must_use]
pub fn data_dir(project_root: &Path) -> PathBuf {
    project_root.join(DATA_DIR)
}

#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    data_dir(project_root).join("config.toml")
}

/// Read `.eventhub/config.toml`; a missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Read the per-user config from the platform config directory.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("eventhub/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve the output mode name (`pretty`, `text` or `json`).
///
/// Precedence: `--json` > `FORMAT` env > user config `output` > TTY check.
#[must_use]
pub fn resolve_output_mode(cli_json: bool, user_output: Option<&str>) -> String {
    let env_format = env::var("FORMAT").ok();
    resolve_output(cli_json, user_output, env_format.as_deref(), std::io::stdout().is_terminal())
}

fn resolve_output(
    cli_json: bool,
    user_output: Option<&str>,
    env_format: Option<&str>,
    is_tty: bool,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "plain" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if is_tty { "pretty" } else { "text" }.to_string()
}

fn default_key() -> String {
    DEFAULT_EVENTS_KEY.to_string()
}

const fn default_lock_timeout_ms() -> u64 {
    5_000
}

fn default_categories() -> Vec<String> {
    CATEGORIES.iter().map(ToString::to_string).collect()
}
