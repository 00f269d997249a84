use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PresenceError;

/// Directory name shared by the config and log directories
pub(crate) const APP_DIR: &str = "MHURPorting";
const CONFIG_FILE: &str = "presence.json";

pub const DEFAULT_APPLICATION_ID: i64 = 1_225_146_168_447_733_893;
/// Placeholder invite, override it with the real one in `presence.json`
pub const DISCORD_URL: &str = "https://discord.gg/porteria";
pub const GITHUB_URL: &str = "https://github.com/Tevtongermany/MHUR-Porting";

/// Discord shows at most two buttons on an activity
pub const MAX_BUTTONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonConfig {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    #[serde(default = "default_application_id")]
    pub application_id: i64,
    #[serde(default = "default_image_key")]
    pub large_image_key: String,
    #[serde(default = "default_image_key")]
    pub small_image_key: String,
    #[serde(default = "default_large_image_text")]
    pub large_image_text: String,
    #[serde(default = "default_buttons")]
    pub buttons: Vec<ButtonConfig>,
    /// Category name -> label shown while browsing that category
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
    #[serde(skip, default = "Utc::now")]
    pub started_at: DateTime<Utc>,
}

fn default_application_id() -> i64 {
    DEFAULT_APPLICATION_ID
}

fn default_image_key() -> String {
    "icon".to_string()
}

fn default_large_image_text() -> String {
    "MHUR Porting".to_string()
}

fn default_buttons() -> Vec<ButtonConfig> {
    vec![
        ButtonConfig {
            label: "Join Porteria!".to_string(),
            url: DISCORD_URL.to_string(),
        },
        ButtonConfig {
            label: "Download MHUR Porting".to_string(),
            url: GITHUB_URL.to_string(),
        },
    ]
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            application_id: default_application_id(),
            large_image_key: default_image_key(),
            small_image_key: default_image_key(),
            large_image_text: default_large_image_text(),
            buttons: default_buttons(),
            categories: BTreeMap::new(),
            started_at: Utc::now(),
        }
    }
}

impl PresenceConfig {
    /// Drop buttons Discord would reject: bad URLs, empty labels, anything past the limit.
    pub fn validated(mut self) -> Self {
        self.buttons.retain(|button| {
            if button.label.trim().is_empty() {
                tracing::warn!("Ignoring presence button with empty label");
                return false;
            }
            match url::Url::parse(&button.url) {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(
                        "Ignoring presence button {:?} with invalid URL {:?}: {}",
                        button.label,
                        button.url,
                        e
                    );
                    false
                }
            }
        });

        if self.buttons.len() > MAX_BUTTONS {
            tracing::warn!(
                "Only {} presence buttons are supported, ignoring {} extra",
                MAX_BUTTONS,
                self.buttons.len().saturating_sub(MAX_BUTTONS)
            );
            self.buttons.truncate(MAX_BUTTONS);
        }

        self
    }
}

pub fn get_config_path() -> Result<PathBuf, PresenceError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| PresenceError::Config("Failed to get config directory".to_string()))?
        .join(APP_DIR);

    fs::create_dir_all(&config_dir)?;

    Ok(config_dir.join(CONFIG_FILE))
}

pub fn load_config() -> Result<PresenceConfig, PresenceError> {
    let path = get_config_path()?;
    Ok(load_config_from(&path))
}

pub fn load_config_from(path: &Path) -> PresenceConfig {
    tracing::debug!("Loading presence config from {}", path.display());

    if !path.exists() {
        return PresenceConfig::default();
    }

    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read presence config, using defaults: {}", e);
            return PresenceConfig::default();
        }
    };

    if contents.trim().is_empty() {
        tracing::warn!("Presence config is empty, using defaults");
        return PresenceConfig::default();
    }

    match serde_json::from_str::<PresenceConfig>(&contents) {
        Ok(config) => config.validated(),
        Err(e) => {
            tracing::warn!("Failed to parse presence config, using defaults: {}", e);
            PresenceConfig::default()
        }
    }
}

pub fn save_config(config: &PresenceConfig) -> Result<(), PresenceError> {
    let path = get_config_path()?;
    save_config_to(&path, config)
}

pub fn save_config_to(path: &Path, config: &PresenceConfig) -> Result<(), PresenceError> {
    tracing::debug!("Saving presence config to {}", path.display());
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}
