//! Presence payload shown by the external service

use chrono::{DateTime, Utc};

use crate::settings::PresenceConfig;

pub const DEFAULT_STATE: &str = "Idle";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceButton {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceAssets {
    pub large_image: Option<String>,
    pub large_text: Option<String>,
    pub small_image: Option<String>,
    pub small_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presence {
    pub state: String,
    pub assets: PresenceAssets,
    pub started_at: Option<DateTime<Utc>>,
    pub buttons: Vec<PresenceButton>,
}

impl Presence {
    /// The payload pushed right after connecting
    pub fn idle(config: &PresenceConfig) -> Self {
        Self {
            state: DEFAULT_STATE.to_string(),
            assets: PresenceAssets {
                large_image: Some(config.large_image_key.clone()),
                large_text: Some(config.large_image_text.clone()),
                small_image: Some(config.small_image_key.clone()),
                small_text: None,
            },
            started_at: Some(config.started_at),
            buttons: config
                .buttons
                .iter()
                .map(|b| PresenceButton {
                    label: b.label.clone(),
                    url: b.url.clone(),
                })
                .collect(),
        }
    }

    pub fn set_small_asset(&mut self, key: &str, tooltip: &str) {
        self.assets.small_image = Some(key.to_string());
        self.assets.small_text = Some(tooltip.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_presence_uses_config() {
        let config = PresenceConfig::default();
        let presence = Presence::idle(&config);

        assert_eq!(presence.state, "Idle");
        assert_eq!(presence.assets.large_image.as_deref(), Some("icon"));
        assert_eq!(presence.assets.small_image.as_deref(), Some("icon"));
        assert_eq!(presence.assets.large_text.as_deref(), Some("MHUR Porting"));
        assert_eq!(presence.started_at, Some(config.started_at));
        assert_eq!(presence.buttons.len(), 2);
        assert_eq!(presence.buttons[0].label, "Join Porteria!");
        assert_eq!(presence.buttons[1].label, "Download MHUR Porting");
    }

    #[test]
    fn test_set_small_asset() {
        let mut presence = Presence::idle(&PresenceConfig::default());
        presence.set_small_asset("mesh", "Meshes");

        assert_eq!(presence.assets.small_image.as_deref(), Some("mesh"));
        assert_eq!(presence.assets.small_text.as_deref(), Some("Meshes"));
        assert_eq!(presence.state, "Idle");
    }
}
