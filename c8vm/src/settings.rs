use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Pane visibility toggles, persisted between runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UiSettings {
    pub show_sidebar: bool,
    pub show_events: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            show_sidebar: true,
            show_events: true,
        }
    }
}

impl UiSettings {
    fn settings_path() -> PathBuf {
        if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(config_dir).join("c8vm").join("ui.json")
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".config").join("c8vm").join("ui.json")
        } else {
            PathBuf::from(".c8vm_ui.json")
        }
    }

    /// Load settings from disk, or return defaults if the file is missing
    /// or unreadable. A broken settings file never stops a run.
    pub fn load() -> Self {
        let path = Self::settings_path();

        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(settings) => return settings,
                    Err(e) => warn!("failed to parse UI settings: {e}"),
                },
                Err(e) => warn!("failed to read UI settings: {e}"),
            }
        }

        Self::default()
    }

    /// Save settings to disk.
    pub fn save(&self) -> Result<(), String> {
        let path = Self::settings_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create config directory: {e}"))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("failed to serialize settings: {e}"))?;

        fs::write(&path, json).map_err(|e| format!("failed to write settings: {e}"))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_show_everything() {
        let settings = UiSettings::default();
        assert!(settings.show_sidebar);
        assert!(settings.show_events);
    }

    #[test]
    fn test_settings_round_trip_through_json() {
        let settings = UiSettings {
            show_sidebar: false,
            show_events: true,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: UiSettings = serde_json::from_str(&json).unwrap();
        assert!(!back.show_sidebar);
        assert!(back.show_events);
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        let json = r#"{"show_sidebar":true,"show_events":false,"stale":1}"#;
        let settings: UiSettings = serde_json::from_str(json).unwrap();
        assert!(settings.show_sidebar);
        assert!(!settings.show_events);
    }
}
