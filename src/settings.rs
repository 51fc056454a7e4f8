use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::drag::CancelPolicy;
use crate::drag::pointer::DEFAULT_ACTIVATION_DISTANCE;
use crate::ids::IdStrategy;
use crate::theme::ThemePreset;

const DEFAULT_THEME: &str = "default";
const MIN_ACTIVATION_DISTANCE: u16 = 1;
const MAX_ACTIVATION_DISTANCE: u16 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: String,
    pub activation_distance: u16,
    pub cancel_restores_board: bool,
    pub id_strategy: String,
    pub keybindings: KeybindingsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: HashMap<String, Vec<String>>,
    pub board: HashMap<String, Vec<String>>,
    pub drag: HashMap<String, Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            activation_distance: DEFAULT_ACTIVATION_DISTANCE,
            cancel_restores_board: false,
            id_strategy: IdStrategy::default().as_str().to_string(),
            keybindings: KeybindingsConfig::default(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("prep-board");
        path.push("settings.toml");
        Some(path)
    }

    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(mut settings) => {
                    settings.validate();
                    settings
                }
                Err(error) => {
                    warn!(
                        "failed to parse settings config '{}': {}",
                        path.display(),
                        error
                    );
                    Self::default()
                }
            },
            Err(error) => {
                warn!(
                    "failed to read settings config '{}': {}",
                    path.display(),
                    error
                );
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path().ok_or_else(|| anyhow!("unable to determine config path"))?;
        self.save_to_path(&path)
    }

    pub fn save_to_path(&self, path: &Path) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("invalid settings config path"))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory '{}'", parent.display()))?;

        let mut validated = self.clone();
        validated.validate();
        let contents =
            toml::to_string_pretty(&validated).context("failed to serialize settings to TOML")?;

        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow!("invalid settings config file name"))?
            .to_string_lossy()
            .to_string();
        let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

        fs::write(&tmp_path, contents).with_context(|| {
            format!(
                "failed to write temporary settings file '{}'",
                tmp_path.display()
            )
        })?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "failed to atomically rename settings file '{}' to '{}'",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    pub fn theme_preset(&self) -> ThemePreset {
        ThemePreset::from_str(&self.theme).unwrap_or_default()
    }

    pub fn cancel_policy(&self) -> CancelPolicy {
        if self.cancel_restores_board {
            CancelPolicy::RestoreSnapshot
        } else {
            CancelPolicy::KeepMoves
        }
    }

    pub fn id_strategy(&self) -> IdStrategy {
        IdStrategy::from_str(&self.id_strategy).unwrap_or_default()
    }

    fn validate(&mut self) {
        self.activation_distance = self
            .activation_distance
            .clamp(MIN_ACTIVATION_DISTANCE, MAX_ACTIVATION_DISTANCE);

        self.theme = match ThemePreset::from_str(&self.theme) {
            Ok(preset) => preset.as_str().to_string(),
            Err(()) => {
                warn!(
                    "invalid theme '{}' in settings config; falling back to default",
                    self.theme
                );
                DEFAULT_THEME.to_string()
            }
        };

        self.id_strategy = match IdStrategy::from_str(&self.id_strategy) {
            Ok(strategy) => strategy.as_str().to_string(),
            Err(()) => {
                let fallback = IdStrategy::default();
                warn!(
                    "invalid id_strategy '{}' in settings config; falling back to {}",
                    self.id_strategy,
                    fallback.as_str()
                );
                fallback.as_str().to_string()
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings_file_path(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join("prep-board").join("settings.toml")
    }

    fn write_settings(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().expect("settings path should have parent"))
            .expect("failed to create config dir");
        fs::write(path, contents).expect("failed to write settings");
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.theme, "default");
        assert_eq!(settings.activation_distance, 2);
        assert!(!settings.cancel_restores_board);
        assert_eq!(settings.id_strategy, "uuid");
        assert_eq!(settings.cancel_policy(), CancelPolicy::KeepMoves);
        assert_eq!(settings.keybindings, KeybindingsConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().expect("temp dir");
        let settings = Settings::load_from_path(&settings_file_path(&temp_dir));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_malformed_toml() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = settings_file_path(&temp_dir);
        write_settings(&path, "theme = \"mono\"\nactivation_distance = [invalid");

        assert_eq!(Settings::load_from_path(&path), Settings::default());
    }

    #[test]
    fn test_load_partial_toml() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = settings_file_path(&temp_dir);
        write_settings(
            &path,
            "cancel_restores_board = true\n[keybindings.drag]\ncancel_drag = [\"q\"]\n",
        );

        let settings = Settings::load_from_path(&path);
        assert_eq!(settings.theme, DEFAULT_THEME);
        assert_eq!(settings.activation_distance, DEFAULT_ACTIVATION_DISTANCE);
        assert_eq!(settings.cancel_policy(), CancelPolicy::RestoreSnapshot);
        assert_eq!(
            settings.keybindings.drag.get("cancel_drag"),
            Some(&vec!["q".to_string()])
        );
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = settings_file_path(&temp_dir);
        let mut expected = Settings {
            theme: "high-contrast".to_string(),
            activation_distance: 4,
            cancel_restores_board: true,
            id_strategy: "timestamp".to_string(),
            keybindings: KeybindingsConfig::default(),
        };
        expected.validate();

        expected
            .save_to_path(&path)
            .expect("failed to save settings for roundtrip test");

        assert_eq!(Settings::load_from_path(&path), expected);
        assert!(path.exists());
    }

    #[test]
    fn test_validate_clamps_activation_distance() {
        let mut settings = Settings {
            activation_distance: 0,
            ..Settings::default()
        };
        settings.validate();
        assert_eq!(settings.activation_distance, MIN_ACTIVATION_DISTANCE);

        settings.activation_distance = 400;
        settings.validate();
        assert_eq!(settings.activation_distance, MAX_ACTIVATION_DISTANCE);
    }

    #[test]
    fn test_validate_invalid_theme_and_strategy() {
        let mut settings = Settings {
            theme: "retro-wave".to_string(),
            id_strategy: "sequential".to_string(),
            ..Settings::default()
        };

        settings.validate();

        assert_eq!(settings.theme, "default");
        assert_eq!(settings.id_strategy, "uuid");
    }

    #[test]
    fn test_validate_normalizes_aliases() {
        let mut settings = Settings {
            theme: "day".to_string(),
            id_strategy: "counter".to_string(),
            ..Settings::default()
        };

        settings.validate();

        assert_eq!(settings.theme, "light");
        assert_eq!(settings.id_strategy(), IdStrategy::Timestamp);
    }
}
