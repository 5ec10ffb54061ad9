use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::utils;
use crate::{Error, Result};

pub const DEFAULT_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";
pub const DEFAULT_FABRIC_META_URL: &str = "https://meta.fabricmc.net/v2";
pub const SETTINGS_FILE: &str = "settings.toml";

fn default_game_directory() -> PathBuf {
    utils::get_data_dir()
}

fn default_java_path() -> String {
    "java".to_string()
}

fn default_manifest_url() -> String {
    DEFAULT_MANIFEST_URL.to_string()
}

fn default_fabric_meta_url() -> String {
    DEFAULT_FABRIC_META_URL.to_string()
}

fn default_nickname() -> String {
    "Player".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_game_directory")]
    pub game_directory: PathBuf,
    #[serde(default = "default_java_path")]
    pub java_path: String,
    #[serde(default = "default_manifest_url")]
    pub manifest_url: String,
    #[serde(default = "default_fabric_meta_url")]
    pub fabric_meta_url: String,
    #[serde(default = "default_nickname")]
    pub default_nickname: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game_directory: default_game_directory(),
            java_path: default_java_path(),
            manifest_url: default_manifest_url(),
            fabric_meta_url: default_fabric_meta_url(),
            default_nickname: default_nickname(),
            log_level: default_log_level(),
        }
    }
}

pub struct SettingsManager {
    settings: Settings,
    settings_path: PathBuf,
    dirty: bool,
}

impl SettingsManager {
    pub fn new(settings_path: PathBuf) -> Result<Self> {
        let mut manager = Self {
            settings: Settings::default(),
            settings_path,
            dirty: false,
        };

        manager.load()?;
        Ok(manager)
    }

    pub fn default_path() -> PathBuf {
        utils::get_data_dir().join(SETTINGS_FILE)
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        self.dirty = true;
        &mut self.settings
    }

    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&self.settings)
            .map_err(|e| Error::Settings(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&self.settings_path, content)?;
        self.dirty = false;

        log::info!("Settings saved to {:?}", self.settings_path);
        Ok(())
    }

    pub fn load(&mut self) -> Result<()> {
        if !self.settings_path.exists() {
            self.dirty = true;
            return self.save();
        }

        let content = std::fs::read_to_string(&self.settings_path)?;

        self.settings = toml::from_str(&content)
            .map_err(|e| Error::Settings(format!("Failed to parse settings: {}", e)))?;

        self.dirty = false;
        log::info!("Settings loaded from {:?}", self.settings_path);
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
