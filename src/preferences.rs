use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::display::normalize;
use crate::utils::write_json_atomic;
use crate::version::VersionFilter;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub version_filter: String,
    #[serde(default)]
    pub selected_version: String,
}

impl Preferences {
    pub fn new(filter: VersionFilter, selected: &str) -> Self {
        Self {
            version_filter: filter.label().to_string(),
            selected_version: normalize(selected),
        }
    }

    pub fn filter(&self) -> VersionFilter {
        VersionFilter::from_label(&self.version_filter)
    }
}

/// `client/config.json`; ошибки чтения и записи не выходят наружу.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Preferences {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                log::debug!("Настройки {:?} не прочитаны: {}", self.path, e);
                return Preferences::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Повреждён файл {:?}: {}", self.path, e);
            Preferences::default()
        })
    }

    pub fn save(&self, preferences: &Preferences) {
        let normalized = Preferences {
            version_filter: preferences.version_filter.clone(),
            selected_version: normalize(&preferences.selected_version),
        };

        if let Err(e) = write_json_atomic(&self.path, &normalized) {
            log::warn!("Не удалось сохранить {:?}: {}", self.path, e);
        }
    }
}
