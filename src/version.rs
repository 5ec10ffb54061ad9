use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

pub type VersionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseType {
    Release,
    Snapshot,
    #[default]
    #[serde(other)]
    Other,
}

/// Запись удалённого каталога версий.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub id: VersionId,
    #[serde(rename = "type", default)]
    pub release_type: ReleaseType,
}

impl VersionEntry {
    pub fn new(id: impl Into<String>, release_type: ReleaseType) -> Self {
        Self {
            id: id.into(),
            release_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionFilter {
    #[default]
    Release,
    Snapshot,
    All,
}

impl VersionFilter {
    pub const ALL: [VersionFilter; 3] = [VersionFilter::Release, VersionFilter::Snapshot, VersionFilter::All];

    pub fn label(&self) -> &'static str {
        match self {
            VersionFilter::Release => "Релизы",
            VersionFilter::Snapshot => "Снапшоты",
            VersionFilter::All => "Все",
        }
    }

    /// Неизвестные подписи сводятся к фильтру по умолчанию.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|filter| filter.label() == label)
            .unwrap_or_default()
    }

    pub fn next(&self) -> Self {
        match self {
            VersionFilter::Release => VersionFilter::Snapshot,
            VersionFilter::Snapshot => VersionFilter::All,
            VersionFilter::All => VersionFilter::Release,
        }
    }

    pub fn matches(&self, release_type: ReleaseType) -> bool {
        match self {
            VersionFilter::Release => release_type == ReleaseType::Release,
            VersionFilter::Snapshot => release_type == ReleaseType::Snapshot,
            VersionFilter::All => true,
        }
    }
}

impl fmt::Display for VersionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Числовые major.minor из идентификатора версии ("1.21.8" -> 1.21).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GameVersion {
    pub major: u32,
    pub minor: u32,
}

impl GameVersion {
    pub fn parse(id: &str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"^(\d+)\.(\d+)").expect("static version pattern")
        });

        let captures = pattern.captures(id)?;
        Some(Self {
            major: captures[1].parse().ok()?,
            minor: captures[2].parse().ok()?,
        })
    }

    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        (self.major, self.minor) >= (major, minor)
    }
}

/// Локальный список установленных версий: `versions/<id>/<id>.json`.
#[derive(Debug, Clone)]
pub struct VersionInventory {
    versions_dir: PathBuf,
}

impl VersionInventory {
    pub fn new(versions_dir: PathBuf) -> Self {
        Self { versions_dir }
    }

    pub fn versions_dir(&self) -> &Path {
        &self.versions_dir
    }

    pub fn version_dir(&self, version_id: &str) -> PathBuf {
        self.versions_dir.join(version_id)
    }

    pub fn manifest_path(&self, version_id: &str) -> PathBuf {
        self.version_dir(version_id).join(format!("{}.json", version_id))
    }

    pub fn is_installed(&self, version_id: &str) -> bool {
        if version_id.is_empty() {
            return false;
        }
        self.version_dir(version_id).is_dir() && self.manifest_path(version_id).is_file()
    }

    /// Ошибки чтения каталога дают пустой набор: лаунчер должен работать офлайн.
    pub fn list_installed(&self) -> BTreeSet<VersionId> {
        WalkDir::new(&self.versions_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::debug!("Пропуск каталога версий: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|id| self.manifest_path(id).is_file())
            .collect()
    }
}
