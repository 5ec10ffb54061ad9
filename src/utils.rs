use std::path::{Path, PathBuf};
use serde::Serialize;
use crate::Result;

pub const APP_DIR_NAME: &str = "mjnlauncher";

/// Раскладка каталогов лаунчера внутри корня приложения.
#[derive(Debug, Clone)]
pub struct LauncherPaths {
    root: PathBuf,
}

impl LauncherPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.root.join("profiles")
    }

    pub fn client_dir(&self) -> PathBuf {
        self.root.join("client")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn users_file(&self) -> PathBuf {
        self.client_dir().join("users.json")
    }

    pub fn config_file(&self) -> PathBuf {
        self.client_dir().join("config.json")
    }

    pub fn profile_dir(&self, base_version: &str, loader: &str) -> PathBuf {
        self.profiles_dir().join(format!("{}-{}", base_version, loader))
    }
}

pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// JSON с отступом в 4 пробела, запись через временный файл и переименование.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &buffer)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[cfg(test)]
pub(crate) fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mjnl-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
