use std::collections::BTreeSet;
use std::fmt;
use serde::{Deserialize, Serialize};
use crate::settings::Settings;
use crate::version::{GameVersion, VersionId, VersionInventory};
use crate::Result;

/// Описание загрузчика модов: совместимость, префикс сборок, метаданные.
pub trait LoaderStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Префикс идентификаторов настоящих сборок загрузчика в `versions/`.
    fn canonical_prefix(&self) -> &'static str;

    fn supports(&self, version: GameVersion) -> bool;

    fn loader_versions_url(&self, settings: &Settings, base_version: &str) -> String;
}

pub struct FabricStrategy;

impl LoaderStrategy for FabricStrategy {
    fn name(&self) -> &'static str {
        "fabric"
    }

    fn canonical_prefix(&self) -> &'static str {
        "fabric-loader-"
    }

    fn supports(&self, version: GameVersion) -> bool {
        version.at_least(1, 14)
    }

    fn loader_versions_url(&self, settings: &Settings, base_version: &str) -> String {
        format!(
            "{}/versions/loader/{}",
            settings.fabric_meta_url.trim_end_matches('/'),
            base_version
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    Fabric,
}

impl LoaderKind {
    pub const ALL: [LoaderKind; 1] = [LoaderKind::Fabric];

    pub fn strategy(&self) -> &'static dyn LoaderStrategy {
        match self {
            LoaderKind::Fabric => &FabricStrategy,
        }
    }

    pub fn name(&self) -> &'static str {
        self.strategy().name()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    pub fn is_compatible(&self, base_version: &str) -> bool {
        GameVersion::parse(base_version)
            .map(|version| self.strategy().supports(version))
            .unwrap_or(false)
    }

    /// Составной идентификатор вида "1.21.8 fabric".
    pub fn alias_id(&self, base_version: &str) -> VersionId {
        format!("{} {}", base_version, self.name())
    }

    pub fn is_canonical_build(&self, version_id: &str) -> bool {
        version_id.starts_with(self.strategy().canonical_prefix())
    }
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Вхождение базовой версии с проверкой границы, а не простая подстрока:
/// "1.21" намеренно не совпадает с "fabric-loader-1.21.8-0.15.0",
/// иначе для 1.21 запустилась бы сборка другой версии игры.
fn contains_version(haystack: &str, base_version: &str) -> bool {
    haystack.match_indices(base_version).any(|(start, _)| {
        let rest = &haystack[start + base_version.len()..];
        let mut chars = rest.chars();
        match chars.next() {
            None => true,
            Some(c) if c.is_ascii_digit() => false,
            Some('.') => !chars.next().is_some_and(|c| c.is_ascii_digit()),
            Some(_) => true,
        }
    })
}

/// Ищет установленную сборку загрузчика для базовой версии.
pub fn find_installed_loader_build(
    inventory: &VersionInventory,
    base_version: &str,
    loader: LoaderKind,
) -> Option<VersionId> {
    select_loader_build(&inventory.list_installed(), base_version, loader)
}

/// Выбор из уже просканированного набора идентификаторов.
///
/// Настоящие сборки (с каноническим префиксом) важнее псевдонимов,
/// при равенстве решает лексикографический порядок идентификаторов.
pub fn select_loader_build<'a, I>(installed: I, base_version: &str, loader: LoaderKind) -> Option<VersionId>
where
    I: IntoIterator<Item = &'a VersionId>,
{
    if base_version.is_empty() {
        return None;
    }

    let base = base_version.to_lowercase();
    let loader_name = loader.name().to_lowercase();

    installed
        .into_iter()
        .filter(|id| {
            let lowered = id.to_lowercase();
            contains_version(&lowered, &base) && lowered.contains(&loader_name)
        })
        .min_by(|a, b| {
            (!loader.is_canonical_build(a), *a).cmp(&(!loader.is_canonical_build(b), *b))
        })
        .cloned()
}

/// Настоящая сборка загрузчика для базовой версии, псевдоним разыменовывается.
/// Псевдоним без установленной цели считается отсутствующей сборкой.
pub fn resolve_loader_build(
    inventory: &VersionInventory,
    installed: &BTreeSet<VersionId>,
    base_version: &str,
    loader: LoaderKind,
) -> Option<VersionId> {
    let found = select_loader_build(installed, base_version, loader)?;
    if loader.is_canonical_build(&found) {
        return Some(found);
    }

    let target = read_alias_target(inventory, &found)?;
    if loader.is_canonical_build(&target) && installed.contains(&target) {
        Some(target)
    } else {
        log::warn!("Псевдоним {} указывает на отсутствующую сборку {}", found, target);
        None
    }
}

/// Манифест-псевдоним: отмечает составной идентификатор как установленный.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasManifest {
    pub id: VersionId,
    pub inherits_from: VersionId,
    #[serde(rename = "type")]
    pub release_type: String,
}

/// Пишет псевдоним, если его ещё нет. Возвращает `true`, если файл был создан.
pub fn ensure_alias_manifest(
    inventory: &VersionInventory,
    base_version: &str,
    loader: LoaderKind,
    resolved_id: &str,
) -> Result<bool> {
    let alias_id = loader.alias_id(base_version);
    let manifest_path = inventory.manifest_path(&alias_id);
    if manifest_path.exists() {
        return Ok(false);
    }

    let manifest = AliasManifest {
        id: alias_id.clone(),
        inherits_from: resolved_id.to_string(),
        release_type: "release".to_string(),
    };

    std::fs::create_dir_all(inventory.version_dir(&alias_id))?;
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;
    log::info!("Создан псевдоним {} -> {}", alias_id, resolved_id);
    Ok(true)
}

/// Настоящая сборка, на которую указывает псевдоним.
pub fn read_alias_target(inventory: &VersionInventory, alias_id: &str) -> Option<VersionId> {
    let content = std::fs::read_to_string(inventory.manifest_path(alias_id)).ok()?;
    match serde_json::from_str::<AliasManifest>(&content) {
        Ok(manifest) if !manifest.inherits_from.is_empty() => Some(manifest.inherits_from),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Повреждён псевдоним {}: {}", alias_id, e);
            None
        }
    }
}
