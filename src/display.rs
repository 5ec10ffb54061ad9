use std::collections::BTreeSet;
use crate::loader::{resolve_loader_build, LoaderKind};
use crate::version::{VersionEntry, VersionFilter, VersionId, VersionInventory};

pub const INSTALLED_ICON: &str = "✅";
pub const MISSING_ICON: &str = "⬇";

const ICONS: [&str; 2] = [INSTALLED_ICON, MISSING_ICON];

/// Строка списка версий: базовая версия, загрузчик и признак установки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    pub base_version: VersionId,
    pub loader: Option<LoaderKind>,
    pub installed: bool,
}

/// Ключ выбора, не зависящий от значков.
pub type SelectionKey = (VersionId, Option<LoaderKind>);

impl DisplayEntry {
    pub fn vanilla(base_version: impl Into<String>, installed: bool) -> Self {
        Self {
            base_version: base_version.into(),
            loader: None,
            installed,
        }
    }

    pub fn modded(base_version: impl Into<String>, loader: LoaderKind, installed: bool) -> Self {
        Self {
            base_version: base_version.into(),
            loader: Some(loader),
            installed,
        }
    }

    pub fn label(&self) -> String {
        match self.loader {
            Some(loader) => loader.alias_id(&self.base_version),
            None => self.base_version.clone(),
        }
    }

    pub fn decorated(&self) -> String {
        decorate(&self.label(), self.installed)
    }

    pub fn key(&self) -> SelectionKey {
        (self.base_version.clone(), self.loader)
    }
}

pub fn decorate(label: &str, installed: bool) -> String {
    let icon = if installed { INSTALLED_ICON } else { MISSING_ICON };
    format!("{} {}", icon, label)
}

/// Убирает все значки статуса в начале строки.
pub fn normalize(display: &str) -> String {
    let mut rest = display.trim();
    while let Some(stripped) = ICONS.iter().find_map(|icon| rest.strip_prefix(icon)) {
        rest = stripped.trim_start();
    }
    rest.trim_end().to_string()
}

/// "✅ 1.21.8 fabric" -> ("1.21.8", Some(Fabric)).
pub fn parse_selection(display: &str) -> Option<SelectionKey> {
    let label = normalize(display);
    if label.is_empty() {
        return None;
    }

    if let Some((base, suffix)) = label.rsplit_once(' ') {
        if let Some(loader) = LoaderKind::from_name(suffix) {
            let base = base.trim_end();
            if !base.is_empty() {
                return Some((base.to_string(), Some(loader)));
            }
        }
    }

    Some((label, None))
}

/// Собирает список версий для показа.
///
/// Офлайн фильтр игнорируется, а список берётся из локальных установок.
/// Онлайн порядок каталога сохраняется, варианты с загрузчиком идут сразу за базовой версией.
pub fn build(
    catalog: Option<&[VersionEntry]>,
    offline: bool,
    filter: VersionFilter,
    inventory: &VersionInventory,
) -> Vec<DisplayEntry> {
    let installed = inventory.list_installed();

    let catalog = match catalog {
        Some(catalog) if !offline => catalog,
        _ => return build_offline(&installed),
    };

    let mut entries = Vec::new();
    for entry in catalog.iter().filter(|entry| filter.matches(entry.release_type)) {
        if entry.id.is_empty() {
            continue;
        }

        let base_installed = installed.contains(&entry.id);
        entries.push(DisplayEntry::vanilla(entry.id.clone(), base_installed));

        for loader in LoaderKind::ALL {
            if !loader.is_compatible(&entry.id) {
                continue;
            }
            let loader_installed = base_installed
                && resolve_loader_build(inventory, &installed, &entry.id, loader).is_some();
            entries.push(DisplayEntry::modded(entry.id.clone(), loader, loader_installed));
        }
    }

    log::debug!("Список версий: {} записей (фильтр {})", entries.len(), filter);
    entries
}

fn build_offline(installed: &BTreeSet<VersionId>) -> Vec<DisplayEntry> {
    installed
        .iter()
        .filter_map(|id| {
            // Псевдонимы нельзя запускать напрямую, поэтому они становятся записями с загрузчиком.
            match parse_selection(id)? {
                (base, Some(loader)) if *id == loader.alias_id(&base) => {
                    Some(DisplayEntry::modded(base, loader, true))
                }
                _ if is_loader_build(id) => None,
                _ => Some(DisplayEntry::vanilla(id.clone(), true)),
            }
        })
        .collect()
}

fn is_loader_build(id: &str) -> bool {
    LoaderKind::ALL.iter().any(|loader| loader.is_canonical_build(id))
}

/// Индекс прежнего выбора в новом списке или 0.
pub fn preserve_selection(entries: &[DisplayEntry], previous: Option<&SelectionKey>) -> usize {
    previous
        .and_then(|key| {
            entries
                .iter()
                .position(|entry| entry.base_version == key.0 && entry.loader == key.1)
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::scratch_dir;
    use crate::version::ReleaseType;
    use std::path::Path;

    fn install(root: &Path, id: &str) {
        let dir = root.join(id);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{}.json", id)), "{}").unwrap();
    }

    fn catalog() -> Vec<VersionEntry> {
        vec![
            VersionEntry::new("25w14a", ReleaseType::Snapshot),
            VersionEntry::new("1.21.8", ReleaseType::Release),
            VersionEntry::new("1.13.2", ReleaseType::Release),
            VersionEntry::new("b1.7.3", ReleaseType::Other),
        ]
    }

    #[test]
    fn test_normalize_is_idempotent_over_decoration() {
        for label in ["1.21.8", "1.21.8 fabric", "✅ 1.20.1", "⬇ ✅ 1.19"] {
            assert_eq!(normalize(&decorate(label, true)), normalize(label));
            assert_eq!(normalize(&decorate(label, false)), normalize(label));
        }
        assert_eq!(normalize("✅ 1.21.8 fabric"), "1.21.8 fabric");
        assert_eq!(normalize("  ⬇  1.20.1 "), "1.20.1");
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(
            parse_selection("⬇ 1.21.8 fabric"),
            Some(("1.21.8".to_string(), Some(LoaderKind::Fabric)))
        );
        assert_eq!(parse_selection("✅ 1.20.1"), Some(("1.20.1".to_string(), None)));
        assert_eq!(parse_selection("fabric"), Some(("fabric".to_string(), None)));
        assert_eq!(parse_selection("✅ "), None);
    }

    #[test]
    fn test_scenario_remote_catalog_not_installed() {
        let inventory = VersionInventory::new(scratch_dir());
        let remote = vec![VersionEntry::new("1.21.8", ReleaseType::Release)];

        let entries = build(Some(&remote), false, VersionFilter::All, &inventory);
        assert_eq!(
            entries,
            vec![
                DisplayEntry::vanilla("1.21.8", false),
                DisplayEntry::modded("1.21.8", LoaderKind::Fabric, false),
            ]
        );
        assert_eq!(entries[1].decorated(), "⬇ 1.21.8 fabric");
    }

    #[test]
    fn test_filter_and_loader_variants_follow_catalog_order() {
        let root = scratch_dir();
        install(&root, "1.21.8");
        install(&root, "fabric-loader-1.21.8-0.15.0");
        let inventory = VersionInventory::new(root);

        let releases = build(Some(&catalog()), false, VersionFilter::Release, &inventory);
        assert_eq!(
            releases,
            vec![
                DisplayEntry::vanilla("1.21.8", true),
                DisplayEntry::modded("1.21.8", LoaderKind::Fabric, true),
                DisplayEntry::vanilla("1.13.2", false),
            ]
        );

        let snapshots = build(Some(&catalog()), false, VersionFilter::Snapshot, &inventory);
        assert_eq!(snapshots, vec![DisplayEntry::vanilla("25w14a", false)]);

        let all = build(Some(&catalog()), false, VersionFilter::All, &inventory);
        let labels: Vec<_> = all.iter().map(DisplayEntry::label).collect();
        assert_eq!(labels, vec!["25w14a", "1.21.8", "1.21.8 fabric", "1.13.2", "b1.7.3"]);
    }

    #[test]
    fn test_dangling_alias_is_not_installed() {
        let root = scratch_dir();
        install(&root, "1.21.8");
        let inventory = VersionInventory::new(root.clone());
        crate::loader::ensure_alias_manifest(&inventory, "1.21.8", LoaderKind::Fabric, "fabric-loader-1.21.8-0.15.0")
            .unwrap();
        let remote = vec![VersionEntry::new("1.21.8", ReleaseType::Release)];

        let entries = build(Some(&remote), false, VersionFilter::Release, &inventory);
        assert_eq!(entries[1], DisplayEntry::modded("1.21.8", LoaderKind::Fabric, false));

        install(&root, "fabric-loader-1.21.8-0.15.0");
        let entries = build(Some(&remote), false, VersionFilter::Release, &inventory);
        assert_eq!(entries[1], DisplayEntry::modded("1.21.8", LoaderKind::Fabric, true));
    }

    #[test]
    fn test_scenario_offline_uses_local_inventory() {
        let root = scratch_dir();
        install(&root, "1.20.1");
        let inventory = VersionInventory::new(root);

        let entries = build(None, true, VersionFilter::Snapshot, &inventory);
        assert_eq!(entries, vec![DisplayEntry::vanilla("1.20.1", true)]);
    }

    #[test]
    fn test_offline_maps_aliases_and_hides_loader_builds() {
        let root = scratch_dir();
        install(&root, "1.21.8");
        install(&root, "1.21.8 fabric");
        install(&root, "fabric-loader-1.21.8-0.15.0");
        let inventory = VersionInventory::new(root);

        let entries = build(Some(&catalog()), true, VersionFilter::Release, &inventory);
        assert_eq!(
            entries,
            vec![
                DisplayEntry::vanilla("1.21.8", true),
                DisplayEntry::modded("1.21.8", LoaderKind::Fabric, true),
            ]
        );
    }

    #[test]
    fn test_selection_preserved_only_when_present() {
        let entries = vec![
            DisplayEntry::vanilla("1.21.8", false),
            DisplayEntry::modded("1.21.8", LoaderKind::Fabric, false),
            DisplayEntry::vanilla("1.20.1", true),
        ];

        let modded = ("1.21.8".to_string(), Some(LoaderKind::Fabric));
        assert_eq!(preserve_selection(&entries, Some(&modded)), 1);

        let vanilla = ("1.20.1".to_string(), None);
        assert_eq!(preserve_selection(&entries, Some(&vanilla)), 2);

        let gone = ("1.20.1".to_string(), Some(LoaderKind::Fabric));
        assert_eq!(preserve_selection(&entries, Some(&gone)), 0);
        assert_eq!(preserve_selection(&entries, None), 0);
    }
}
