use std::path::{Path, PathBuf};
use std::process::Command;
use async_trait::async_trait;
use open_launcher::{auth, version, Launcher};
use reqwest::Client;
use serde::Deserialize;
use crate::catalog::RemoteCatalog;
use crate::loader::LoaderKind;
use crate::progress::ProgressReporter;
use crate::settings::Settings;
use crate::utils::LauncherPaths;
use crate::version::{VersionEntry, VersionId};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaunchOptions {
    pub username: String,
    pub uuid: String,
    pub token: String,
    pub game_directory: Option<PathBuf>,
    pub base_version: VersionId,
    pub loader: Option<LoaderKind>,
}

/// Внешний установщик и запускатор игры.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameBackend: Send + Sync {
    async fn list_remote_versions(&self) -> Result<Vec<VersionEntry>>;

    async fn install_base_version(&self, version_id: &str, reporter: &ProgressReporter) -> Result<()>;

    async fn install_loader(
        &self,
        loader: LoaderKind,
        base_version: &str,
        reporter: &ProgressReporter,
    ) -> Result<()>;

    async fn build_launch_command(&self, version_id: &str, options: &LaunchOptions) -> Result<Command>;
}

#[derive(Debug, Deserialize)]
struct LoaderVersionEntry {
    loader: LoaderInfo,
}

#[derive(Debug, Deserialize)]
struct LoaderInfo {
    version: String,
    #[serde(default)]
    stable: bool,
}

/// Реализация поверх `open_launcher`.
pub struct OpenLauncherBackend {
    settings: Settings,
    paths: LauncherPaths,
    client: Client,
    catalog: RemoteCatalog,
}

impl OpenLauncherBackend {
    pub fn new(settings: Settings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("mjn-launcher/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let catalog = RemoteCatalog::new(client.clone(), settings.manifest_url.clone());
        let paths = LauncherPaths::new(settings.game_directory.clone());

        Ok(Self {
            settings,
            paths,
            client,
            catalog,
        })
    }

    async fn launcher(&self, minecraft_version: &str, loader: Option<&str>, loader_version: Option<String>) -> Launcher {
        Launcher::new(
            &self.paths.root().to_string_lossy(),
            &self.settings.java_path,
            version::Version {
                minecraft_version: minecraft_version.to_string(),
                loader: loader.map(str::to_string),
                loader_version,
            },
        )
        .await
    }

    async fn latest_loader_version(&self, loader: LoaderKind, base_version: &str) -> Result<String> {
        let url = loader.strategy().loader_versions_url(&self.settings, base_version);
        log::info!("Поиск версии {} для {}: {}", loader, base_version, url);

        let entries: Vec<LoaderVersionEntry> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        pick_loader_version(&entries)
            .ok_or_else(|| Error::Backend(format!("{} не поддерживает версию {}", loader, base_version)))
    }
}

fn pick_loader_version(entries: &[LoaderVersionEntry]) -> Option<String> {
    entries
        .iter()
        .find(|entry| entry.loader.stable)
        .or_else(|| entries.first())
        .map(|entry| entry.loader.version.clone())
}

/// "fabric-loader-1.21.8-0.15.0" -> "0.15.0".
pub fn loader_version_from_build(build_id: &str, base_version: &str, loader: LoaderKind) -> Option<String> {
    let rest = build_id.strip_prefix(loader.strategy().canonical_prefix())?;
    let loader_version = rest.strip_prefix(base_version)?.strip_prefix('-')?;
    if loader_version.is_empty() {
        None
    } else {
        Some(loader_version.to_string())
    }
}

/// Подменяет значение `--gameDir` в готовой команде, сохраняя остальные аргументы.
pub fn override_game_dir(command: &Command, game_dir: &Path) -> Command {
    let mut rebuilt = Command::new(command.get_program());
    let mut args = command.get_args().peekable();
    let mut replaced = false;

    while let Some(arg) = args.next() {
        rebuilt.arg(arg);
        if arg == "--gameDir" && args.peek().is_some() {
            args.next();
            rebuilt.arg(game_dir);
            replaced = true;
        }
    }

    if !replaced {
        rebuilt.arg("--gameDir").arg(game_dir);
    }
    if let Some(dir) = command.get_current_dir() {
        rebuilt.current_dir(dir);
    }
    for (key, value) in command.get_envs() {
        match value {
            Some(value) => rebuilt.env(key, value),
            None => rebuilt.env_remove(key),
        };
    }
    rebuilt
}

#[async_trait]
impl GameBackend for OpenLauncherBackend {
    async fn list_remote_versions(&self) -> Result<Vec<VersionEntry>> {
        self.catalog.fetch().await
    }

    async fn install_base_version(&self, version_id: &str, reporter: &ProgressReporter) -> Result<()> {
        reporter.set_max(3);
        reporter.set_progress(0);
        reporter.set_status(format!("Установка версии {}", version_id));

        let mut launcher = self.launcher(version_id, None, None).await;
        launcher.install_version().await?;

        reporter.set_progress(1);
        reporter.set_status(format!("Загрузка ресурсов {}", version_id));
        launcher.install_assets().await?;

        reporter.set_progress(2);
        reporter.set_status(format!("Загрузка библиотек {}", version_id));
        launcher.install_libraries().await?;

        reporter.set_progress(3);
        Ok(())
    }

    async fn install_loader(
        &self,
        loader: LoaderKind,
        base_version: &str,
        reporter: &ProgressReporter,
    ) -> Result<()> {
        reporter.set_max(3);
        reporter.set_progress(0);
        reporter.set_status(format!("Поиск {} для {}", loader, base_version));

        let loader_version = self.latest_loader_version(loader, base_version).await?;

        reporter.set_progress(1);
        reporter.set_status(format!("Установка {} {}", loader, loader_version));
        let mut launcher = self
            .launcher(base_version, Some(loader.name()), Some(loader_version))
            .await;
        launcher.install_version().await?;

        reporter.set_progress(2);
        reporter.set_status(format!("Загрузка библиотек {}", loader));
        launcher.install_libraries().await?;

        reporter.set_progress(3);
        Ok(())
    }

    async fn build_launch_command(&self, version_id: &str, options: &LaunchOptions) -> Result<Command> {
        let mut launcher = match options.loader {
            Some(loader) => {
                let loader_version = loader_version_from_build(version_id, &options.base_version, loader)
                    .ok_or_else(|| Error::Launch(format!("Не удалось разобрать сборку {}", version_id)))?;
                self.launcher(&options.base_version, Some(loader.name()), Some(loader_version))
                    .await
            }
            None => self.launcher(version_id, None, None).await,
        };

        if options.uuid.is_empty() {
            launcher.auth(auth::OfflineAuth::new(&options.username));
        } else {
            launcher.auth(auth::Auth::new(
                "mojang".to_string(),
                "{}".to_string(),
                options.username.clone(),
                options.uuid.clone(),
                options.token.clone(),
            ));
        }

        let command = launcher
            .command()
            .map_err(|e| Error::Launch(e.to_string()))?;

        Ok(match &options.game_directory {
            Some(dir) => override_game_dir(&command, dir),
            None => command,
        })
    }
}
