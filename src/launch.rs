use std::fmt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use crate::backend::{GameBackend, LaunchOptions};
use crate::loader::{ensure_alias_manifest, resolve_loader_build, LoaderKind};
use crate::progress::{EventSender, ProgressReporter};
use crate::utils::LauncherPaths;
use crate::version::{VersionId, VersionInventory};
use crate::{Error, Result};

pub const PROFILE_SUBDIRS: [&str; 4] = ["mods", "config", "resourcepacks", "saves"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Idle,
    Resolving,
    InstallingBase,
    InstallingLoader,
    ComposingProfile,
    Launching,
    Error,
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LaunchState::Idle => "Ожидание",
            LaunchState::Resolving => "Поиск версии",
            LaunchState::InstallingBase => "Установка игры",
            LaunchState::InstallingLoader => "Установка загрузчика",
            LaunchState::ComposingProfile => "Подготовка профиля",
            LaunchState::Launching => "Запуск",
            LaunchState::Error => "Ошибка",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRequest {
    pub base_version: VersionId,
    pub loader: Option<LoaderKind>,
    pub username: String,
}

/// Флаг единственного запуска; снимается при уничтожении.
#[derive(Debug)]
pub struct LaunchGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for LaunchGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Ведёт запуск от выбранной строки списка до завершения процесса игры.
#[derive(Clone)]
pub struct LaunchOrchestrator {
    backend: Arc<dyn GameBackend>,
    paths: LauncherPaths,
    inventory: VersionInventory,
    default_nickname: String,
    busy: Arc<AtomicBool>,
    state: Arc<Mutex<LaunchState>>,
}

impl LaunchOrchestrator {
    pub fn new(backend: Arc<dyn GameBackend>, paths: LauncherPaths, default_nickname: impl Into<String>) -> Self {
        let inventory = VersionInventory::new(paths.versions_dir());
        Self {
            backend,
            paths,
            inventory,
            default_nickname: default_nickname.into(),
            busy: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(LaunchState::Idle)),
        }
    }

    pub fn state(&self) -> LaunchState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn try_begin(&self) -> Result<LaunchGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::LaunchInProgress)?;
        Ok(LaunchGuard {
            busy: Arc::clone(&self.busy),
        })
    }

    /// Запуск в фоновой задаче. Повторный запрос при активном запуске отклоняется сразу.
    pub fn spawn(&self, request: LaunchRequest, events: EventSender) -> Result<JoinHandle<Result<VersionId>>> {
        let guard = self.try_begin()?;
        let orchestrator = self.clone();
        let reporter = ProgressReporter::new(events.clone());
        let worker = tokio::spawn({
            let orchestrator = self.clone();
            async move { orchestrator.run(request, events).await }
        });

        // Паника внутри установщика не должна оставить UI в состоянии запуска.
        Ok(tokio::spawn(async move {
            let _guard = guard;
            match worker.await {
                Ok(result) => result,
                Err(e) => {
                    log::error!("Задача запуска прервана: {}", e);
                    let error = Error::Launch(format!("внутренняя ошибка запуска ({})", e));
                    orchestrator.set_state(LaunchState::Idle);
                    let (title, text) = user_message(&error);
                    reporter.message(title, text);
                    reporter.state_update(false);
                    Err(error)
                }
            }
        }))
    }

    pub async fn launch(&self, request: LaunchRequest, events: EventSender) -> Result<VersionId> {
        let _guard = self.try_begin()?;
        self.run(request, events).await
    }

    async fn run(&self, request: LaunchRequest, events: EventSender) -> Result<VersionId> {
        let reporter = ProgressReporter::new(events);
        reporter.state_update(true);

        let result = self.execute(&request, &reporter).await;
        if let Err(e) = &result {
            log::error!("Запуск {:?} не удался: {}", request, e);
            self.set_state(LaunchState::Error);
            let (title, text) = user_message(e);
            reporter.message(title, text);
        }

        self.set_state(LaunchState::Idle);
        reporter.state_update(false);
        result
    }

    async fn execute(&self, request: &LaunchRequest, reporter: &ProgressReporter) -> Result<VersionId> {
        let base_version = request.base_version.trim();
        if base_version.is_empty() {
            return Err(Error::Launch("не выбрана версия".to_string()));
        }

        let username = match request.username.trim() {
            "" => self.default_nickname.clone(),
            name => name.to_string(),
        };

        self.set_state(LaunchState::Resolving);
        let (version_id, game_directory) = match request.loader {
            None => (self.prepare_vanilla(base_version, reporter).await?, None),
            Some(loader) => {
                let version_id = self.prepare_modded(base_version, loader, reporter).await?;
                (version_id, self.compose_profile(base_version, loader))
            }
        };

        self.set_state(LaunchState::Launching);
        reporter.set_status(format!("Запуск {}", version_id));

        let options = LaunchOptions {
            username,
            uuid: String::new(),
            token: String::new(),
            game_directory,
            base_version: base_version.to_string(),
            loader: request.loader,
        };
        let command = self.backend.build_launch_command(&version_id, &options).await?;

        log::info!("Запуск Minecraft: {:?}", command);
        let exit = run_game(command).await?;
        log::info!("Игра {} завершилась: {} (строк вывода: {})", version_id, exit.status, exit.lines);

        Ok(version_id)
    }

    async fn prepare_vanilla(&self, base_version: &str, reporter: &ProgressReporter) -> Result<VersionId> {
        if self.inventory.is_installed(base_version) {
            return Ok(base_version.to_string());
        }

        self.set_state(LaunchState::InstallingBase);
        let unavailable = || Error::OfflineInstallUnavailable {
            version: base_version.to_string(),
        };

        if let Err(e) = self.backend.install_base_version(base_version, reporter).await {
            log::error!("Установка {} не удалась: {}", base_version, e);
            return Err(unavailable());
        }
        if !self.inventory.is_installed(base_version) {
            return Err(unavailable());
        }
        Ok(base_version.to_string())
    }

    async fn prepare_modded(
        &self,
        base_version: &str,
        loader: LoaderKind,
        reporter: &ProgressReporter,
    ) -> Result<VersionId> {
        let resolved = match self.resolve_loader_build(base_version, loader) {
            Some(resolved) => resolved,
            None => {
                if !self.inventory.is_installed(base_version) {
                    self.set_state(LaunchState::InstallingBase);
                    if let Err(e) = self.backend.install_base_version(base_version, reporter).await {
                        log::warn!("Установка {} не удалась: {}", base_version, e);
                    }
                }

                // Ошибка установщика не окончательна: сборка могла появиться частично или раньше
                self.set_state(LaunchState::InstallingLoader);
                if let Err(e) = self.backend.install_loader(loader, base_version, reporter).await {
                    log::warn!("Установка {} для {} не удалась: {}", loader, base_version, e);
                }

                self.resolve_loader_build(base_version, loader)
                    .ok_or_else(|| Error::LoaderInstallFailed {
                        loader: loader.name().to_string(),
                        version: base_version.to_string(),
                    })?
            }
        };

        if let Err(e) = ensure_alias_manifest(&self.inventory, base_version, loader, &resolved) {
            log::warn!("Не удалось записать псевдоним для {}: {}", resolved, e);
        }
        Ok(resolved)
    }

    /// Всегда возвращает настоящую сборку загрузчика, псевдонимы разыменовываются.
    fn resolve_loader_build(&self, base_version: &str, loader: LoaderKind) -> Option<VersionId> {
        let installed = self.inventory.list_installed();
        resolve_loader_build(&self.inventory, &installed, base_version, loader)
    }

    /// Ошибки создания каталогов не прерывают запуск.
    fn compose_profile(&self, base_version: &str, loader: LoaderKind) -> Option<PathBuf> {
        self.set_state(LaunchState::ComposingProfile);
        let profile_dir = self.paths.profile_dir(base_version, loader.name());

        for subdir in PROFILE_SUBDIRS {
            if let Err(e) = std::fs::create_dir_all(profile_dir.join(subdir)) {
                log::warn!("Не удалось создать {:?}: {}", profile_dir.join(subdir), e);
            }
        }

        if profile_dir.is_dir() {
            Some(profile_dir)
        } else {
            None
        }
    }

    fn set_state(&self, state: LaunchState) {
        let mut current = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *current != state {
            log::info!("Состояние запуска: {} -> {}", *current, state);
            *current = state;
        }
    }
}

pub struct GameExit {
    pub status: ExitStatus,
    pub lines: usize,
}

/// Запускает процесс игры с перехваченным выводом: терминал занят интерфейсом,
/// поэтому строки stdout и stderr уходят в лог.
pub async fn run_game(command: std::process::Command) -> Result<GameExit> {
    let mut cmd = tokio::process::Command::from(command);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| Error::Launch(e.to_string()))?;

    let stdout = child.stdout.take().map(|stdout| tokio::spawn(forward_lines(stdout, false)));
    let stderr = child.stderr.take().map(|stderr| tokio::spawn(forward_lines(stderr, true)));

    let status = child.wait().await.map_err(|e| Error::Launch(e.to_string()))?;

    let mut lines = 0;
    for reader in [stdout, stderr].into_iter().flatten() {
        lines += reader.await.unwrap_or(0);
    }
    Ok(GameExit { status, lines })
}

async fn forward_lines<R: AsyncRead + Unpin>(reader: R, is_stderr: bool) -> usize {
    let mut lines = BufReader::new(reader).lines();
    let mut count = 0;
    while let Ok(Some(line)) = lines.next_line().await {
        if is_stderr {
            log::warn!("[Minecraft] {}", line);
        } else {
            log::info!("[Minecraft] {}", line);
        }
        count += 1;
    }
    count
}

pub fn user_message(error: &Error) -> (String, String) {
    let text = match error {
        Error::OfflineInstallUnavailable { version } => format!(
            "Версия {} не установлена и не может быть загружена. Проверьте подключение к интернету.",
            version
        ),
        Error::LoaderInstallFailed { loader, version } => {
            format!("Не удалось установить {} для версии {}.", loader, version)
        }
        other => format!("Не удалось запустить игру: {}", other),
    };
    ("Ошибка".to_string(), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockGameBackend;
    use crate::progress::{channel, EventReceiver, LaunchEvent};
    use crate::utils::scratch_dir;
    use std::path::Path;
    use std::process::Command;

    fn install(root: &Path, id: &str) {
        let dir = root.join("versions").join(id);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{}.json", id)), "{}").unwrap();
    }

    fn orchestrator(root: &Path, backend: MockGameBackend) -> LaunchOrchestrator {
        LaunchOrchestrator::new(Arc::new(backend), LauncherPaths::new(root), "Player")
    }

    fn request(base: &str, loader: Option<LoaderKind>, username: &str) -> LaunchRequest {
        LaunchRequest {
            base_version: base.to_string(),
            loader,
            username: username.to_string(),
        }
    }

    fn drain(receiver: &mut EventReceiver) -> Vec<LaunchEvent> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }

    fn messages(events: &[LaunchEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                LaunchEvent::Message { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[cfg(unix)]
    #[test]
    fn test_installed_vanilla_launches_without_install() {
        let root = scratch_dir();
        install(&root, "1.20.1");

        let mut backend = MockGameBackend::new();
        backend.expect_install_base_version().never();
        backend.expect_install_loader().never();
        backend
            .expect_build_launch_command()
            .withf(|id, options| {
                id == "1.20.1"
                    && options.username == "Steve"
                    && options.game_directory.is_none()
                    && options.uuid.is_empty()
            })
            .times(1)
            .returning(|_, _| Ok(Command::new("true")));

        let launcher = orchestrator(&root, backend);
        let (sender, mut receiver) = channel();
        let result = tokio_test::block_on(launcher.launch(request("1.20.1", None, "Steve"), sender));

        assert_eq!(result.unwrap(), "1.20.1");
        let events = drain(&mut receiver);
        assert_eq!(events.first(), Some(&LaunchEvent::State(true)));
        assert_eq!(events.last(), Some(&LaunchEvent::State(false)));
        assert!(messages(&events).is_empty());
        assert_eq!(launcher.state(), LaunchState::Idle);
        assert!(!launcher.is_busy());
    }

    #[test]
    fn test_missing_vanilla_offline_is_fatal() {
        let root = scratch_dir();

        let mut backend = MockGameBackend::new();
        backend
            .expect_install_base_version()
            .times(1)
            .returning(|_, _| Err(Error::Backend("offline".to_string())));
        backend.expect_build_launch_command().never();

        let launcher = orchestrator(&root, backend);
        let (sender, mut receiver) = channel();
        let result = tokio_test::block_on(launcher.launch(request("1.21.8", None, "Steve"), sender));

        assert!(matches!(result, Err(Error::OfflineInstallUnavailable { ref version }) if version == "1.21.8"));
        let events = drain(&mut receiver);
        assert_eq!(messages(&events).len(), 1);
        assert!(messages(&events)[0].contains("1.21.8"));
        assert_eq!(events.last(), Some(&LaunchEvent::State(false)));
        assert_eq!(launcher.state(), LaunchState::Idle);
    }

    #[test]
    fn test_install_reporting_success_without_manifest_is_fatal() {
        let root = scratch_dir();

        let mut backend = MockGameBackend::new();
        backend.expect_install_base_version().returning(|_, _| Ok(()));
        backend.expect_build_launch_command().never();

        let launcher = orchestrator(&root, backend);
        let (sender, _receiver) = channel();
        let result = tokio_test::block_on(launcher.launch(request("1.21.8", None, ""), sender));
        assert!(matches!(result, Err(Error::OfflineInstallUnavailable { .. })));
    }

    #[test]
    fn test_install_progress_is_forwarded() {
        let root = scratch_dir();
        let versions = root.join("versions");

        let mut backend = MockGameBackend::new();
        backend.expect_install_base_version().returning(move |id, reporter| {
            reporter.set_max(2);
            reporter.set_progress(2);
            let dir = versions.join(id);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(format!("{}.json", id)), "{}").unwrap();
            Ok(())
        });
        backend
            .expect_build_launch_command()
            .returning(|_, _| Err(Error::Launch("no java".to_string())));

        let launcher = orchestrator(&root, backend);
        let (sender, mut receiver) = channel();
        let result = tokio_test::block_on(launcher.launch(request("1.21.8", None, "Steve"), sender));
        assert!(matches!(result, Err(Error::Launch(_))));

        let events = drain(&mut receiver);
        assert!(events.contains(&LaunchEvent::Progress { progress: 0, max: 2, status: String::new() }));
        assert!(events.contains(&LaunchEvent::Progress { progress: 2, max: 2, status: String::new() }));
        assert_eq!(messages(&events).len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_loader_failure_recovered_by_existing_build() {
        let root = scratch_dir();
        let versions = root.join("versions");
        let profile_dir = root.join("profiles").join("1.21.8-fabric");

        let mut backend = MockGameBackend::new();
        backend
            .expect_install_base_version()
            .withf(|id, _| id == "1.21.8")
            .times(1)
            .returning(|_, _| Ok(()));
        backend
            .expect_install_loader()
            .withf(|loader, base, _| *loader == LoaderKind::Fabric && base == "1.21.8")
            .times(1)
            .returning(move |_, _, _| {
                let id = "fabric-loader-1.21.8-0.15.0";
                let dir = versions.join(id);
                std::fs::create_dir_all(&dir).unwrap();
                std::fs::write(dir.join(format!("{}.json", id)), "{}").unwrap();
                Err(Error::Backend("libraries failed".to_string()))
            });
        let expected_dir = profile_dir.clone();
        backend
            .expect_build_launch_command()
            .withf(move |id, options| {
                id == "fabric-loader-1.21.8-0.15.0"
                    && options.loader == Some(LoaderKind::Fabric)
                    && options.base_version == "1.21.8"
                    && options.game_directory.as_deref() == Some(expected_dir.as_path())
            })
            .times(1)
            .returning(|_, _| Ok(Command::new("true")));

        let launcher = orchestrator(&root, backend);
        let (sender, mut receiver) = channel();
        let result = tokio_test::block_on(
            launcher.launch(request("1.21.8", Some(LoaderKind::Fabric), "Steve"), sender),
        );

        assert_eq!(result.unwrap(), "fabric-loader-1.21.8-0.15.0");
        for subdir in PROFILE_SUBDIRS {
            assert!(profile_dir.join(subdir).is_dir(), "{} missing", subdir);
        }
        let inventory = VersionInventory::new(root.join("versions"));
        assert!(inventory.is_installed("1.21.8 fabric"));
        assert!(messages(&drain(&mut receiver)).is_empty());
    }

    #[test]
    fn test_loader_failure_without_build_is_fatal() {
        let root = scratch_dir();
        install(&root, "1.21.8");

        let mut backend = MockGameBackend::new();
        backend.expect_install_base_version().never();
        backend
            .expect_install_loader()
            .times(1)
            .returning(|_, _, _| Err(Error::Backend("meta unreachable".to_string())));
        backend.expect_build_launch_command().never();

        let launcher = orchestrator(&root, backend);
        let (sender, mut receiver) = channel();
        let result = tokio_test::block_on(
            launcher.launch(request("1.21.8", Some(LoaderKind::Fabric), "Steve"), sender),
        );

        assert!(matches!(result, Err(Error::LoaderInstallFailed { .. })));
        let texts = messages(&drain(&mut receiver));
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("fabric") && texts[0].contains("1.21.8"));
        assert!(!root.join("profiles").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_alias_is_dereferenced_before_launch() {
        let root = scratch_dir();
        install(&root, "1.20.1");
        install(&root, "fabric-loader-custom");
        let inventory = VersionInventory::new(root.join("versions"));
        ensure_alias_manifest(&inventory, "1.20.1", LoaderKind::Fabric, "fabric-loader-custom").unwrap();

        let mut backend = MockGameBackend::new();
        backend.expect_install_base_version().never();
        backend.expect_install_loader().never();
        backend
            .expect_build_launch_command()
            .withf(|id, _| id == "fabric-loader-custom")
            .times(1)
            .returning(|_, _| Ok(Command::new("true")));

        let launcher = orchestrator(&root, backend);
        let (sender, _receiver) = channel();
        let result = tokio_test::block_on(
            launcher.launch(request("1.20.1", Some(LoaderKind::Fabric), "Steve"), sender),
        );
        assert_eq!(result.unwrap(), "fabric-loader-custom");
    }

    #[test]
    fn test_dangling_alias_triggers_install() {
        let root = scratch_dir();
        install(&root, "1.20.1");
        let inventory = VersionInventory::new(root.join("versions"));
        ensure_alias_manifest(&inventory, "1.20.1", LoaderKind::Fabric, "fabric-loader-1.20.1-0.15.0").unwrap();

        let mut backend = MockGameBackend::new();
        backend
            .expect_install_loader()
            .times(1)
            .returning(|_, _, _| Err(Error::Backend("offline".to_string())));
        backend.expect_build_launch_command().never();

        let launcher = orchestrator(&root, backend);
        let (sender, _receiver) = channel();
        let result = tokio_test::block_on(
            launcher.launch(request("1.20.1", Some(LoaderKind::Fabric), "Steve"), sender),
        );
        assert!(matches!(result, Err(Error::LoaderInstallFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_nickname_falls_back_to_default() {
        let root = scratch_dir();
        install(&root, "1.20.1");

        let mut backend = MockGameBackend::new();
        backend
            .expect_build_launch_command()
            .withf(|_, options| options.username == "Гость")
            .times(1)
            .returning(|_, _| Ok(Command::new("true")));

        let launcher = LaunchOrchestrator::new(Arc::new(backend), LauncherPaths::new(&root), "Гость");
        let (sender, _receiver) = channel();
        assert!(tokio_test::block_on(launcher.launch(request("1.20.1", None, "  "), sender)).is_ok());
    }

    struct PanickingBackend;

    #[async_trait::async_trait]
    impl GameBackend for PanickingBackend {
        async fn list_remote_versions(&self) -> Result<Vec<crate::version::VersionEntry>> {
            Ok(Vec::new())
        }

        async fn install_base_version(&self, _version_id: &str, _reporter: &ProgressReporter) -> Result<()> {
            panic!("truncated version manifest");
        }

        async fn install_loader(&self, _loader: LoaderKind, _base: &str, _reporter: &ProgressReporter) -> Result<()> {
            panic!("truncated loader manifest");
        }

        async fn build_launch_command(&self, _version_id: &str, _options: &LaunchOptions) -> Result<Command> {
            Err(Error::Launch("unreachable".to_string()))
        }
    }

    #[test]
    fn test_backend_panic_returns_ui_to_ready() {
        let root = scratch_dir();
        let launcher = LaunchOrchestrator::new(Arc::new(PanickingBackend), LauncherPaths::new(&root), "Player");
        let (sender, mut receiver) = channel();

        let result = tokio_test::block_on(async {
            let handle = launcher.spawn(request("1.21.8", None, "Steve"), sender).unwrap();
            handle.await.unwrap()
        });

        assert!(matches!(result, Err(Error::Launch(_))));
        let events = drain(&mut receiver);
        assert_eq!(events.first(), Some(&LaunchEvent::State(true)));
        assert_eq!(events.last(), Some(&LaunchEvent::State(false)));
        assert_eq!(messages(&events).len(), 1);
        assert!(!launcher.is_busy());
        assert_eq!(launcher.state(), LaunchState::Idle);
        assert!(launcher.try_begin().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_game_output_is_captured() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo one; echo two >&2; echo three"]);

        let exit = tokio_test::block_on(run_game(command)).unwrap();
        assert!(exit.status.success());
        assert_eq!(exit.lines, 3);
    }

    #[test]
    fn test_forward_lines_counts_every_line() {
        let output: &[u8] = b"[main/INFO]: Setting user: Steve\n[main/WARN]: no sound\n";
        assert_eq!(tokio_test::block_on(forward_lines(output, false)), 2);
        assert_eq!(tokio_test::block_on(forward_lines(&b""[..], true)), 0);
    }

    #[test]
    fn test_second_launch_rejected_while_busy() {
        let root = scratch_dir();
        let mut backend = MockGameBackend::new();
        backend.expect_build_launch_command().never();
        backend.expect_install_base_version().never();

        let launcher = orchestrator(&root, backend);
        let guard = launcher.try_begin().unwrap();
        assert!(launcher.is_busy());
        assert!(matches!(launcher.try_begin(), Err(Error::LaunchInProgress)));

        let (sender, mut receiver) = channel();
        let result = tokio_test::block_on(launcher.launch(request("1.20.1", None, "Steve"), sender));
        assert!(matches!(result, Err(Error::LaunchInProgress)));
        assert!(drain(&mut receiver).is_empty());

        drop(guard);
        assert!(!launcher.is_busy());
        assert!(launcher.try_begin().is_ok());
    }

    #[test]
    fn test_empty_version_is_rejected() {
        let root = scratch_dir();
        let launcher = orchestrator(&root, MockGameBackend::new());
        let (sender, mut receiver) = channel();
        let result = tokio_test::block_on(launcher.launch(request(" ", None, "Steve"), sender));
        assert!(matches!(result, Err(Error::Launch(_))));
        assert_eq!(messages(&drain(&mut receiver)).len(), 1);
    }
}
