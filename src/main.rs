use std::fs::File;
use std::sync::Arc;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use env_logger::{Env, Target};
use ratatui::{
    prelude::*,
    Terminal,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use mjn_launcher::app::App;
use mjn_launcher::backend::{GameBackend, OpenLauncherBackend};
use mjn_launcher::launch::{user_message, LaunchOrchestrator};
use mjn_launcher::progress::{self, EventReceiver, EventSender};
use mjn_launcher::settings::SettingsManager;
use mjn_launcher::utils::{ensure_dir_exists, LauncherPaths};
use mjn_launcher::version::VersionEntry;

struct CatalogUpdate {
    result: mjn_launcher::Result<Vec<VersionEntry>>,
    manual: bool,
}

struct Runtime {
    backend: Arc<dyn GameBackend>,
    orchestrator: LaunchOrchestrator,
    catalog_tx: UnboundedSender<CatalogUpdate>,
    catalog_rx: UnboundedReceiver<CatalogUpdate>,
    events_tx: EventSender,
    events_rx: EventReceiver,
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings_manager = SettingsManager::new(SettingsManager::default_path())?;
    let settings = settings_manager.get().clone();
    let paths = LauncherPaths::new(settings.game_directory.clone());

    init_logging(&paths, &settings.log_level);
    log::info!("Запуск лаунчера, каталог игры {:?}", paths.root());

    for dir in [paths.versions_dir(), paths.profiles_dir(), paths.client_dir()] {
        ensure_dir_exists(&dir)?;
    }

    let backend: Arc<dyn GameBackend> = Arc::new(OpenLauncherBackend::new(settings.clone())?);
    let orchestrator = LaunchOrchestrator::new(Arc::clone(&backend), paths.clone(), settings.default_nickname.clone());
    let (catalog_tx, catalog_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = progress::channel();
    let mut runtime = Runtime {
        backend,
        orchestrator,
        catalog_tx,
        catalog_rx,
        events_tx,
        events_rx,
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(&paths, &settings.default_nickname);
    spawn_catalog_fetch(&runtime, false);
    let res = run_app(&mut terminal, app, &mut runtime);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("Лаунчер завершился с ошибкой: {:?}", err);
        println!("{err:?}");
    }

    Ok(())
}

/// Лог пишется в `logs/launcher.log`, при ошибке в stderr.
fn init_logging(paths: &LauncherPaths, level: &str) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(level));

    let log_file = ensure_dir_exists(&paths.logs_dir())
        .and_then(|_| Ok(File::create(paths.logs_dir().join("launcher.log"))?));
    match log_file {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(file)));
        }
        Err(e) => {
            eprintln!("Не удалось открыть файл лога: {}", e);
            builder.target(Target::Stderr);
        }
    }

    let _ = builder.try_init();
}

fn spawn_catalog_fetch(runtime: &Runtime, manual: bool) {
    let backend = Arc::clone(&runtime.backend);
    let tx = runtime.catalog_tx.clone();
    tokio::spawn(async move {
        let result = backend.list_remote_versions().await;
        let _ = tx.send(CatalogUpdate { result, manual });
    });
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App, runtime: &mut Runtime) -> Result<()> {
    loop {
        terminal.draw(|f| mjn_launcher::ui::draw(f, &mut app))?;
        handle_events(&mut app, runtime)?;
        if app.should_quit {
            break;
        }
        drain_updates(&mut app, runtime);
    }
    Ok(())
}

fn drain_updates(app: &mut App, runtime: &mut Runtime) {
    while let Ok(update) = runtime.catalog_rx.try_recv() {
        app.apply_catalog(update.result, update.manual);
    }
    while let Ok(event) = runtime.events_rx.try_recv() {
        app.handle_launch_event(event);
    }
}

fn handle_events(app: &mut App, runtime: &Runtime) -> Result<()> {
    if event::poll(std::time::Duration::from_millis(100))? {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            if app.account_input.is_some() {
                handle_account_input(app, key.code);
                return Ok(());
            }

            if app.dialog.is_some() {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                    app.dismiss_dialog();
                }
                return Ok(());
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
                KeyCode::Char('j') | KeyCode::Down => app.next(),
                KeyCode::Char('k') | KeyCode::Up => app.previous(),
                KeyCode::Tab => app.toggle_focus(),
                KeyCode::Char('f') => app.cycle_filter(),
                KeyCode::Char('a') => app.begin_add_account(),
                KeyCode::Char('r') => {
                    if app.begin_refresh() {
                        spawn_catalog_fetch(runtime, true);
                    }
                }
                KeyCode::Enter => handle_play(app, runtime),
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_account_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Enter => app.confirm_add_account(),
        KeyCode::Esc => app.cancel_add_account(),
        KeyCode::Backspace => app.input_backspace(),
        KeyCode::Char(c) => app.input_char(c),
        _ => {}
    }
}

fn handle_play(app: &mut App, runtime: &Runtime) {
    let Some(request) = app.play_request() else {
        return;
    };

    log::info!("Запрос запуска: {:?}", request);
    if let Err(e) = runtime.orchestrator.spawn(request, runtime.events_tx.clone()) {
        let (title, text) = user_message(&e);
        app.show_dialog(title, text);
    }
}
