use ratatui::widgets::ListState;
use crate::accounts::AccountStore;
use crate::display::{self, DisplayEntry, SelectionKey};
use crate::launch::LaunchRequest;
use crate::preferences::{PreferenceStore, Preferences};
use crate::progress::{LaunchEvent, ProgressState};
use crate::utils::LauncherPaths;
use crate::version::{VersionEntry, VersionFilter, VersionInventory};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Accounts,
    Versions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    pub title: String,
    pub text: String,
}

pub struct App {
    pub should_quit: bool,
    pub focus: Focus,
    pub accounts: Vec<String>,
    pub selected_account: usize,
    pub account_input: Option<String>,
    pub filter: VersionFilter,
    pub offline: bool,
    pub loading_catalog: bool,
    pub entries: Vec<DisplayEntry>,
    pub versions_state: ListState,
    pub busy: bool,
    pub progress: ProgressState,
    pub dialog: Option<Dialog>,
    catalog: Option<Vec<VersionEntry>>,
    catalog_loaded_once: bool,
    pending_selection: Option<SelectionKey>,
    inventory: VersionInventory,
    preferences: PreferenceStore,
    account_store: AccountStore,
}

impl App {
    /// `default_nickname` предлагается, если список аккаунтов не читается.
    /// Пустой ник уходит в запуск как есть и заменяется там.
    pub fn new(paths: &LauncherPaths, default_nickname: &str) -> Self {
        let preferences = PreferenceStore::new(paths.config_file());
        let account_store = AccountStore::new(paths.users_file()).with_fallback(default_nickname);
        let saved = preferences.load();

        let mut app = Self {
            should_quit: false,
            focus: Focus::Versions,
            accounts: account_store.nicknames(),
            selected_account: 0,
            account_input: None,
            filter: saved.filter(),
            offline: false,
            loading_catalog: true,
            entries: Vec::new(),
            versions_state: ListState::default(),
            busy: false,
            progress: ProgressState::default(),
            dialog: None,
            catalog: None,
            catalog_loaded_once: false,
            pending_selection: display::parse_selection(&saved.selected_version),
            inventory: VersionInventory::new(paths.versions_dir()),
            preferences,
            account_store,
        };
        app.rebuild_entries();
        app
    }

    pub fn filter_enabled(&self) -> bool {
        !self.offline
    }

    /// Результат загрузки каталога. Ошибка ручного обновления после успешной загрузки показывается диалогом.
    pub fn apply_catalog(&mut self, result: Result<Vec<VersionEntry>>, manual: bool) {
        self.loading_catalog = false;
        match result {
            Ok(catalog) => {
                self.catalog = Some(catalog);
                self.offline = false;
                self.catalog_loaded_once = true;
            }
            Err(e) => {
                log::warn!("Каталог недоступен, офлайн-режим: {}", e);
                self.offline = true;
                if manual && self.catalog_loaded_once {
                    self.show_dialog("Ошибка", format!("Не удалось обновить список версий: {}", e));
                }
            }
        }
        self.rebuild_entries();
    }

    pub fn begin_refresh(&mut self) -> bool {
        if self.loading_catalog {
            return false;
        }
        self.loading_catalog = true;
        true
    }

    pub fn rebuild_entries(&mut self) {
        // Сохранённый выбор ждёт первого ответа каталога.
        let previous = self
            .pending_selection
            .clone()
            .or_else(|| self.selected_entry().map(DisplayEntry::key));

        self.entries = display::build(self.catalog.as_deref(), self.offline, self.filter, &self.inventory);

        if self.entries.is_empty() {
            self.versions_state.select(None);
        } else {
            let index = display::preserve_selection(&self.entries, previous.as_ref());
            self.versions_state.select(Some(index));
            if !self.loading_catalog {
                self.pending_selection = None;
            }
        }
    }

    pub fn selected_entry(&self) -> Option<&DisplayEntry> {
        self.versions_state.selected().and_then(|index| self.entries.get(index))
    }

    pub fn cycle_filter(&mut self) {
        if !self.filter_enabled() || self.busy {
            return;
        }
        self.filter = self.filter.next();
        self.rebuild_entries();
        self.save_preferences();
    }

    fn save_preferences(&self) {
        let selected = self.selected_entry().map(DisplayEntry::decorated).unwrap_or_default();
        self.preferences.save(&Preferences::new(self.filter, &selected));
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Accounts => Focus::Versions,
            Focus::Versions => Focus::Accounts,
        };
    }

    pub fn next(&mut self) {
        self.pending_selection = None;
        match self.focus {
            Focus::Accounts => {
                if self.selected_account + 1 < self.accounts.len() {
                    self.selected_account += 1;
                }
            }
            Focus::Versions => {
                if let Some(selected) = self.versions_state.selected() {
                    if selected + 1 < self.entries.len() {
                        self.versions_state.select(Some(selected + 1));
                    }
                }
            }
        }
    }

    pub fn previous(&mut self) {
        self.pending_selection = None;
        match self.focus {
            Focus::Accounts => {
                self.selected_account = self.selected_account.saturating_sub(1);
            }
            Focus::Versions => {
                if let Some(selected) = self.versions_state.selected() {
                    if selected > 0 {
                        self.versions_state.select(Some(selected - 1));
                    }
                }
            }
        }
    }

    pub fn current_nickname(&self) -> String {
        self.accounts
            .get(self.selected_account)
            .cloned()
            .unwrap_or_default()
    }

    pub fn begin_add_account(&mut self) {
        self.account_input = Some(String::new());
    }

    pub fn cancel_add_account(&mut self) {
        self.account_input = None;
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(input) = self.account_input.as_mut() {
            input.push(c);
        }
    }

    pub fn input_backspace(&mut self) {
        if let Some(input) = self.account_input.as_mut() {
            input.pop();
        }
    }

    pub fn confirm_add_account(&mut self) {
        let Some(input) = self.account_input.take() else {
            return;
        };

        match self.account_store.add(&input) {
            Ok(account) => {
                self.accounts = self.account_store.nicknames();
                if let Some(index) = self.accounts.iter().position(|name| *name == account.nickname) {
                    self.selected_account = index;
                }
            }
            Err(Error::AccountExists(_)) => {
                self.show_dialog("Ошибка", "Такой аккаунт уже существует.");
            }
            Err(Error::InvalidNickname) => {}
            Err(e) => self.show_dialog("Ошибка", e.to_string()),
        }
    }

    /// Запрос на запуск для выбранной строки; сохраняет выбор.
    pub fn play_request(&mut self) -> Option<LaunchRequest> {
        if self.busy {
            return None;
        }
        let entry = self.selected_entry()?.clone();
        self.save_preferences();

        Some(LaunchRequest {
            base_version: entry.base_version,
            loader: entry.loader,
            username: self.current_nickname(),
        })
    }

    pub fn handle_launch_event(&mut self, event: LaunchEvent) {
        match event {
            LaunchEvent::Progress { progress, max, status } => {
                self.progress = ProgressState { progress, max, status };
            }
            LaunchEvent::State(busy) => {
                self.busy = busy;
                if busy {
                    self.progress = ProgressState::default();
                } else {
                    self.rebuild_entries();
                }
            }
            LaunchEvent::Message { title, text } => self.show_dialog(title, text),
        }
    }

    pub fn show_dialog(&mut self, title: impl Into<String>, text: impl Into<String>) {
        self.dialog = Some(Dialog {
            title: title.into(),
            text: text.into(),
        });
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialog = None;
    }

    pub fn status_line(&self) -> String {
        if self.loading_catalog {
            "Загрузка списка версий...".to_string()
        } else if self.offline {
            "Офлайн: показаны установленные версии".to_string()
        } else {
            format!("Версий: {}", self.entries.len())
        }
    }
}
