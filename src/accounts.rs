use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::utils::write_json_atomic;
use crate::{Error, Result};

pub const FALLBACK_NICKNAME: &str = "Player";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default = "unknown_nickname")]
    pub nickname: String,
}

fn unknown_nickname() -> String {
    "Unknown".to_string()
}

/// `client/users.json`: упорядоченный список ников, только добавление.
#[derive(Debug, Clone)]
pub struct AccountStore {
    path: PathBuf,
    fallback: String,
}

impl AccountStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            fallback: FALLBACK_NICKNAME.to_string(),
        }
    }

    /// Ник, который предлагается, когда файл аккаунтов не читается.
    pub fn with_fallback(mut self, nickname: impl Into<String>) -> Self {
        let nickname = nickname.into();
        if !nickname.trim().is_empty() {
            self.fallback = nickname;
        }
        self
    }

    fn try_load(&self) -> Result<Vec<Account>> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load(&self) -> Vec<Account> {
        self.try_load().unwrap_or_else(|e| {
            log::debug!("Аккаунты {:?} не прочитаны: {}", self.path, e);
            Vec::new()
        })
    }

    /// Ники для выбора; если файл не читается, остаётся запасной.
    pub fn nicknames(&self) -> Vec<String> {
        match self.try_load() {
            Ok(accounts) => accounts.into_iter().map(|account| account.nickname).collect(),
            Err(_) => vec![self.fallback.clone()],
        }
    }

    pub fn add(&self, nickname: &str) -> Result<Account> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(Error::InvalidNickname);
        }

        let mut accounts = self.load();
        if accounts.iter().any(|account| account.nickname == nickname) {
            return Err(Error::AccountExists(nickname.to_string()));
        }

        let account = Account {
            nickname: nickname.to_string(),
        };
        accounts.push(account.clone());

        if let Err(e) = write_json_atomic(&self.path, &accounts) {
            log::warn!("Не удалось сохранить аккаунты {:?}: {}", self.path, e);
        } else {
            log::info!("Добавлен аккаунт {}", account.nickname);
        }
        Ok(account)
    }
}
