use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Сообщения фоновой задачи запуска для UI.
#[derive(Debug, Clone, PartialEq)]
pub enum LaunchEvent {
    /// Абсолютные значения, каждое событие заменяет предыдущее.
    Progress { progress: u64, max: u64, status: String },
    State(bool),
    Message { title: String, text: String },
}

pub type EventSender = UnboundedSender<LaunchEvent>;
pub type EventReceiver = UnboundedReceiver<LaunchEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressState {
    pub progress: u64,
    pub max: u64,
    pub status: String,
}

impl ProgressState {
    pub fn get_progress_percentage(&self) -> u16 {
        if self.max == 0 {
            0
        } else {
            ((self.progress.min(self.max) as f64 / self.max as f64) * 100.0) as u16
        }
    }
}

/// Колбэки установщика: хранит накопленное состояние и пересылает его целиком.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    sender: EventSender,
    state: Arc<Mutex<ProgressState>>,
}

impl ProgressReporter {
    pub fn new(sender: EventSender) -> Self {
        Self {
            sender,
            state: Arc::new(Mutex::new(ProgressState::default())),
        }
    }

    pub fn set_status(&self, status: impl Into<String>) {
        let status = status.into();
        self.update(|state| state.status = status);
    }

    pub fn set_progress(&self, progress: u64) {
        self.update(|state| state.progress = progress);
    }

    pub fn set_max(&self, max: u64) {
        self.update(|state| state.max = max);
    }

    pub fn snapshot(&self) -> ProgressState {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn state_update(&self, busy: bool) {
        self.send(LaunchEvent::State(busy));
    }

    pub fn message(&self, title: impl Into<String>, text: impl Into<String>) {
        self.send(LaunchEvent::Message {
            title: title.into(),
            text: text.into(),
        });
    }

    fn update(&self, apply: impl FnOnce(&mut ProgressState)) {
        let snapshot = {
            let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            apply(&mut state);
            state.clone()
        };
        log::debug!("Прогресс: {}/{} {}", snapshot.progress, snapshot.max, snapshot.status);
        self.send(LaunchEvent::Progress {
            progress: snapshot.progress,
            max: snapshot.max,
            status: snapshot.status,
        });
    }

    fn send(&self, event: LaunchEvent) {
        // UI мог уже закрыться
        let _ = self.sender.send(event);
    }
}
