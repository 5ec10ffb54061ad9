pub mod accounts;
pub mod app;
pub mod backend;
pub mod catalog;
pub mod display;
pub mod error;
pub mod launch;
pub mod loader;
pub mod preferences;
pub mod progress;
pub mod settings;
pub mod ui;
pub mod utils;
pub mod version;

pub use app::Focus;
pub use error::{Error, Result};
