use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Version catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Version {version} is not installed and cannot be downloaded")]
    OfflineInstallUnavailable { version: String },

    #[error("Failed to install {loader} for {version}")]
    LoaderInstallFailed { loader: String, version: String },

    #[error("Another launch is already in progress")]
    LaunchInProgress,

    #[error("Account already exists: {0}")]
    AccountExists(String),

    #[error("Nickname must not be empty")]
    InvalidNickname,

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Launch error: {0}")]
    Launch(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Error {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Error::Backend(err.to_string())
    }
}
