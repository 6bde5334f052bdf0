use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookgateError {
    #[error("github error: {0}")]
    GitHub(String),

    #[error("repository not found: {0}")]
    NotFound(String),

    #[error("repository already registered: {0}")]
    Conflict(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("index error: {0}")]
    Index(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("registry request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, HookgateError>;
