use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub github_token: Option<String>,
    pub debounce_ms: u64,
    pub registry_url: Option<String>,
    pub listen_addr: String,
    pub store_path: PathBuf,
    pub index_path: PathBuf,
    pub log_level: String,
    pub log_file: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &self.github_token.as_ref().map(|_| "[REDACTED]"))
            .field("debounce_ms", &self.debounce_ms)
            .field("registry_url", &self.registry_url)
            .field("listen_addr", &self.listen_addr)
            .field("store_path", &self.store_path)
            .field("index_path", &self.index_path)
            .field("log_level", &self.log_level)
            .field("log_file", &self.log_file)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let app_dir = config_dir().join("hookgate");
        Self {
            github_token: None,
            debounce_ms: 400,
            registry_url: None,
            listen_addr: "127.0.0.1:8787".to_string(),
            store_path: app_dir.join("registry.toml"),
            index_path: app_dir.join("index.toml"),
            log_level: "info".to_string(),
            log_file: app_dir.join("hookgate.log"),
        }
    }
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Default)]
pub struct Overrides {
    pub debounce_ms: Option<u64>,
    pub registry_url: Option<String>,
    pub listen_addr: Option<String>,
    pub store_path: Option<PathBuf>,
}

impl Config {
    pub fn load(overrides: Overrides) -> Self {
        let config_file = config_dir().join("hookgate").join("config.toml");

        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if config_file.exists() {
            figment = figment.merge(Toml::file(&config_file));
        }

        figment = figment.merge(Env::prefixed("HOOKGATE_")).merge(
            Env::raw()
                .only(&["GITHUB_TOKEN"])
                .map(|_| "github_token".into()),
        );

        if let Some(ms) = overrides.debounce_ms {
            figment = figment.merge(Serialized::default("debounce_ms", ms));
        }
        if let Some(url) = overrides.registry_url {
            figment = figment.merge(Serialized::default("registry_url", url));
        }
        if let Some(addr) = overrides.listen_addr {
            figment = figment.merge(Serialized::default("listen_addr", addr));
        }
        if let Some(path) = overrides.store_path {
            figment = figment.merge(Serialized::default("store_path", path));
        }

        match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("warning: config parse error, using defaults: {e}");
                Config::default()
            }
        }
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref().filter(|t| !t.is_empty())
    }
}

pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}
