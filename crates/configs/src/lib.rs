use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Where the JSON document and its backup live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Defaults to `<data_file>.backup` when omitted.
    #[serde(default)]
    pub backup_file: Option<PathBuf>,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_file: default_data_file(), backup_file: None, pretty: default_pretty() }
    }
}

/// The application runs without authentication; every request acts as this
/// user unless an `X-User-Id` header says otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_mock_user_id")]
    pub mock_user_id: String,
    #[serde(default = "default_mock_user_name")]
    pub mock_user_name: String,
    #[serde(default = "default_mock_user_email")]
    pub mock_user_email: String,
    #[serde(default = "default_popular_limit")]
    pub popular_hashtags_limit: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            mock_user_id: default_mock_user_id(),
            mock_user_name: default_mock_user_name(),
            mock_user_email: default_mock_user_email(),
            popular_hashtags_limit: default_popular_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { format: default_log_format() } }
}

fn default_data_file() -> PathBuf { PathBuf::from("data/bailanysta.json") }
fn default_pretty() -> bool { true }
fn default_mock_user_id() -> String { "mock-user-1".into() }
fn default_mock_user_name() -> String { "Demo User".into() }
fn default_mock_user_email() -> String { "demo@bailanysta.local".into() }
fn default_popular_limit() -> usize { 10 }
fn default_log_format() -> String { "compact".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the
    /// file is absent, then apply env overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.apply_env_overrides();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Ok(path) = std::env::var("DATA_FILE") {
            self.storage.data_file = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("BACKUP_FILE") {
            self.storage.backup_file = Some(PathBuf::from(path));
        }
        if let Ok(id) = std::env::var("MOCK_USER_ID") {
            self.app.mock_user_id = id;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        self.app.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    /// Backup path: explicit setting, else a sibling `<data_file>.backup`.
    pub fn backup_path(&self) -> PathBuf {
        if let Some(p) = &self.backup_file {
            return p.clone();
        }
        let mut name = self.data_file.clone().into_os_string();
        name.push(".backup");
        PathBuf::from(name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(anyhow!("storage.data_file is empty"));
        }
        if self.backup_path() == self.data_file {
            return Err(anyhow!("storage.backup_file must differ from storage.data_file"));
        }
        Ok(())
    }
}

impl AppSettings {
    pub fn validate(&self) -> Result<()> {
        if self.mock_user_id.trim().is_empty() {
            return Err(anyhow!("app.mock_user_id is empty"));
        }
        if self.popular_hashtags_limit == 0 {
            return Err(anyhow!("app.popular_hashtags_limit must be >= 1"));
        }
        Ok(())
    }
}
