use crate::error::{ApiError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Database,
}

impl FromStr for StorageBackend {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "database" | "db" | "libsql" => Ok(StorageBackend::Database),
            other => Err(ApiError::Config(format!("Unknown storage backend '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// libSQL url: `libsql://...` for Turso, otherwise a local file path.
    pub url: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Load `config.toml` (or the given path) and apply environment overrides.
    ///
    /// A missing default file is fine; a missing explicit path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ApiError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay `SOCIAL_*` and `LIBSQL_*` variables looked up through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("SOCIAL_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| ApiError::Config(format!("Invalid SOCIAL_PORT '{port}': {e}")))?;
        }
        if let Some(backend) = lookup("SOCIAL_STORAGE") {
            self.storage.backend = backend.parse()?;
        }
        if let Some(url) = lookup("LIBSQL_URL") {
            self.storage.url = Some(url);
        }
        if let Some(token) = lookup("LIBSQL_AUTH_TOKEN") {
            self.storage.auth_token = Some(token);
        }
        if let Some(dir) = lookup("SOCIAL_LOG_DIR") {
            self.logging.directory = PathBuf::from(dir);
        }
        if let Some(enabled) = lookup("SOCIAL_METRICS") {
            self.metrics.enabled = enabled
                .parse()
                .map_err(|e| ApiError::Config(format!("Invalid SOCIAL_METRICS '{enabled}': {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_to_in_memory_on_8080() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn parses_partial_toml() {
        let config = Config::from_toml(
            r#"
            [storage]
            backend = "database"
            url = "file.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Database);
        assert_eq!(config.storage.url.as_deref(), Some("file.db"));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> = [("SOCIAL_PORT", "9000"), ("SOCIAL_STORAGE", "libsql")].into();
        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.backend, StorageBackend::Database);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        let err = config
            .apply_env(|key| (key == "SOCIAL_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert_eq!(err.code(), "INTERNAL");
        assert!("carrier-pigeon".parse::<StorageBackend>().is_err());
    }
}
