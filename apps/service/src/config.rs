use std::time::Duration;
use std::{env, fmt, fs, path};

use apisync::PollingConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file")]
    ReadFailed,
    #[error("failed to write config file")]
    WriteFailed,
    #[error("failed to parse config file")]
    ParseFailed,
    #[error("no usable config directory (set XDG_CONFIG_HOME or HOME)")]
    ConfigPathUnavailable,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub api: Api,
    pub polling: Polling,
    pub database: Database,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Api {
    pub url: String,
    pub key: Option<String>,
    pub endpoints: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Polling {
    pub interval_ms: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Database {
    pub path: String,
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/syncbeat/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("syncbeat/config.toml"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: Api {
                url: "http://localhost:8787/api".into(),
                key: None,
                endpoints: vec!["/players".into(), "/games".into()],
            },
            polling: Polling {
                interval_ms: 60_000,
                retry_attempts: apisync::DEFAULT_RETRY_ATTEMPTS,
                retry_delay_ms: apisync::DEFAULT_RETRY_DELAY_MS,
                request_timeout_ms: 30_000,
            },
            database: Database { path: "syncbeat.db".into() },
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Api")?;
        write_1(f, "Url", &self.api.url)?;
        write_1(f, "Key", &if self.api.key.is_some() { "set" } else { "unset" })?;
        write_1(f, "Endpoints", &self.api.endpoints.join(", "))?;
        write_title_1(f, "Polling")?;
        write_1(f, "Interval (ms)", &self.polling.interval_ms)?;
        write_1(f, "Retry Attempts", &self.polling.retry_attempts)?;
        write_1(f, "Retry Delay (ms)", &self.polling.retry_delay_ms)?;
        write_1(f, "Request Timeout (ms)", &self.polling.request_timeout_ms)?;
        write_title_1(f, "Database")?;
        write_1(f, "Path", &self.database.path)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/syncbeat/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string =
                fs::read_to_string(&config_path).map_err(|_err| Error::ReadFailed)?;
            toml::from_str(raw_string.as_str()).map_err(|_err| Error::ParseFailed)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &std::path::Path) -> Result<(), Error> {
        let config_str: String =
            toml::to_string_pretty(self).map_err(|_err| Error::ParseFailed)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|_err| Error::WriteFailed)?;
        }

        std::fs::write(path, config_str).map_err(|_err| Error::WriteFailed)
    }

    /// Apply SYNCBEAT_* environment overrides on top of the file config
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("SYNCBEAT_API_URL") {
            self.api.url = url;
        }
        if let Ok(key) = env::var("SYNCBEAT_API_KEY") {
            self.api.key = Some(key);
        }
        if let Ok(path) = env::var("SYNCBEAT_DB_PATH") {
            self.database.path = path;
        }
    }

    /// Build and validate the core polling configuration
    pub fn to_polling_config(&self) -> anyhow::Result<PollingConfig> {
        let mut config = PollingConfig::builder(
            self.api.url.clone(),
            Duration::from_millis(self.polling.interval_ms),
        )
        .endpoints(self.api.endpoints.clone())
        .retry_attempts(self.polling.retry_attempts)
        .retry_delay(Duration::from_millis(self.polling.retry_delay_ms))
        .build();

        if let Some(key) = &self.api.key {
            config = config.with_api_key(key.clone());
        }

        config.validate()?;
        Ok(config)
    }

    /// Per-request timeout handed to the HTTP fetcher
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.polling.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::from_config(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.polling.retry_attempts, 3);
        assert_eq!(config.polling.retry_delay_ms, 5000);
    }

    #[test]
    fn written_config_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.api.url = "https://api.example.com".into();
        config.api.key = Some("token".into());
        config.polling.interval_ms = 15_000;
        config.write_config(&path).unwrap();

        let loaded = Config::from_config(Some(&path)).unwrap();
        assert_eq!(loaded.api.url, "https://api.example.com");
        assert_eq!(loaded.api.key.as_deref(), Some("token"));
        assert_eq!(loaded.polling.interval_ms, 15_000);
    }

    #[test]
    fn non_toml_extension_is_normalized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        Config::from_config(Some(&path)).unwrap();
        assert!(dir.path().join("config.toml").exists());
    }

    #[test]
    fn polling_config_carries_api_sections() {
        let mut config = Config::default();
        config.api.url = "https://api.example.com".into();
        config.api.key = Some("token".into());
        config.api.endpoints = vec!["/players".into()];
        config.polling.interval_ms = 15_000;
        config.polling.retry_delay_ms = 100;

        let polling = config.to_polling_config().unwrap();
        assert_eq!(polling.api_url, "https://api.example.com");
        assert_eq!(polling.api_key.as_deref(), Some("token"));
        assert_eq!(polling.endpoints, vec!["/players"]);
        assert_eq!(polling.poll_interval, Duration::from_secs(15));
        assert_eq!(polling.retry_delay, Duration::from_millis(100));
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        let mut config = Config::default();
        config.api.url = "not a url".into();
        assert!(config.to_polling_config().is_err());
    }
}
