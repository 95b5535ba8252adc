use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Channel, NotificationConfig};
use thiserror::Error;

/// Default per-request deadline when probing a server
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid catalog: {0}")]
    Invalid(String),
    #[error("Invalid environment variable {key}: {reason}")]
    Env { key: &'static str, reason: String },
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Process configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub catalog_path: PathBuf,
    /// Role mentioned in every discovery announcement
    pub role_id: Option<String>,
    pub notification: NotificationConfig,
    /// Address of the operator API, if it should be served
    pub listen: Option<SocketAddr>,
    pub probe_timeout: Duration,
}

impl Config {
    pub fn new(data_path: impl AsRef<Path>, catalog_path: impl AsRef<Path>) -> Self {
        Self {
            data_path: data_path.as_ref().to_path_buf(),
            catalog_path: catalog_path.as_ref().to_path_buf(),
            role_id: None,
            notification: NotificationConfig::new(),
            listen: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Reads configuration from the process environment.
    ///
    /// | Variable               | Meaning                         |
    /// |------------------------|---------------------------------|
    /// | `DATA_PATH`            | data root (default `./data`)    |
    /// | `SKINWATCH_CATALOG`    | catalog file (default `catalog.toml`) |
    /// | `SKINWATCH_LISTEN`     | operator API address            |
    /// | `DISCORD_WEBHOOK_URL`  | art channel webhook             |
    /// | `DISCORD_LABEL_URL`    | label channel webhook           |
    /// | `DISCORD_JOYSTICK_URL` | joystick channel webhook        |
    /// | `DISCORD_FRAME_URL`    | frame channel webhook           |
    /// | `ROLE_ID`              | role to mention                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_path = env_var("DATA_PATH").unwrap_or_else(|| "./data".to_string());
        let catalog_path =
            env_var("SKINWATCH_CATALOG").unwrap_or_else(|| "catalog.toml".to_string());

        let mut config = Self::new(data_path, catalog_path);

        if let Some(listen) = env_var("SKINWATCH_LISTEN") {
            let addr = listen.parse().map_err(|e: std::net::AddrParseError| ConfigError::Env {
                key: "SKINWATCH_LISTEN",
                reason: e.to_string(),
            })?;
            config.listen = Some(addr);
        }

        config.role_id = env_var("ROLE_ID");

        let mut notification = NotificationConfig::new();
        for (channel, key) in [
            (Channel::Art, "DISCORD_WEBHOOK_URL"),
            (Channel::Label, "DISCORD_LABEL_URL"),
            (Channel::Joystick, "DISCORD_JOYSTICK_URL"),
            (Channel::Frame, "DISCORD_FRAME_URL"),
        ] {
            if let Some(url) = env_var(key) {
                notification = notification.with_destination(channel, url);
            }
        }
        config.notification = notification;

        Ok(config)
    }

    pub fn with_data_path(mut self, data_path: impl AsRef<Path>) -> Self {
        self.data_path = data_path.as_ref().to_path_buf();
        self
    }

    pub fn with_catalog_path(mut self, catalog_path: impl AsRef<Path>) -> Self {
        self.catalog_path = catalog_path.as_ref().to_path_buf();
        self
    }

    pub fn with_listen(mut self, listen: SocketAddr) -> Self {
        self.listen = Some(listen);
        self
    }

    /// Suffix appended to announcements, empty when no role is configured
    pub fn role_mention(&self) -> String {
        self.role_id
            .as_deref()
            .map(|id| format!(" <@&{}>", id))
            .unwrap_or_default()
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_mention() {
        let mut config = Config::new("./data", "catalog.toml");
        assert_eq!(config.role_mention(), "");

        config.role_id = Some("42".to_string());
        assert_eq!(config.role_mention(), " <@&42>");
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::new("./data", "catalog.toml")
            .with_data_path("/srv/assets")
            .with_listen("127.0.0.1:8080".parse().unwrap());

        assert_eq!(config.data_path, PathBuf::from("/srv/assets"));
        assert_eq!(config.listen, Some("127.0.0.1:8080".parse().unwrap()));
        assert_eq!(config.probe_timeout, DEFAULT_PROBE_TIMEOUT);
    }
}
