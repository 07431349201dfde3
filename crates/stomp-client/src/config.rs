//! Optional TOML configuration.
//!
//! The file is looked up at `$STOMP_CLIENT_CONFIG`, falling back to
//! `<config dir>/stomp-client/config.toml`. A missing file means defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use transport::{DEFAULT_HOST, DEFAULT_PORT, Defaults, Handshake};

use crate::session::SessionOptions;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "STOMP_CLIENT_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub handshake: HandshakeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Host used when the arguments do not name one.
    pub default_host: String,
    /// Port used when the arguments do not name one.
    pub default_port: u16,
    /// Give up connecting after this many milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            default_host: DEFAULT_HOST.to_string(),
            default_port: DEFAULT_PORT,
            connect_timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandshakeConfig {
    pub accept_version: String,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            accept_version: Handshake::default().accept_version,
        }
    }
}

impl Config {
    /// Load the configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        match default_path() {
            Some(path) => Self::from_path(&path),
            None => {
                tracing::debug!("no config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load the configuration from `path`. A missing file yields defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Fallback host and port for target resolution.
    pub fn defaults(&self) -> Defaults {
        Defaults {
            host: self.connection.default_host.clone(),
            port: self.connection.default_port,
        }
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connection.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Handshake headers. Credentials are always the guest placeholders.
    pub fn handshake(&self) -> Handshake {
        Handshake {
            accept_version: self.handshake.accept_version.clone(),
            ..Handshake::default()
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            handshake: self.handshake(),
            connect_timeout: self.connect_timeout(),
        }
    }
}

fn default_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("stomp-client").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_builtin_target() {
        let config = Config::default();
        assert_eq!(config.defaults(), Defaults::default());
        assert_eq!(config.handshake(), Handshake::default());
        assert_eq!(config.connect_timeout(), None);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_path(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn full_file() {
        let file = write_config(
            r#"
            [connection]
            default_host = "broker.local"
            default_port = 61614
            connect_timeout_ms = 2500

            [handshake]
            accept_version = "1.1,1.2"
            "#,
        );

        let config = Config::from_path(file.path()).unwrap();
        assert_eq!(
            config.defaults(),
            Defaults {
                host: "broker.local".to_string(),
                port: 61614
            }
        );
        assert_eq!(config.connect_timeout(), Some(Duration::from_millis(2500)));

        let options = config.session_options();
        assert_eq!(options.handshake.accept_version, "1.1,1.2");
        assert_eq!(options.handshake.login, "guest");
        assert_eq!(options.handshake.passcode, "guest");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = write_config("[connection]\ndefault_port = 1234\n");

        let config = Config::from_path(file.path()).unwrap();
        assert_eq!(config.connection.default_host, DEFAULT_HOST);
        assert_eq!(config.connection.default_port, 1234);
        assert_eq!(config.handshake, HandshakeConfig::default());
    }

    #[test]
    fn credentials_are_not_configurable() {
        let file = write_config("[handshake]\nlogin = \"admin\"\n");

        let err = Config::from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn invalid_port() {
        let file = write_config("[connection]\ndefault_port = 70000\n");

        assert!(matches!(
            Config::from_path(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
