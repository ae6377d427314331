//! Configuration data structures

use crate::buffer::BufferPolicy;
use crate::channel::validation::validate_channel_name;
use crate::models::PayloadCodec;
use crate::transport::reconnect::ReconnectPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Logging level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum LogLevel {
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "info")]
    #[default]
    Info,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "trace")]
    Trace,
}

/// Errors raised while loading, saving, or interpreting configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write configuration file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid {field} URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },
    #[error("could not determine config directory")]
    NoConfigDir,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    /// Base URL of the streaming endpoints (SSE, WebSocket, long-poll)
    pub stream_base_url: String,
    /// Base URL of the publish endpoint
    pub publish_base_url: String,
    /// Channel name subscribed to and published on
    pub channel: String,
    /// Bearer token presented on every outbound HTTP request
    pub auth_token: String,
    /// Inbound payload interpretation
    #[serde(default)]
    pub codec: PayloadCodec,
    /// Message history retention across transport switches
    #[serde(default)]
    pub buffer_policy: BufferPolicy,
    /// Logging verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
    /// Retry delays applied after backend failures
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            stream_base_url: "http://localhost:7999".to_string(),
            publish_base_url: "http://localhost:8000".to_string(),
            channel: "test-common".to_string(),
            auth_token: "1234".to_string(),
            codec: PayloadCodec::default(),
            buffer_policy: BufferPolicy::default(),
            log_level: LogLevel::default(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl Configuration {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(config)
        } else {
            Ok(Configuration::default())
        }
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the XDG config file path
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("livefeed").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if Url::parse(&self.stream_base_url).is_err() {
            errors.push(format!("stream_base_url is not a valid URL: {}", self.stream_base_url));
        }
        if Url::parse(&self.publish_base_url).is_err() {
            errors.push(format!(
                "publish_base_url is not a valid URL: {}",
                self.publish_base_url
            ));
        }
        if let Err(e) = validate_channel_name(&self.channel) {
            errors.push(format!("channel: {}", e));
        }
        if self.auth_token.is_empty() {
            errors.push("auth_token must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// SSE subscribe endpoint
    pub fn sse_endpoint(&self) -> String {
        format!("{}/sse", self.stream_base_url.trim_end_matches('/'))
    }

    /// Long-poll fetch endpoint
    pub fn longpoll_endpoint(&self) -> String {
        format!("{}/longpoll", self.stream_base_url.trim_end_matches('/'))
    }

    /// Publish endpoint
    pub fn publish_endpoint(&self) -> String {
        format!("{}/publish", self.publish_base_url.trim_end_matches('/'))
    }

    /// WebSocket endpoint derived from the stream base URL.
    ///
    /// The channel travels as a query parameter because the socket handshake
    /// carries no custom headers in this protocol.
    pub fn websocket_endpoint(&self) -> Result<Url, ConfigError> {
        let invalid = || ConfigError::InvalidUrl {
            field: "stream_base_url",
            value: self.stream_base_url.clone(),
        };
        let mut url = Url::parse(&self.stream_base_url).map_err(|_| invalid())?;
        let scheme = match url.scheme() {
            "http" => "ws",
            "https" => "wss",
            "ws" => "ws",
            "wss" => "wss",
            _ => return Err(invalid()),
        };
        url.set_scheme(scheme).map_err(|_| invalid())?;
        url.set_path("/websocket");
        url.query_pairs_mut().clear().append_pair("channel", &self.channel);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_configuration() {
        let config = Configuration::default();
        assert_eq!(config.stream_base_url, "http://localhost:7999");
        assert_eq!(config.publish_base_url, "http://localhost:8000");
        assert_eq!(config.channel, "test-common");
        assert_eq!(config.auth_token, "1234");
        assert_eq!(config.codec, PayloadCodec::RawText);
        assert_eq!(config.buffer_policy, BufferPolicy::ClearOnSwitch);
    }

    #[test]
    fn test_configuration_validation() {
        let config = Configuration {
            stream_base_url: "not a url".to_string(),
            channel: "invalid channel!".to_string(),
            auth_token: String::new(),
            ..Configuration::default()
        };

        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("stream_base_url")));
        assert!(errors.iter().any(|e| e.contains("channel")));
        assert!(errors.iter().any(|e| e.contains("auth_token")));
    }

    #[test]
    fn test_endpoint_helpers_trim_trailing_slash() {
        let config = Configuration {
            stream_base_url: "http://localhost:7999/".to_string(),
            publish_base_url: "http://localhost:8000/".to_string(),
            ..Configuration::default()
        };
        assert_eq!(config.sse_endpoint(), "http://localhost:7999/sse");
        assert_eq!(config.longpoll_endpoint(), "http://localhost:7999/longpoll");
        assert_eq!(config.publish_endpoint(), "http://localhost:8000/publish");
    }

    #[test]
    fn test_websocket_endpoint_derivation() {
        let config = Configuration {
            channel: "test-common".to_string(),
            ..Configuration::default()
        };
        let url = config.websocket_endpoint().unwrap();
        assert_eq!(url.as_str(), "ws://localhost:7999/websocket?channel=test-common");

        let tls = Configuration {
            stream_base_url: "https://feed.example.com".to_string(),
            ..Configuration::default()
        };
        assert_eq!(tls.websocket_endpoint().unwrap().scheme(), "wss");
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config = Configuration {
            channel: "release-feed".to_string(),
            codec: PayloadCodec::Structured,
            ..Configuration::default()
        };

        config.save_to_file(&config_path).unwrap();
        assert!(config_path.exists());

        let loaded = Configuration::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.channel, "release-feed");
        assert_eq!(loaded.codec, PayloadCodec::Structured);
    }

    #[test]
    fn test_missing_config_file_falls_back_to_defaults() {
        let temp_dir = tempdir().unwrap();
        let config = Configuration::load_from_file(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.channel, "test-common");
    }
}
