//! Configuration management for the remoteStorage server
//!
//! Loads settings from config.toml with environment variable overrides
//! (REMOTE_STORAGE_* prefix) and validates them once at startup.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_max_body_size() -> usize {
    16 * 1024 * 1024
}

/// Server configuration, loaded once during initialization
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the HTTP listener
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port for the HTTP listener
    pub port: u16,

    /// Root directory for stored files
    pub files_directory: String,

    /// OAuth2 endpoint used to verify bearer tokens
    pub oauth_token_endpoint: String,

    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config"))
            .add_source(Environment::with_prefix("REMOTE_STORAGE"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Socket address string for the listener
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Storage root as a PathBuf
    pub fn files_directory_path(&self) -> PathBuf {
        PathBuf::from(&self.files_directory)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.files_directory.is_empty() {
            return Err(ConfigError::Message(
                "files_directory cannot be empty".into(),
            ));
        }

        if !self.oauth_token_endpoint.starts_with("http://")
            && !self.oauth_token_endpoint.starts_with("https://")
        {
            return Err(ConfigError::Message(
                "oauth_token_endpoint must be an http(s) URL".into(),
            ));
        }

        if self.max_body_size == 0 {
            return Err(ConfigError::Message(
                "max_body_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
