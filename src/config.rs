//! Configuration management for slack-identity
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from YAML files and environment variables.

use crate::error::{Result, SlackIdentityError};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Info fields a `uid_field` may name.
pub const UID_FIELDS: [&str; 4] = ["name", "nickname", "email", "image"];

/// Main configuration structure for slack-identity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Slack strategy configuration
    #[serde(default)]
    pub slack: SlackConfig,
}

/// Slack OAuth application and strategy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// OAuth client identifier issued by Slack
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret issued by Slack
    #[serde(default)]
    pub client_secret: String,

    /// Redirect URL registered with the Slack application
    #[serde(default = "default_callback_url")]
    pub callback_url: String,

    /// Info field used as the unique identifier of an authenticated user
    #[serde(default = "default_uid_field")]
    pub uid_field: String,

    /// Scope requested when the authorize request does not override it
    #[serde(default = "default_scope")]
    pub default_scope: String,

    /// Base URL for both the authorize redirect and the Web API
    ///
    /// Tests point this at a mock server.
    #[serde(default = "default_site")]
    pub site: String,

    /// Path of the authorize endpoint under `site`
    #[serde(default = "default_authorize_path")]
    pub authorize_path: String,

    /// Path of the token exchange endpoint under `site`
    #[serde(default = "default_token_path")]
    pub token_path: String,

    /// Timeout applied to every outbound HTTP request (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_callback_url() -> String {
    "http://localhost:3000/auth/slack/callback".to_string()
}

fn default_uid_field() -> String {
    "email".to_string()
}

fn default_scope() -> String {
    "identity.basic".to_string()
}

fn default_site() -> String {
    "https://slack.com".to_string()
}

fn default_authorize_path() -> String {
    "/oauth/authorize".to_string()
}

fn default_token_path() -> String {
    "/api/oauth.access".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            callback_url: default_callback_url(),
            uid_field: default_uid_field(),
            default_scope: default_scope(),
            site: default_site(),
            authorize_path: default_authorize_path(),
            token_path: default_token_path(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl SlackConfig {
    /// Joins `site` and `path` without doubling the slash between them.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.site.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Config {
    /// Load configuration from file with environment overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(SlackIdentityError::Io)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let config = serde_yaml::from_str(&contents)
            .map_err(SlackIdentityError::Yaml)
            .with_context(|| format!("Failed to parse config {}", path))?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(client_id) = std::env::var("SLACK_IDENTITY_CLIENT_ID") {
            self.slack.client_id = client_id;
        }
        if let Ok(client_secret) = std::env::var("SLACK_IDENTITY_CLIENT_SECRET") {
            self.slack.client_secret = client_secret;
        }
        if let Ok(callback_url) = std::env::var("SLACK_IDENTITY_CALLBACK_URL") {
            self.slack.callback_url = callback_url;
        }
        if let Ok(site) = std::env::var("SLACK_IDENTITY_SITE") {
            self.slack.site = site;
        }
        if let Ok(uid_field) = std::env::var("SLACK_IDENTITY_UID_FIELD") {
            self.slack.uid_field = uid_field;
        }
        if let Ok(timeout) = std::env::var("SLACK_IDENTITY_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.slack.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid SLACK_IDENTITY_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        let slack = &self.slack;

        if slack.client_id.is_empty() {
            return Err(SlackIdentityError::Config("client_id cannot be empty".to_string()).into());
        }

        url::Url::parse(&slack.site).map_err(|e| {
            SlackIdentityError::Config(format!("Invalid site URL {}: {}", slack.site, e))
        })?;

        url::Url::parse(&slack.callback_url).map_err(|e| {
            SlackIdentityError::Config(format!(
                "Invalid callback_url {}: {}",
                slack.callback_url, e
            ))
        })?;

        if !UID_FIELDS.contains(&slack.uid_field.as_str()) {
            return Err(SlackIdentityError::Config(format!(
                "Invalid uid_field: {}. Must be one of: {}",
                slack.uid_field,
                UID_FIELDS.join(", ")
            ))
            .into());
        }

        if slack.timeout_seconds == 0 {
            return Err(
                SlackIdentityError::Config("timeout_seconds must be greater than 0".to_string())
                    .into(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.slack.client_id = "12345.67890".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.slack.uid_field, "email");
        assert_eq!(config.slack.default_scope, "identity.basic");
        assert_eq!(config.slack.site, "https://slack.com");
        assert_eq!(config.slack.timeout_seconds, 30);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_client_id() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_site() {
        let mut config = valid_config();
        config.slack.site = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_callback_url() {
        let mut config = valid_config();
        config.slack.callback_url = "/relative/only".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_unknown_uid_field() {
        let mut config = valid_config();
        config.slack.uid_field = "user_id".to_string();
        assert!(config.validate().is_err());

        config.slack.uid_field = "name".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = valid_config();
        config.slack.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
slack:
  client_id: abc
  uid_field: name
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.slack.client_id, "abc");
        assert_eq!(config.slack.uid_field, "name");
        assert_eq!(config.slack.default_scope, "identity.basic");
        assert_eq!(config.slack.token_path, "/api/oauth.access");
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let mut slack = SlackConfig::default();
        slack.site = "http://127.0.0.1:9000/".to_string();
        assert_eq!(
            slack.endpoint("/api/auth.test"),
            "http://127.0.0.1:9000/api/auth.test"
        );
    }
}
