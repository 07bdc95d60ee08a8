//! Configuration management utilities

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A setting has an invalid value
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    /// A required setting is missing
    #[error("missing required setting: {0}")]
    Missing(String),
}

/// Queue backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueBackend {
    /// In-process timers, single deployment
    #[default]
    Local,
    /// QStash-compatible HTTP broker
    Http,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Which queue backend schedules steps
    pub queue_backend: QueueBackend,
    /// Broker base URL, required for the http backend
    pub broker_url: Option<String>,
    /// Broker API token, required for the http backend
    pub broker_token: Option<String>,
    /// Destination URL the broker delivers to, required for the http backend
    pub broker_destination: Option<String>,
    /// Default cap on steps per operation
    pub max_steps: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "agent-exec".to_string(),
            environment: "development".to_string(),
            queue_backend: QueueBackend::Local,
            broker_url: None,
            broker_token: None,
            broker_destination: None,
            max_steps: Some(100),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(backend) = std::env::var("AGENT_QUEUE_BACKEND") {
            config.queue_backend = match backend.as_str() {
                "local" => QueueBackend::Local,
                "http" => QueueBackend::Http,
                other => {
                    return Err(ConfigError::InvalidValue {
                        name: "AGENT_QUEUE_BACKEND".to_string(),
                        value: other.to_string(),
                    });
                }
            };
        }
        if let Ok(url) = std::env::var("AGENT_QUEUE_BROKER_URL") {
            config.broker_url = Some(url);
        }
        if let Ok(token) = std::env::var("AGENT_QUEUE_TOKEN") {
            config.broker_token = Some(token);
        }
        if let Ok(destination) = std::env::var("AGENT_QUEUE_DESTINATION") {
            config.broker_destination = Some(destination);
        }
        if let Ok(max_steps) = std::env::var("AGENT_MAX_STEPS") {
            let parsed =
                max_steps
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue {
                        name: "AGENT_MAX_STEPS".to_string(),
                        value: max_steps.clone(),
                    })?;
            config.max_steps = Some(parsed);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field requirements
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_backend == QueueBackend::Http {
            if self.broker_url.is_none() {
                return Err(ConfigError::Missing("AGENT_QUEUE_BROKER_URL".to_string()));
            }
            if self.broker_token.is_none() {
                return Err(ConfigError::Missing("AGENT_QUEUE_TOKEN".to_string()));
            }
            if self.broker_destination.is_none() {
                return Err(ConfigError::Missing("AGENT_QUEUE_DESTINATION".to_string()));
            }
        }
        Ok(())
    }
}
