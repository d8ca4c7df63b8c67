//! Configuration management for the Charlie board.

use anyhow::{Context, Result};
use charlie_common::PostingPolicy;
use charlie_common::constants::{
    DEFAULT_LOGIN_DELAY_MS, DEFAULT_POST_DELAY_MS, DEFAULT_STORAGE_PATH, storage_keys,
};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Local storage file
    #[serde(default = "default_storage_path")]
    pub storage_path: String,

    /// Storage key names
    #[serde(default)]
    pub storage: StorageConfig,

    /// Sign-in behaviour
    #[serde(default)]
    pub session: SessionConfig,

    /// Posting behaviour
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Storage key names
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_identity_key")]
    pub identity_key: String,

    #[serde(default = "default_feed_key")]
    pub feed_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            identity_key: default_identity_key(),
            feed_key: default_feed_key(),
        }
    }
}

/// Sign-in configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Simulated auth round trip in milliseconds
    #[serde(default = "default_login_delay")]
    pub login_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_delay_ms: default_login_delay(),
        }
    }
}

/// Posting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Simulated upload round trip in milliseconds
    #[serde(default = "default_post_delay")]
    pub post_delay_ms: u64,

    /// `forum` (title or description) or `gallery` (title and image)
    #[serde(default)]
    pub posting_policy: PostingPolicy,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            post_delay_ms: default_post_delay(),
            posting_policy: PostingPolicy::default(),
        }
    }
}

// Default value functions
fn default_storage_path() -> String { DEFAULT_STORAGE_PATH.to_string() }
fn default_identity_key() -> String { storage_keys::IDENTITY.to_string() }
fn default_feed_key() -> String { storage_keys::FEED.to_string() }
fn default_login_delay() -> u64 { DEFAULT_LOGIN_DELAY_MS }
fn default_post_delay() -> u64 { DEFAULT_POST_DELAY_MS }

impl AppConfig {
    /// Load configuration from file, falling back to defaults
    pub fn load(config_path: &str) -> Result<Self> {
        if !Path::new(config_path).exists() {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path))
            .build()
            .context("Failed to load config file")?;

        let config: Self = settings
            .try_deserialize()
            .context("Failed to parse config")?;

        if config.storage.identity_key == config.storage.feed_key {
            anyhow::bail!(
                "storage.identity_key and storage.feed_key must differ (both are {:?})",
                config.storage.feed_key
            );
        }

        Ok(config)
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.session.login_delay_ms)
    }

    pub fn post_delay(&self) -> Duration {
        Duration::from_millis(self.feed.post_delay_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            storage: StorageConfig::default(),
            session: SessionConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}
