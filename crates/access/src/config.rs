//! Access core configuration

use std::env;

/// Configuration for the access core, loaded from environment variables
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Reserved platform-owner address; grants every feature unconditionally
    pub platform_owner_email: String,
    /// Trial window length in days applied to new workspaces
    pub trial_length_days: i64,
}

impl AccessConfig {
    pub fn new(platform_owner_email: impl Into<String>, trial_length_days: i64) -> Self {
        Self {
            platform_owner_email: platform_owner_email.into(),
            trial_length_days,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            platform_owner_email: env::var("PLATFORM_OWNER_EMAIL")
                .map_err(|_| ConfigError::Missing("PLATFORM_OWNER_EMAIL"))?,
            trial_length_days: env::var("TRIAL_LENGTH_DAYS")
                .unwrap_or_else(|_| "14".to_string())
                .parse()
                .unwrap_or(14),
        })
    }

    /// Check whether an email belongs to the platform owner (case-insensitive)
    pub fn is_platform_owner(&self, email: &str) -> bool {
        email.eq_ignore_ascii_case(&self.platform_owner_email)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
