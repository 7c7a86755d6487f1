//! Controller configuration.
//!
//! Values come from the environment by default (`TODO_API_URL`,
//! `TODO_USER_ID`, `TODO_NOTICE_MS`) and can be overridden with the builder
//! methods. A missing user id is not an error: the controller then reports
//! that a user has to be configured instead of calling the service.

use std::time::Duration;

use crate::error::ConfigError;
use crate::notice::DEFAULT_NOTICE_TTL;
use crate::types::UserId;

/// Default service URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub base_url: String,
    pub user_id: Option<UserId>,
    pub notice_ttl: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl SyncConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_id: None,
            notice_ttl: DEFAULT_NOTICE_TTL,
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("TODO_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(base_url));
        }
        let mut config = Self::new(base_url);

        if let Some(raw) = lookup("TODO_USER_ID").filter(|raw| !raw.trim().is_empty()) {
            let user_id = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|id| *id > 0)
                .ok_or_else(|| ConfigError::InvalidUserId(raw.clone()))?;
            config.user_id = Some(UserId(user_id));
        }

        if let Some(raw) = lookup("TODO_NOTICE_MS") {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNoticeDuration(raw.clone()))?;
            config.notice_ttl = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = SyncConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.user_id, None);
        assert_eq!(config.notice_ttl, Duration::from_secs(3));
    }

    #[test]
    fn reads_all_keys() {
        let config = SyncConfig::from_lookup(lookup(&[
            ("TODO_API_URL", "https://todos.example"),
            ("TODO_USER_ID", " 42 "),
            ("TODO_NOTICE_MS", "1500"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://todos.example");
        assert_eq!(config.user_id, Some(UserId(42)));
        assert_eq!(config.notice_ttl, Duration::from_millis(1500));
    }

    #[test]
    fn blank_user_id_means_unconfigured() {
        let config = SyncConfig::from_lookup(lookup(&[("TODO_USER_ID", "  ")])).unwrap();
        assert_eq!(config.user_id, None);
    }

    #[test]
    fn rejects_zero_and_non_numeric_user_ids() {
        assert_eq!(
            SyncConfig::from_lookup(lookup(&[("TODO_USER_ID", "0")])),
            Err(ConfigError::InvalidUserId("0".to_string()))
        );
        assert_eq!(
            SyncConfig::from_lookup(lookup(&[("TODO_USER_ID", "alice")])),
            Err(ConfigError::InvalidUserId("alice".to_string()))
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        assert_eq!(
            SyncConfig::from_lookup(lookup(&[("TODO_API_URL", "ftp://x")])),
            Err(ConfigError::InvalidBaseUrl("ftp://x".to_string()))
        );
    }

    #[test]
    fn builder_overrides() {
        let config = SyncConfig::new("http://svc")
            .with_user(UserId(3))
            .with_notice_ttl(Duration::from_millis(10));
        assert_eq!(config.user_id, Some(UserId(3)));
        assert_eq!(config.notice_ttl, Duration::from_millis(10));
    }
}
