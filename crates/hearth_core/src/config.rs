//! # Render Thread Configuration
//!
//! Loaded once at startup, either from code (`Default`) or from a TOML file:
//!
//! ```toml
//! thread_name = "hearth-render"
//! idle_timeout_ms = 16
//! queue_capacity_hint = 256
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// Configuration for a render worker thread.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RenderThreadConfig {
    /// OS thread name. Falls back to `hearth-<role>` when unset.
    pub thread_name: Option<String>,
    /// Maximum time the worker waits for a message before running its idle
    /// hook. `None` means the worker sleeps until a message arrives.
    pub idle_timeout_ms: Option<u64>,
    /// Initial capacity reserved for the inbound queue.
    pub queue_capacity_hint: usize,
}

impl Default for RenderThreadConfig {
    fn default() -> Self {
        Self {
            thread_name: None,
            idle_timeout_ms: None,
            queue_capacity_hint: 64,
        }
    }
}

impl RenderThreadConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigParse`] for malformed TOML or unknown keys,
    /// and [`CoreError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the file cannot be read, plus
    /// everything [`Self::from_toml_str`] can return.
    pub fn from_toml_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CoreError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the idle timeout is zero or the
    /// thread name is empty.
    pub fn validate(&self) -> CoreResult<()> {
        if self.idle_timeout_ms == Some(0) {
            return Err(CoreError::InvalidConfig(
                "idle_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.thread_name.as_deref().is_some_and(str::is_empty) {
            return Err(CoreError::InvalidConfig("thread_name must not be empty".to_string()));
        }
        Ok(())
    }

    /// Returns the idle timeout as a [`std::time::Duration`].
    #[must_use]
    pub fn idle_timeout(&self) -> Option<std::time::Duration> {
        self.idle_timeout_ms.map(std::time::Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config_is_valid() {
        let config = RenderThreadConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.idle_timeout(), None);
    }

    #[test]
    fn test_parse_full_config() {
        let config = RenderThreadConfig::from_toml_str(
            r#"
            thread_name = "hearth-render"
            idle_timeout_ms = 16
            queue_capacity_hint = 256
            "#,
        )
        .unwrap();

        assert_eq!(config.thread_name.as_deref(), Some("hearth-render"));
        assert_eq!(config.idle_timeout(), Some(Duration::from_millis(16)));
        assert_eq!(config.queue_capacity_hint, 256);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = RenderThreadConfig::from_toml_str("idle_timeout_ms = 5").unwrap();
        assert_eq!(config.thread_name, None);
        assert_eq!(config.queue_capacity_hint, 64);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = RenderThreadConfig::from_toml_str("idle_timeout_ms = 0").unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_thread_name_rejected() {
        let err = RenderThreadConfig::from_toml_str("thread_name = \"\"").unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = RenderThreadConfig::from_toml_str("frames_per_second = 60").unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file_reported() {
        let path = std::env::temp_dir().join("hearth_config_that_does_not_exist.toml");
        let err = RenderThreadConfig::from_toml_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_from_file() {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("hearth_config_{id}.toml"));
        std::fs::write(&path, "thread_name = \"upload\"\n").unwrap();

        let config = RenderThreadConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.thread_name.as_deref(), Some("upload"));

        std::fs::remove_file(&path).ok();
    }
}
