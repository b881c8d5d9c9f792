use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Field of a decoded record whose truthy value opens a correlation window.
pub const DEFAULT_CORRELATION_KEY: &str = "uuid";

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterLimits {
    /// Force-flush the pending buffer once it grows past this many bytes.
    ///
    /// `None` keeps the buffer unbounded, so a marker that opens and never
    /// closes holds every following byte until `close`.
    pub max_buffer_bytes: Option<usize>,
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub correlation_key: String,
    pub limits: FilterLimits,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            correlation_key: DEFAULT_CORRELATION_KEY.to_string(),
            limits: FilterLimits::default(),
        }
    }
}

impl FilterConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|source| ConfigError::TomlDecode { source })
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_correlation_key(mut self, key: impl Into<String>) -> Self {
        self.correlation_key = key.into();
        self
    }

    pub fn with_max_buffer_bytes(mut self, max: usize) -> Self {
        self.limits.max_buffer_bytes = Some(max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = FilterConfig::from_toml_str("").unwrap();
        assert_eq!(config, FilterConfig::default());
        assert_eq!(config.correlation_key, "uuid");
        assert_eq!(config.limits.max_buffer_bytes, None);
    }

    #[test]
    fn toml_overrides_key_and_limits() {
        let config = FilterConfig::from_toml_str(
            r#"
correlation_key = "event_id"

[limits]
max_buffer_bytes = 4096
"#,
        )
        .unwrap();
        assert_eq!(config.correlation_key, "event_id");
        assert_eq!(config.limits.max_buffer_bytes, Some(4096));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = FilterConfig::from_toml_str("buffer = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlDecode { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        match FilterConfig::from_toml_file(&path) {
            Err(ConfigError::Read { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected read error, got {other:?}"),
        }
    }
}
