use std::path::PathBuf;

use thiserror::Error;

/// Why a matched marker payload could not be turned into a record.
///
/// Never surfaced to callers of the filters: a failed decode degrades to an
/// empty record so the live text stream keeps flowing.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("marker payload is not valid base64: {source}")]
    Base64 {
        #[source]
        source: base64::DecodeError,
    },
    #[error("marker payload is not valid JSON: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },
    #[error("marker payload decoded to a JSON {found}, expected an object")]
    NotAnObject { found: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read filter config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse filter config TOML: {source}")]
    TomlDecode {
        #[source]
        source: toml::de::Error,
    },
}
