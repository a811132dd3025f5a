//! Error type shared by every preference operation.

use thiserror::Error;

use crate::codec::document::DocumentFormat;

/// Errors raised while parsing, validating or serializing preferences.
///
/// Messages from the underlying `serde_json` / `toml` errors are captured as
/// strings so the type stays `Clone + PartialEq` and can be asserted on in
/// tests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The document could not be decoded: malformed syntax, a missing key,
    /// a wrong type or an out-of-range value.
    #[error("failed to parse {format} preferences: {message}")]
    Parse {
        format: DocumentFormat,
        message: String,
    },

    /// The record could not be encoded.
    #[error("failed to serialize preferences as {format}: {message}")]
    Serialize {
        format: DocumentFormat,
        message: String,
    },

    /// The override document named keys that are not part of the schema.
    ///
    /// Keys are dotted paths (`globalOpts.helperHost`), sorted.
    #[error("unknown preference keys: {}", .0.join(", "))]
    UnknownKeys(Vec<String>),

    /// A field holds a value outside its allowed domain.
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    /// The file extension does not map to a supported document format.
    #[error("unsupported preferences format: {0:?} (expected .json or .toml)")]
    UnsupportedFormat(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
