//! JSON and TOML encoding of [`PreferenceSet`].
//!
//! Full-record decoding is strict and performs no default filling: a missing
//! key is an error.  To start from defaults and change a few keys, parse an
//! override document instead ([`merge_document`]).

use std::fmt;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::domain::overrides::{PreferenceOverrides, UnknownKeyPolicy};
use crate::domain::preferences::{defaults, PreferenceSet};
use crate::error::ConfigError;

/// On-disk document syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Picks the format from a file extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for any extension other
    /// than `json` or `toml`, including no extension at all.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("JSON"),
            Self::Toml => f.write_str("TOML"),
        }
    }
}

impl PreferenceSet {
    /// Decodes a complete JSON record.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed JSON, a missing or unknown key,
    /// a wrongly typed value, or an out-of-range `helperPort`.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            format: DocumentFormat::Json,
            message: e.to_string(),
        })
    }

    /// Decodes a complete TOML record.  Same error contract as
    /// [`Self::from_json_str`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e: toml::de::Error| ConfigError::Parse {
            format: DocumentFormat::Toml,
            message: e.message().to_string(),
        })
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            format: DocumentFormat::Json,
            message: e.to_string(),
        })
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            format: DocumentFormat::Toml,
            message: e.to_string(),
        })
    }

    /// Decodes a complete record in the given format.
    pub fn parse(text: &str, format: DocumentFormat) -> Result<Self, ConfigError> {
        match format {
            DocumentFormat::Json => Self::from_json_str(text),
            DocumentFormat::Toml => Self::from_toml_str(text),
        }
    }

    /// Encodes the record in the given format.
    pub fn render(&self, format: DocumentFormat) -> Result<String, ConfigError> {
        match format {
            DocumentFormat::Json => self.to_json_string(),
            DocumentFormat::Toml => self.to_toml_string(),
        }
    }
}

impl PreferenceOverrides {
    /// Decodes an override document in the given format.
    pub fn parse(
        text: &str,
        format: DocumentFormat,
        policy: UnknownKeyPolicy,
    ) -> Result<Self, ConfigError> {
        match format {
            DocumentFormat::Json => Self::from_json_str(text, policy),
            DocumentFormat::Toml => Self::from_toml_str(text, policy),
        }
    }
}

/// Parses an override document and merges it over the defaults.
///
/// # Errors
///
/// Any error from [`PreferenceOverrides::parse`].
pub fn merge_document(
    text: &str,
    format: DocumentFormat,
    policy: UnknownKeyPolicy,
) -> Result<PreferenceSet, ConfigError> {
    let overrides = PreferenceOverrides::parse(text, format, policy)?;
    debug!(%format, empty = overrides.is_empty(), "merging preference document");
    Ok(defaults().merged(&overrides))
}

/// Decodes `text` into a generic tree, regardless of format.
///
/// Both override parsers start here, so unknown-key detection sees the same
/// tree shape for JSON and TOML input.
pub fn parse_tree(text: &str, format: DocumentFormat) -> Result<Value, ConfigError> {
    match format {
        DocumentFormat::Json => serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            format,
            message: e.to_string(),
        }),
        DocumentFormat::Toml => {
            toml::from_str(text).map_err(|e: toml::de::Error| ConfigError::Parse {
                format,
                message: e.message().to_string(),
            })
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::data_path::DataPath;
    use crate::domain::preferences::{get_defaults, HelperType, Scale};

    const DEFAULTS_JSON: &str = r#"{
  "globalOpts": {"helperType":       "none",
                 "helperPort":       2718,
                 "helperCGI":        "./cgi-bin/js9Helper.cgi",
                 "fits2png":         false,
                 "debug":            0,
                 "loadProxy":        false,
                 "workDir":          "./tmp",
                 "dataPath":         "$HOME/Desktop:$HOME/data",
                 "analysisPlugins":  "./analysis-plugins",
                 "analysisWrappers": "./analysis-wrappers"},
  "imageOpts":  {"colormap":         "grey",
                 "scale":            "linear"}
}"#;

    // ── Format selection ──────────────────────────────────────────────────────

    #[test]
    fn test_from_path_maps_extensions() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("prefs.json")),
            Ok(DocumentFormat::Json)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("/etc/imgprefs/PREFS.TOML")),
            Ok(DocumentFormat::Toml)
        );
    }

    #[test]
    fn test_from_path_rejects_other_extensions() {
        for name in ["prefs.yaml", "prefs", "prefs.js"] {
            let err = DocumentFormat::from_path(Path::new(name)).expect_err("unsupported");
            assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
        }
    }

    // ── Full-record decoding ──────────────────────────────────────────────────

    #[test]
    fn test_legacy_json_layout_decodes_to_defaults() {
        let prefs = PreferenceSet::from_json_str(DEFAULTS_JSON).expect("decode");
        assert_eq!(prefs, get_defaults());
    }

    #[test]
    fn test_json_round_trip_of_defaults() {
        // Arrange
        let prefs = get_defaults();

        // Act
        let text = prefs.to_json_string().expect("serialize");
        let restored = PreferenceSet::from_json_str(&text).expect("deserialize");

        // Assert
        assert_eq!(restored, prefs);
    }

    #[test]
    fn test_toml_round_trip_of_modified_record() {
        // Arrange
        let mut prefs = get_defaults();
        prefs.global_opts.helper_type = HelperType::Post;
        prefs.image_opts.scale = Scale::Histeq;

        // Act
        let text = prefs.to_toml_string().expect("serialize");
        let restored = PreferenceSet::from_toml_str(&text).expect("deserialize");

        // Assert
        assert_eq!(restored, prefs);
        assert!(text.contains("[globalOpts]"), "got:\n{text}");
        assert!(text.contains("helperCGI = "), "got:\n{text}");
    }

    #[test]
    fn test_json_round_trip_keeps_data_path_built_from_colon_entry() {
        // Arrange
        let mut prefs = get_defaults();
        prefs.global_opts.data_path = DataPath::from_entries(["/mnt/a:b", "$HOME/data"]);

        // Act
        let text = prefs.to_json_string().expect("serialize");
        let restored = PreferenceSet::from_json_str(&text).expect("deserialize");

        // Assert
        assert_eq!(restored, prefs);
        assert_eq!(restored.global_opts.data_path.len(), 3);
    }

    #[test]
    fn test_missing_key_is_parse_error() {
        let text = DEFAULTS_JSON.replace(r#""debug":            0,"#, "");
        let err = PreferenceSet::from_json_str(&text).expect_err("missing debug");
        match err {
            ConfigError::Parse { format, message } => {
                assert_eq!(format, DocumentFormat::Json);
                assert!(message.contains("debug"), "got {message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let err = PreferenceSet::from_toml_str("[globalOpts]\n").expect_err("incomplete");
        assert!(matches!(
            err,
            ConfigError::Parse {
                format: DocumentFormat::Toml,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_key_in_full_record_is_parse_error() {
        let text = DEFAULTS_JSON.replace(
            r#""scale":            "linear""#,
            r#""scale": "linear", "zoom": 2"#,
        );
        assert!(PreferenceSet::from_json_str(&text).is_err());
    }

    #[test]
    fn test_out_of_range_port_in_full_record_is_parse_error() {
        let text = DEFAULTS_JSON.replace("2718", "70000");
        let err = PreferenceSet::from_json_str(&text).expect_err("port out of range");
        assert!(err.to_string().contains("1..=65535"), "got {err}");
    }

    #[test]
    fn test_negative_debug_is_parse_error() {
        let text = DEFAULTS_JSON.replace(r#""debug":            0"#, r#""debug": -1"#);
        assert!(PreferenceSet::from_json_str(&text).is_err());
    }

    // ── merge_document ────────────────────────────────────────────────────────

    #[test]
    fn test_merge_document_toml_overrides_scale() {
        let prefs = merge_document(
            "[imageOpts]\nscale = \"log\"\n",
            DocumentFormat::Toml,
            UnknownKeyPolicy::Reject,
        )
        .expect("merge");

        let mut expected = get_defaults();
        expected.image_opts.scale = Scale::Log;
        assert_eq!(prefs, expected);
    }

    #[test]
    fn test_merge_document_empty_json_is_defaults() {
        let prefs = merge_document("{}", DocumentFormat::Json, UnknownKeyPolicy::Reject)
            .expect("merge");
        assert_eq!(prefs, get_defaults());
    }

    #[test]
    fn test_parse_tree_reads_both_formats_into_same_tree() {
        let from_json = parse_tree(r#"{"imageOpts":{"scale":"log"}}"#, DocumentFormat::Json)
            .expect("json");
        let from_toml =
            parse_tree("[imageOpts]\nscale = \"log\"\n", DocumentFormat::Toml).expect("toml");
        assert_eq!(from_json, from_toml);
    }
}
