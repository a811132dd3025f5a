//! Effective preference resolution.
//!
//! Layers, lowest priority first:
//!
//! ```text
//! built-in defaults
//!  └─ preferences file       (override document, may be absent)
//!      └─ --set key=value    (command-line overrides)
//! ```
//!
//! The result is validated and its `dataPath` entries are expanded against
//! the environment into concrete directories.

use std::path::PathBuf;

use imgprefs_core::{defaults, ConfigError, PreferenceOverrides, PreferenceSet, UnknownKeyPolicy};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::infrastructure::env::{expand_placeholders, EnvSource};
use crate::infrastructure::storage::config::{load_overrides, prefs_file_path, StorageError};

/// Errors raised while resolving the effective preferences.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Reading or decoding the preferences file failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The merged record or a command-line override is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A `--set` argument is not of the form `section.key=value`.
    #[error("malformed override {0:?}: expected section.key=value")]
    BadOverride(String),
}

/// Inputs to [`resolve`].
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    /// Explicit preferences file.  `None` uses the platform default location.
    pub file: Option<PathBuf>,
    /// Raw `section.key=value` overrides, applied in order.
    pub sets: Vec<String>,
    pub policy: UnknownKeyPolicy,
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPreferences {
    pub preferences: PreferenceSet,
    /// Preferences file that was consulted, if any location could be
    /// determined.  The file itself may not exist.
    pub source: Option<PathBuf>,
    /// `dataPath` entries with placeholders expanded, in search order.
    pub data_dirs: Vec<PathBuf>,
}

/// Computes the effective preferences for this run.
///
/// # Errors
///
/// See [`ResolveError`].  A missing platform config directory is not an
/// error; the file layer is skipped with a warning.
pub fn resolve(
    request: &ResolveRequest,
    env: &dyn EnvSource,
) -> Result<ResolvedPreferences, ResolveError> {
    let source = match &request.file {
        Some(path) => Some(path.clone()),
        None => match prefs_file_path() {
            Ok(path) => Some(path),
            Err(StorageError::NoPlatformConfigDir) => {
                warn!("no platform config directory; skipping preferences file");
                None
            }
            Err(e) => return Err(e.into()),
        },
    };

    let file_overrides = match &source {
        Some(path) => load_overrides(path, request.policy)?,
        None => PreferenceOverrides::default(),
    };
    let cli_overrides = parse_set_args(&request.sets, request.policy)?;

    let preferences = defaults().merged(&file_overrides.layered(&cli_overrides));
    preferences.validate()?;
    debug!(?preferences, "resolved effective preferences");

    let data_dirs = expand_data_path(&preferences, env);
    Ok(ResolvedPreferences {
        preferences,
        source,
        data_dirs,
    })
}

/// Expands every `dataPath` entry against `env`.
pub fn expand_data_path(prefs: &PreferenceSet, env: &dyn EnvSource) -> Vec<PathBuf> {
    prefs
        .global_opts
        .data_path
        .iter()
        .map(|entry| PathBuf::from(expand_placeholders(entry, env)))
        .collect()
}

/// Turns `section.key=value` arguments into an override document.
///
/// Values are trimmed.  For the numeric and boolean keys (`helperPort`,
/// `debug`, `fits2png`, `loadProxy`) a value that reads as a JSON number or
/// boolean keeps that type; every other key takes the value as a string, so
/// `imageOpts.scale=log` and `globalOpts.workDir=2024` need no quoting.
/// Later arguments win over earlier ones for the same key.
///
/// # Errors
///
/// [`ResolveError::BadOverride`] for arguments without `=` or without a
/// `section.` prefix; [`ResolveError::Config`] for unknown keys (under
/// [`UnknownKeyPolicy::Reject`]) or ill-typed values.
pub fn parse_set_args(
    sets: &[String],
    policy: UnknownKeyPolicy,
) -> Result<PreferenceOverrides, ResolveError> {
    let mut doc = Map::new();

    for raw in sets {
        let (path, value) = raw
            .split_once('=')
            .ok_or_else(|| ResolveError::BadOverride(raw.clone()))?;
        let (section, key) = path
            .trim()
            .split_once('.')
            .filter(|(s, k)| !s.is_empty() && !k.is_empty())
            .ok_or_else(|| ResolveError::BadOverride(raw.clone()))?;

        let entry = doc
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match entry {
            Value::Object(fields) => {
                fields.insert(key.to_string(), scalar_value(key, value.trim()));
            }
            _ => return Err(ResolveError::BadOverride(raw.clone())),
        }
    }

    Ok(PreferenceOverrides::from_value(Value::Object(doc), policy)?)
}

/// Keys whose values are numbers or booleans rather than strings.
const TYPED_KEYS: [&str; 4] = ["helperPort", "debug", "fits2png", "loadProxy"];

fn scalar_value(key: &str, value: &str) -> Value {
    if TYPED_KEYS.contains(&key) {
        if let Ok(typed @ (Value::Bool(_) | Value::Number(_))) =
            serde_json::from_str::<Value>(value)
        {
            return typed;
        }
    }
    Value::String(value.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
