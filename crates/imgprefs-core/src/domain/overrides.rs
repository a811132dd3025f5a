//! Partial preference documents and the merge operation.
//!
//! An override document has the same shape as a full [`PreferenceSet`] but
//! every key is optional.  Merging copies each present key over a base
//! record and leaves the rest alone, so the result never has an undefined
//! field.  The base is never modified; merge always returns a new record.
//!
//! ```rust
//! use imgprefs_core::{merge, ImageOverrides, PreferenceOverrides, Scale};
//!
//! let prefs = merge(&PreferenceOverrides {
//!     image_opts: Some(ImageOverrides {
//!         scale: Some(Scale::Log),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! });
//! assert_eq!(prefs.image_opts.scale, Scale::Log);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::data_path::DataPath;
use super::preferences::{
    defaults, Colormap, GlobalOpts, HelperPort, HelperType, ImageOpts, PreferenceSet, Scale,
    GLOBAL_KEYS, IMAGE_KEYS, SECTION_KEYS,
};
use crate::codec::document::{parse_tree, DocumentFormat};
use crate::error::ConfigError;

/// What to do with keys an override document names but the schema does not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UnknownKeyPolicy {
    /// Fail with [`ConfigError::UnknownKeys`].
    #[default]
    Reject,
    /// Drop them silently.
    Ignore,
}

/// Partial preference record.  `None` means "keep the base value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PreferenceOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_opts: Option<GlobalOverrides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_opts: Option<ImageOverrides>,
}

/// Optional counterpart of [`GlobalOpts`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GlobalOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_type: Option<HelperType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_port: Option<HelperPort>,
    #[serde(default, rename = "helperCGI", skip_serializing_if = "Option::is_none")]
    pub helper_cgi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fits2png: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_proxy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<DataPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_plugins: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_wrappers: Option<String>,
}

/// Optional counterpart of [`ImageOpts`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImageOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colormap: Option<Colormap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
}

/// Merges `overrides` over the process-wide defaults.
pub fn merge(overrides: &PreferenceOverrides) -> PreferenceSet {
    defaults().merged(overrides)
}

impl PreferenceSet {
    /// Returns a copy of `self` with every field present in `overrides`
    /// replaced.
    pub fn merged(&self, overrides: &PreferenceOverrides) -> PreferenceSet {
        let mut out = self.clone();
        if let Some(global) = &overrides.global_opts {
            global.apply_to(&mut out.global_opts);
        }
        if let Some(image) = &overrides.image_opts {
            image.apply_to(&mut out.image_opts);
        }
        out
    }
}

impl GlobalOverrides {
    fn apply_to(&self, target: &mut GlobalOpts) {
        if let Some(v) = self.helper_type {
            target.helper_type = v;
        }
        if let Some(v) = self.helper_port {
            target.helper_port = v;
        }
        if let Some(v) = &self.helper_cgi {
            target.helper_cgi.clone_from(v);
        }
        if let Some(v) = self.fits2png {
            target.fits2png = v;
        }
        if let Some(v) = self.debug {
            target.debug = v;
        }
        if let Some(v) = self.load_proxy {
            target.load_proxy = v;
        }
        if let Some(v) = &self.work_dir {
            target.work_dir.clone_from(v);
        }
        if let Some(v) = &self.data_path {
            target.data_path.clone_from(v);
        }
        if let Some(v) = &self.analysis_plugins {
            target.analysis_plugins.clone_from(v);
        }
        if let Some(v) = &self.analysis_wrappers {
            target.analysis_wrappers.clone_from(v);
        }
    }
}

impl ImageOverrides {
    fn apply_to(&self, target: &mut ImageOpts) {
        if let Some(v) = self.colormap {
            target.colormap = v;
        }
        if let Some(v) = self.scale {
            target.scale = v;
        }
    }
}

impl PreferenceOverrides {
    /// `true` when merging would leave the base unchanged.
    pub fn is_empty(&self) -> bool {
        self.global_opts.is_none() && self.image_opts.is_none()
    }

    /// Combines two override sets; fields in `later` win.
    pub fn layered(&self, later: &PreferenceOverrides) -> PreferenceOverrides {
        let global_opts = match (&self.global_opts, &later.global_opts) {
            (Some(a), Some(b)) => Some(a.layered(b)),
            (a, b) => b.clone().or_else(|| a.clone()),
        };
        let image_opts = match (&self.image_opts, &later.image_opts) {
            (Some(a), Some(b)) => Some(ImageOverrides {
                colormap: b.colormap.or(a.colormap),
                scale: b.scale.or(a.scale),
            }),
            (a, b) => b.clone().or_else(|| a.clone()),
        };
        PreferenceOverrides {
            global_opts,
            image_opts,
        }
    }

    /// Parses a JSON override document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed JSON or wrongly typed values,
    /// [`ConfigError::UnknownKeys`] for unknown keys under
    /// [`UnknownKeyPolicy::Reject`].
    pub fn from_json_str(text: &str, policy: UnknownKeyPolicy) -> Result<Self, ConfigError> {
        let doc = parse_tree(text, DocumentFormat::Json)?;
        Self::from_document(doc, DocumentFormat::Json, policy)
    }

    /// Parses a TOML override document.  Same error contract as
    /// [`Self::from_json_str`].
    pub fn from_toml_str(text: &str, policy: UnknownKeyPolicy) -> Result<Self, ConfigError> {
        let doc = parse_tree(text, DocumentFormat::Toml)?;
        Self::from_document(doc, DocumentFormat::Toml, policy)
    }

    /// Parses an already decoded document tree.
    pub fn from_value(doc: Value, policy: UnknownKeyPolicy) -> Result<Self, ConfigError> {
        Self::from_document(doc, DocumentFormat::Json, policy)
    }

    pub(crate) fn from_document(
        mut doc: Value,
        format: DocumentFormat,
        policy: UnknownKeyPolicy,
    ) -> Result<Self, ConfigError> {
        let unknown = strip_unknown_keys(&mut doc);
        if !unknown.is_empty() {
            match policy {
                UnknownKeyPolicy::Reject => return Err(ConfigError::UnknownKeys(unknown)),
                UnknownKeyPolicy::Ignore => {
                    debug!(keys = ?unknown, "ignoring unknown preference keys");
                }
            }
        }

        serde_json::from_value(doc).map_err(|e| ConfigError::Parse {
            format,
            message: e.to_string(),
        })
    }
}

impl GlobalOverrides {
    fn layered(&self, later: &GlobalOverrides) -> GlobalOverrides {
        GlobalOverrides {
            helper_type: later.helper_type.or(self.helper_type),
            helper_port: later.helper_port.or(self.helper_port),
            helper_cgi: later.helper_cgi.clone().or_else(|| self.helper_cgi.clone()),
            fits2png: later.fits2png.or(self.fits2png),
            debug: later.debug.or(self.debug),
            load_proxy: later.load_proxy.or(self.load_proxy),
            work_dir: later.work_dir.clone().or_else(|| self.work_dir.clone()),
            data_path: later.data_path.clone().or_else(|| self.data_path.clone()),
            analysis_plugins: later
                .analysis_plugins
                .clone()
                .or_else(|| self.analysis_plugins.clone()),
            analysis_wrappers: later
                .analysis_wrappers
                .clone()
                .or_else(|| self.analysis_wrappers.clone()),
        }
    }
}

/// Removes keys that are not part of the schema and returns their dotted
/// paths, sorted.
///
/// Non-object documents and non-object sections are left untouched so that
/// deserialization reports them as type errors.
fn strip_unknown_keys(doc: &mut Value) -> Vec<String> {
    let mut unknown = Vec::new();
    let Some(top) = doc.as_object_mut() else {
        return unknown;
    };

    drain_unknown(top, &SECTION_KEYS, "", &mut unknown);
    if let Some(Value::Object(section)) = top.get_mut("globalOpts") {
        drain_unknown(section, &GLOBAL_KEYS, "globalOpts.", &mut unknown);
    }
    if let Some(Value::Object(section)) = top.get_mut("imageOpts") {
        drain_unknown(section, &IMAGE_KEYS, "imageOpts.", &mut unknown);
    }

    unknown.sort();
    unknown
}

fn drain_unknown(map: &mut Map<String, Value>, known: &[&str], prefix: &str, out: &mut Vec<String>) {
    let extra: Vec<String> = map
        .keys()
        .filter(|k| !known.contains(&k.as_str()))
        .cloned()
        .collect();
    for key in extra {
        map.remove(&key);
        out.push(format!("{prefix}{key}"));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
