//! The preference record and its built-in defaults.
//!
//! Wire keys are camelCase (`globalOpts.helperPort`, `imageOpts.colormap`)
//! to stay compatible with existing preference files.  Full-record parsing is
//! strict: every key must be present and no unknown key is accepted.  Use
//! [`crate::PreferenceOverrides`] for partial documents.
//!
//! # Default record
//!
//! | Key                          | Default                      |
//! |------------------------------|------------------------------|
//! | globalOpts.helperType        | `none`                       |
//! | globalOpts.helperPort        | `2718`                       |
//! | globalOpts.helperCGI         | `./cgi-bin/js9Helper.cgi`    |
//! | globalOpts.fits2png          | `false`                      |
//! | globalOpts.debug             | `0`                          |
//! | globalOpts.loadProxy         | `false`                      |
//! | globalOpts.workDir           | `./tmp`                      |
//! | globalOpts.dataPath          | `$HOME/Desktop:$HOME/data`   |
//! | globalOpts.analysisPlugins   | `./analysis-plugins`         |
//! | globalOpts.analysisWrappers  | `./analysis-wrappers`        |
//! | imageOpts.colormap           | `grey`                       |
//! | imageOpts.scale              | `linear`                     |

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::data_path::DataPath;
use crate::error::ConfigError;

/// Top-level section names.
pub const SECTION_KEYS: [&str; 2] = ["globalOpts", "imageOpts"];

/// Keys accepted inside `globalOpts`.
pub const GLOBAL_KEYS: [&str; 10] = [
    "helperType",
    "helperPort",
    "helperCGI",
    "fits2png",
    "debug",
    "loadProxy",
    "workDir",
    "dataPath",
    "analysisPlugins",
    "analysisWrappers",
];

/// Keys accepted inside `imageOpts`.
pub const IMAGE_KEYS: [&str; 2] = ["colormap", "scale"];

static DEFAULTS: LazyLock<PreferenceSet> = LazyLock::new(PreferenceSet::default);

/// Borrows the process-wide default record.
///
/// Built on first access and never mutated afterwards, so it can be read from
/// any thread without locking.
pub fn defaults() -> &'static PreferenceSet {
    &DEFAULTS
}

/// Returns an owned copy of the default record.
pub fn get_defaults() -> PreferenceSet {
    defaults().clone()
}

// ── Field types ───────────────────────────────────────────────────────────────

/// Kind of helper backend the application talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelperType {
    /// No helper; server-side analysis is disabled.
    #[default]
    #[serde(rename = "none")]
    None,
    /// Node.js helper reached over socket.io.
    #[serde(rename = "nodejs")]
    NodeJs,
    /// Generic socket.io helper.
    #[serde(rename = "sock.io")]
    SockIo,
    /// CGI helper called with HTTP GET.
    #[serde(rename = "get")]
    Get,
    /// CGI helper called with HTTP POST.
    #[serde(rename = "post")]
    Post,
}

impl HelperType {
    pub fn as_str(self) -> &'static str {
        match self {
            HelperType::None => "none",
            HelperType::NodeJs => "nodejs",
            HelperType::SockIo => "sock.io",
            HelperType::Get => "get",
            HelperType::Post => "post",
        }
    }
}

impl fmt::Display for HelperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TCP port of the helper, always within `1..=65535`.
///
/// Deserialization goes through `i64` so that `0`, negative values and values
/// above 65535 are reported as a [`ConfigError::Invalid`] rather than a
/// generic integer overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct HelperPort(u16);

impl HelperPort {
    pub const DEFAULT: HelperPort = HelperPort(2718);

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for port `0`.
    pub fn new(port: u16) -> Result<Self, ConfigError> {
        Self::try_from(i64::from(port))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl Default for HelperPort {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for HelperPort {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u16::try_from(value) {
            Ok(port) if port != 0 => Ok(HelperPort(port)),
            _ => Err(ConfigError::invalid(
                "globalOpts.helperPort",
                format!("{value} is outside the TCP port range 1..=65535"),
            )),
        }
    }
}

impl From<HelperPort> for u16 {
    fn from(port: HelperPort) -> Self {
        port.0
    }
}

impl fmt::Display for HelperPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Colour palette applied to newly displayed images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Grey,
    Red,
    Green,
    Blue,
    A,
    B,
    Bb,
    He,
    I8,
    Aips0,
    Sls,
    Hsv,
    Heat,
    Cool,
    Rainbow,
    Standard,
    Staircase,
    Color,
}

impl Colormap {
    pub const ALL: [Colormap; 18] = [
        Colormap::Grey,
        Colormap::Red,
        Colormap::Green,
        Colormap::Blue,
        Colormap::A,
        Colormap::B,
        Colormap::Bb,
        Colormap::He,
        Colormap::I8,
        Colormap::Aips0,
        Colormap::Sls,
        Colormap::Hsv,
        Colormap::Heat,
        Colormap::Cool,
        Colormap::Rainbow,
        Colormap::Standard,
        Colormap::Staircase,
        Colormap::Color,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Colormap::Grey => "grey",
            Colormap::Red => "red",
            Colormap::Green => "green",
            Colormap::Blue => "blue",
            Colormap::A => "a",
            Colormap::B => "b",
            Colormap::Bb => "bb",
            Colormap::He => "he",
            Colormap::I8 => "i8",
            Colormap::Aips0 => "aips0",
            Colormap::Sls => "sls",
            Colormap::Hsv => "hsv",
            Colormap::Heat => "heat",
            Colormap::Cool => "cool",
            Colormap::Rainbow => "rainbow",
            Colormap::Standard => "standard",
            Colormap::Staircase => "staircase",
            Colormap::Color => "color",
        }
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intensity scaling function applied to image pixel values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Linear,
    Log,
    Histeq,
    Power,
    Sqrt,
    Squared,
    Asinh,
    Sinh,
}

impl Scale {
    pub fn as_str(self) -> &'static str {
        match self {
            Scale::Linear => "linear",
            Scale::Log => "log",
            Scale::Histeq => "histeq",
            Scale::Power => "power",
            Scale::Sqrt => "sqrt",
            Scale::Squared => "squared",
            Scale::Asinh => "asinh",
            Scale::Sinh => "sinh",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Record types ──────────────────────────────────────────────────────────────

/// Complete preference record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PreferenceSet {
    pub global_opts: GlobalOpts,
    pub image_opts: ImageOpts,
}

/// Application-wide settings: helper connection, working paths, plugins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GlobalOpts {
    pub helper_type: HelperType,
    pub helper_port: HelperPort,
    /// Path of the CGI script used by the `get`/`post` helper types.
    #[serde(rename = "helperCGI")]
    pub helper_cgi: String,
    /// Convert FITS images to PNG on the helper before display.
    pub fits2png: bool,
    /// Verbosity of diagnostic output; `0` disables it.
    pub debug: u32,
    pub load_proxy: bool,
    pub work_dir: String,
    pub data_path: DataPath,
    pub analysis_plugins: String,
    pub analysis_wrappers: String,
}

/// Presentation defaults for newly loaded images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImageOpts {
    pub colormap: Colormap,
    pub scale: Scale,
}

fn default_helper_cgi() -> String {
    "./cgi-bin/js9Helper.cgi".to_string()
}
fn default_work_dir() -> String {
    "./tmp".to_string()
}
fn default_data_path() -> DataPath {
    DataPath::parse("$HOME/Desktop:$HOME/data")
}
fn default_analysis_plugins() -> String {
    "./analysis-plugins".to_string()
}
fn default_analysis_wrappers() -> String {
    "./analysis-wrappers".to_string()
}

impl Default for GlobalOpts {
    fn default() -> Self {
        Self {
            helper_type: HelperType::None,
            helper_port: HelperPort::DEFAULT,
            helper_cgi: default_helper_cgi(),
            fits2png: false,
            debug: 0,
            load_proxy: false,
            work_dir: default_work_dir(),
            data_path: default_data_path(),
            analysis_plugins: default_analysis_plugins(),
            analysis_wrappers: default_analysis_wrappers(),
        }
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

impl PreferenceSet {
    /// Checks the invariants that the type system does not already enforce.
    ///
    /// Path strings must be non-blank and free of NUL bytes.  Existence on
    /// disk is not checked.
    ///
    /// # Errors
    ///
    /// Returns the first violation as [`ConfigError::Invalid`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.global_opts;
        check_path("globalOpts.helperCGI", &g.helper_cgi)?;
        check_path("globalOpts.workDir", &g.work_dir)?;
        check_path("globalOpts.analysisPlugins", &g.analysis_plugins)?;
        check_path("globalOpts.analysisWrappers", &g.analysis_wrappers)?;
        for entry in g.data_path.iter() {
            check_path("globalOpts.dataPath", entry)?;
        }
        Ok(())
    }
}

fn check_path(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::invalid(field, "path must not be empty"));
    }
    if value.contains('\0') {
        return Err(ConfigError::invalid(field, "path must not contain NUL"));
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_defaults_global_opts_match_builtin_values() {
        // Arrange / Act
        let g = &defaults().global_opts;

        // Assert
        assert_eq!(g.helper_type, HelperType::None);
        assert_eq!(g.helper_port.get(), 2718);
        assert_eq!(g.helper_cgi, "./cgi-bin/js9Helper.cgi");
        assert!(!g.fits2png);
        assert_eq!(g.debug, 0);
        assert!(!g.load_proxy);
        assert_eq!(g.work_dir, "./tmp");
        assert_eq!(g.data_path.entries(), ["$HOME/Desktop", "$HOME/data"]);
        assert_eq!(g.analysis_plugins, "./analysis-plugins");
        assert_eq!(g.analysis_wrappers, "./analysis-wrappers");
    }

    #[test]
    fn test_defaults_image_opts_are_grey_linear() {
        let i = &defaults().image_opts;
        assert_eq!(i.colormap, Colormap::Grey);
        assert_eq!(i.scale, Scale::Linear);
    }

    #[test]
    fn test_defaults_returns_same_instance_every_call() {
        assert!(std::ptr::eq(defaults(), defaults()));
    }

    #[test]
    fn test_get_defaults_is_an_independent_copy() {
        let mut copy = get_defaults();
        copy.image_opts.scale = Scale::Log;

        assert_eq!(defaults().image_opts.scale, Scale::Linear);
    }

    #[test]
    fn test_defaults_pass_validation() {
        assert_eq!(defaults().validate(), Ok(()));
    }

    #[test]
    fn test_defaults_readable_from_many_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| defaults().global_opts.helper_port.get()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().expect("reader thread"), 2718);
        }
    }

    // ── Serialized shape ──────────────────────────────────────────────────────

    #[test]
    fn test_serialized_keys_match_schema_key_lists() {
        let value = serde_json::to_value(defaults()).expect("serialize");
        let mut top: Vec<&str> = value
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        top.sort_unstable();
        assert_eq!(top, SECTION_KEYS);

        let mut global: Vec<&str> = value["globalOpts"]
            .as_object()
            .expect("globalOpts object")
            .keys()
            .map(String::as_str)
            .collect();
        global.sort_unstable();
        let mut expected_global = GLOBAL_KEYS.to_vec();
        expected_global.sort_unstable();
        assert_eq!(global, expected_global);

        let mut image: Vec<&str> = value["imageOpts"]
            .as_object()
            .expect("imageOpts object")
            .keys()
            .map(String::as_str)
            .collect();
        image.sort_unstable();
        assert_eq!(image, IMAGE_KEYS);
    }

    #[test]
    fn test_helper_type_wire_names() {
        let names: Vec<String> = [
            HelperType::None,
            HelperType::NodeJs,
            HelperType::SockIo,
            HelperType::Get,
            HelperType::Post,
        ]
        .iter()
        .map(|t| serde_json::to_string(t).expect("serialize"))
        .collect();
        assert_eq!(
            names,
            ["\"none\"", "\"nodejs\"", "\"sock.io\"", "\"get\"", "\"post\""]
        );
    }

    #[test]
    fn test_colormap_display_matches_wire_name() {
        for cmap in Colormap::ALL {
            let wire = serde_json::to_string(&cmap).expect("serialize");
            assert_eq!(wire, format!("\"{cmap}\""));
        }
    }

    #[test]
    fn test_unknown_scale_name_is_rejected() {
        let result: Result<Scale, _> = serde_json::from_str("\"cubic\"");
        assert!(result.is_err());
    }

    // ── HelperPort ────────────────────────────────────────────────────────────

    #[test]
    fn test_helper_port_accepts_range_bounds() {
        assert_eq!(HelperPort::try_from(1_i64).map(HelperPort::get), Ok(1));
        assert_eq!(HelperPort::try_from(65535_i64).map(HelperPort::get), Ok(65535));
    }

    #[test]
    fn test_helper_port_rejects_zero_negative_and_too_large() {
        for bad in [0_i64, -1, 65536, 70000] {
            let err = HelperPort::try_from(bad).expect_err("must reject");
            assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "globalOpts.helperPort"));
        }
        assert!(HelperPort::new(0).is_err());
    }

    #[test]
    fn test_helper_port_deserialize_out_of_range_fails() {
        let result: Result<HelperPort, _> = serde_json::from_str("70000");
        let message = result.expect_err("must fail").to_string();
        assert!(message.contains("1..=65535"), "got {message}");
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn test_validate_rejects_blank_work_dir() {
        let mut prefs = get_defaults();
        prefs.global_opts.work_dir = "   ".to_string();

        let err = prefs.validate().expect_err("blank path must fail");

        assert_eq!(
            err,
            ConfigError::invalid("globalOpts.workDir", "path must not be empty")
        );
    }

    #[test]
    fn test_validate_rejects_nul_in_helper_cgi() {
        let mut prefs = get_defaults();
        prefs.global_opts.helper_cgi = "./cgi\0bin".to_string();
        assert!(prefs.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_empty_data_path() {
        let mut prefs = get_defaults();
        prefs.global_opts.data_path = DataPath::default();
        assert_eq!(prefs.validate(), Ok(()));
    }
}
