//! Preference file persistence.
//!
//! Reads override documents from, and writes full records to, the
//! platform-appropriate preferences file:
//! - Windows:  `%APPDATA%\imgprefs\prefs.toml`
//! - Linux:    `~/.config/imgprefs/prefs.toml` (or `$XDG_CONFIG_HOME/imgprefs`)
//! - macOS:    `~/Library/Application Support/imgprefs/prefs.toml`
//!
//! Any other path may be used as long as it ends in `.toml` or `.json`; the
//! extension decides the document format.
//!
//! ```toml
//! [globalOpts]
//! helperType = "nodejs"
//! helperPort = 2718
//!
//! [imageOpts]
//! colormap = "heat"
//! ```
//!
//! The file on disk is an override document: keys it leaves out keep their
//! built-in defaults.  A missing file is the same as an empty one, which lets
//! the application run before the user has ever saved preferences.

use std::path::{Path, PathBuf};

use imgprefs_core::{
    ConfigError, DocumentFormat, PreferenceOverrides, PreferenceSet, UnknownKeyPolicy,
};
use thiserror::Error;
use tracing::{debug, info};

/// File name used inside the platform config directory.
pub const PREFS_FILE_NAME: &str = "prefs.toml";

/// Error type for preference file operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing preferences at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but its contents are not acceptable.
    #[error("invalid preferences file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

/// Determines the platform-appropriate directory for the preferences file.
///
/// # Errors
///
/// Returns [`StorageError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, StorageError> {
    platform_config_dir().ok_or(StorageError::NoPlatformConfigDir)
}

/// Resolves the full path to the default preferences file.
///
/// # Errors
///
/// Returns [`StorageError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn prefs_file_path() -> Result<PathBuf, StorageError> {
    Ok(config_dir()?.join(PREFS_FILE_NAME))
}

/// Loads the override document at `path`, returning empty overrides if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`StorageError::Io`] for file-system errors other than "not found",
/// and [`StorageError::Config`] for an unsupported extension, malformed
/// content, or unknown keys under [`UnknownKeyPolicy::Reject`].
pub fn load_overrides(
    path: &Path,
    policy: UnknownKeyPolicy,
) -> Result<PreferenceOverrides, StorageError> {
    let format = DocumentFormat::from_path(path).map_err(|source| StorageError::Config {
        path: path.to_path_buf(),
        source,
    })?;

    match std::fs::read_to_string(path) {
        Ok(content) => {
            let overrides = PreferenceOverrides::parse(&content, format, policy).map_err(
                |source| StorageError::Config {
                    path: path.to_path_buf(),
                    source,
                },
            )?;
            info!(path = %path.display(), "loaded preference overrides");
            Ok(overrides)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no preferences file; using defaults");
            Ok(PreferenceOverrides::default())
        }
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Persists a full preference record to `path`.
///
/// Creates the parent directory if it does not exist.  The format follows the
/// file extension.
///
/// # Errors
///
/// Returns [`StorageError::Io`] for file-system failures or
/// [`StorageError::Config`] if the extension is unsupported or encoding fails.
pub fn save_preferences(path: &Path, prefs: &PreferenceSet) -> Result<(), StorageError> {
    let config_err = |source: ConfigError| StorageError::Config {
        path: path.to_path_buf(),
        source,
    };
    let format = DocumentFormat::from_path(path).map_err(config_err)?;
    let content = prefs.render(format).map_err(config_err)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    std::fs::write(path, content).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), %format, "saved preferences");
    Ok(())
}

/// Resolves the platform config base directory including the `imgprefs`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("imgprefs"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("imgprefs"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("imgprefs")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
