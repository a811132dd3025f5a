//! Writing a fresh preferences file.

use std::path::{Path, PathBuf};

use imgprefs_core::defaults;
use tracing::info;

use super::resolve::ResolveError;
use crate::infrastructure::storage::config::{prefs_file_path, save_preferences, StorageError};

/// Writes the built-in defaults to `target` (or the platform default
/// location) and returns the path written.
///
/// An existing file is only replaced when `force` is set.
///
/// # Errors
///
/// [`StorageError::Io`] with kind `AlreadyExists` when the file exists and
/// `force` is false; any error from [`save_preferences`].
pub fn write_default_preferences(
    target: Option<&Path>,
    force: bool,
) -> Result<PathBuf, ResolveError> {
    let path = match target {
        Some(p) => p.to_path_buf(),
        None => prefs_file_path()?,
    };

    if path.exists() && !force {
        return Err(StorageError::Io {
            path,
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "preferences file already exists (use --force to overwrite)",
            ),
        }
        .into());
    }

    save_preferences(&path, defaults())?;
    info!(path = %path.display(), "wrote default preferences");
    Ok(path)
}
