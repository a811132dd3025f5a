//! # imgprefs-core
//!
//! Default preferences for the imaging application, plus the operations that
//! derive an effective preference record from them.
//!
//! This crate has no dependencies on OS APIs.  It never opens the paths it
//! stores and never expands the `$HOME`-style placeholders inside them; that
//! is the consuming application's job (see the `imgprefs-cli` crate).
//!
//! # Architecture overview
//!
//! - **`domain`** – The typed preference record ([`PreferenceSet`]), the
//!   process-wide default instance, partial overrides and `merge`.
//!
//! - **`codec`** – How a preference record travels to and from disk: JSON or
//!   TOML documents with the camelCase keys the application has always used.
//!
//! ```rust
//! use imgprefs_core::{get_defaults, merge, PreferenceOverrides};
//!
//! let prefs = merge(&PreferenceOverrides::default());
//! assert_eq!(prefs, get_defaults());
//! assert_eq!(prefs.global_opts.helper_port.get(), 2718);
//! ```

pub mod codec;
pub mod domain;
pub mod error;

// Re-export the most-used types at the crate root so callers can write
// `imgprefs_core::PreferenceSet` instead of the full module path.
pub use codec::document::{merge_document, DocumentFormat};
pub use domain::data_path::DataPath;
pub use domain::overrides::{
    merge, GlobalOverrides, ImageOverrides, PreferenceOverrides, UnknownKeyPolicy,
};
pub use domain::preferences::{
    defaults, get_defaults, Colormap, GlobalOpts, HelperPort, HelperType, ImageOpts,
    PreferenceSet, Scale,
};
pub use error::ConfigError;
