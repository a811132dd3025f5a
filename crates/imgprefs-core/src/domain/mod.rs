//! Domain types for the preference record.
//!
//! Pure data and pure functions: nothing in here touches the file system,
//! the environment or the network.  Outer layers (the CLI) decide where a
//! preference document comes from and what to do with the paths inside it.

/// Ordered list of data directories stored as a colon-delimited string.
pub mod data_path;

/// Partial override documents and the merge operation.
pub mod overrides;

/// The full preference record and its process-wide default instance.
///
/// See [`preferences::PreferenceSet`] for the main type.
pub mod preferences;
