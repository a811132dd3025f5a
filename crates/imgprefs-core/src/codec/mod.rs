//! Preference document encoding.
//!
//! Preferences are stored as JSON (the format existing installations ship)
//! or TOML (friendlier to edit by hand).  Both use the same camelCase keys.

pub mod document;
