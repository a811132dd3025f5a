//! Application layer: use cases of the preferences CLI.
//!
//! - **`resolve`** – Builds the effective preferences from defaults, the
//!   preferences file and command-line overrides.
//! - **`init_prefs`** – Writes the defaults out as a starting preferences file.

pub mod init_prefs;
pub mod resolve;
