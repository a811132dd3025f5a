//! Storage infrastructure: preference file persistence.
//!
//! The `config` sub-module handles:
//!
//! - Locating the preferences file in the platform-appropriate directory.
//! - Reading it as an override document (absent file means no overrides).
//! - Writing a full preference record back to disk.

pub mod config;
