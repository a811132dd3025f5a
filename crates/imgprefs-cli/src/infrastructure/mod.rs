//! Infrastructure layer for the preferences CLI.
//!
//! Contains OS-facing adapters.  The application layer reaches them through
//! plain functions (`storage`) or a trait (`env::EnvSource`).
//!
//! # Sub-modules
//!
//! - **`env`** – Environment variable lookup and `$NAME` placeholder
//!   expansion for path strings.  A `MapEnv` is provided for tests.
//!
//! - **`storage`** – Reading and writing the preferences file.

pub mod env;
pub mod storage;
