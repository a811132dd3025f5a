//! In-memory environment for tests.
//!
//! Mutating the real process environment from tests races with other tests
//! running in parallel.  `MapEnv` holds a fixed set of variables instead and
//! is always compiled so integration tests can use it too.
//!
//! ```
//! use imgprefs_cli::infrastructure::env::{expand_placeholders, MapEnv};
//!
//! let env = MapEnv::new([("HOME", "/home/astro")]);
//! assert_eq!(expand_placeholders("$HOME/data", &env), "/home/astro/data");
//! ```

use std::collections::HashMap;

use super::EnvSource;

/// Fixed variable table implementing [`EnvSource`].
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
