//! The `dataPath` preference.
//!
//! On disk the value is one string with entries separated by `:`, e.g.
//! `"$HOME/Desktop:$HOME/data"`.  In memory it is an ordered list so callers
//! never split strings themselves.  Placeholders are kept verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between entries in the serialized form.
pub const SEPARATOR: char = ':';

/// Ordered sequence of directory strings searched for data files.
///
/// Empty segments (`"a::b"`, leading or trailing `:`) are dropped when
/// parsing, so every stored entry is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DataPath {
    entries: Vec<String>,
}

impl DataPath {
    /// Builds a data path from individual entries, skipping empty ones.
    ///
    /// An entry containing `:` becomes several entries, exactly as it would
    /// after being written out and read back.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Vec::new();
        for entry in entries {
            let entry: String = entry.into();
            out.extend(
                entry
                    .split(SEPARATOR)
                    .filter(|e| !e.is_empty())
                    .map(str::to_string),
            );
        }
        Self { entries: out }
    }

    /// Parses the colon-delimited form.
    pub fn parse(joined: &str) -> Self {
        Self::from_entries(joined.split(SEPARATOR))
    }

    /// Entries in search order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for entry in &self.entries {
            if !first {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(entry)?;
            first = false;
        }
        Ok(())
    }
}

impl From<String> for DataPath {
    fn from(joined: String) -> Self {
        Self::parse(&joined)
    }
}

impl From<&str> for DataPath {
    fn from(joined: &str) -> Self {
        Self::parse(joined)
    }
}

impl From<DataPath> for String {
    fn from(path: DataPath) -> Self {
        path.to_string()
    }
}
