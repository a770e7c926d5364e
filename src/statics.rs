//! Static variable overlay merged into the generated inventory.
//!
//! The overlay is an optional JSON document mapping host or group names to
//! variable objects. Host entries seed the `_meta.hostvars` section before
//! the collector-supplied `ansible_host` is set; group entries become the
//! group's `vars`. A missing file yields an empty overlay, while a present
//! but undecodable file aborts the run.

use std::{collections::BTreeMap, fs, io, path::Path};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{self, Error};

/// Hardcoded variables declared per host or group name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct StaticVars {
    entries: BTreeMap<String, Map<String, Value>>,
}

impl StaticVars {
    /// Returns the declared variables for `name`, or an empty map when the
    /// overlay has no entry for it.
    pub fn vars_for(&self, name: &str) -> Map<String, Value> {
        self.entries.get(name).cloned().unwrap_or_default()
    }

    /// Reports whether the overlay declares any variables at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loads the static variable overlay from the provided JSON file path.
///
/// A missing file is not an error: the overlay is optional and resolves to
/// empty.
///
/// # Errors
///
/// Returns an [`Error`] when the file exists but cannot be read or decoded.
pub fn load_static_vars(path: &Path) -> Result<StaticVars, Error> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            return Ok(StaticVars::default());
        }
        Err(source) => return Err(error::io_error(path, source)),
    };

    parse_static_vars(path, &contents)
}

/// Parses the static variable overlay from the provided JSON string.
///
/// # Errors
///
/// Returns [`Error::StaticVars`](Error::StaticVars) when the document is not
/// a JSON object of variable objects.
pub fn parse_static_vars(path: &Path, contents: &str) -> Result<StaticVars, Error> {
    serde_json::from_str(contents).map_err(|source| error::static_vars_error(path, source))
}
