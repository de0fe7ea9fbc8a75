//! Content store module
//!
//! Lookups against the content directory: the page fragment itself plus
//! its JSON sidecars (`<page>_meta.json`, `<page>_modules.json`).
//! Absence is an expected outcome and reported as `None`, never an error.

use serde::de::DeserializeOwned;
use std::path::PathBuf;

use crate::logger;

use super::modules::PageModules;

/// Filesystem content store rooted at the content directory
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Whether the content fragment for `page` exists.
    /// This is the resolution-time existence check.
    pub fn page_exists(&self, page: &str) -> bool {
        self.root.join(format!("{page}.html")).is_file()
    }

    /// Page metadata from `<page>_meta.json`
    pub fn load_meta(&self, page: &str) -> Option<serde_json::Value> {
        self.load_json(&format!("{page}_meta"))
    }

    /// Module placement map from `<page>_modules.json`
    pub fn load_modules(&self, page: &str) -> Option<PageModules> {
        self.load_json(&format!("{page}_modules"))
    }

    /// Read and parse a JSON resource under the content root.
    ///
    /// A missing file is `None`. A present but malformed file is also
    /// `None` with an error log; a broken sidecar must not take the page
    /// down.
    fn load_json<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.root.join(format!("{name}.json"));
        let raw = std::fs::read_to_string(&path).ok()?;

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                logger::log_error(&format!("Malformed JSON in '{}': {e}", path.display()));
                None
            }
        }
    }
}
