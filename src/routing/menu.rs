//! Menu table module
//!
//! A menu maps request paths to content entries. Menus are declared as
//! named JSON files under the content directory (`_menu_<name>.json`) and
//! merged in the configured order. The merge is left-biased: a path
//! declared by an earlier menu is never overridden by a later one.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

use crate::config::SiteConfig;
use crate::error::SiteError;
use crate::logger;

/// A single path-to-content mapping
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MenuEntry {
    /// Content file (without extension) under the content directory
    pub file: String,
    /// Class set on the body element; an empty string in source JSON
    /// reads as absent
    #[serde(default, deserialize_with = "empty_as_none")]
    pub body_class: Option<String>,
    /// Layout template name; absent means the configured default applies
    #[serde(default, deserialize_with = "empty_as_none")]
    pub layout: Option<String>,
}

/// The merged path table
#[derive(Debug, Default, Clone)]
pub struct Menu {
    entries: HashMap<String, MenuEntry>,
}

impl Menu {
    /// Load and merge the menu files named in the site configuration.
    ///
    /// A missing menu file contributes no entries and logs a warning; a
    /// present but malformed file is a startup error.
    pub fn load(site: &SiteConfig) -> Result<Self, SiteError> {
        let mut menu = Self::default();

        for name in &site.menus {
            let path = site.content_dir().join(format!("_menu_{name}.json"));
            match std::fs::read_to_string(&path) {
                Ok(raw) => {
                    let entries: HashMap<String, MenuEntry> = serde_json::from_str(&raw)
                        .map_err(|source| SiteError::Json {
                            path: path.display().to_string(),
                            source,
                        })?;
                    menu.merge(entries);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    logger::log_warning(&format!("Menu file not found: {}", path.display()));
                }
                Err(source) => {
                    return Err(SiteError::Io {
                        path: path.display().to_string(),
                        source,
                    });
                }
            }
        }

        Ok(menu)
    }

    /// Look up the entry for a path (already stripped of its leading slash)
    pub fn get(&self, path: &str) -> Option<&MenuEntry> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge entries, keeping existing keys
    fn merge(&mut self, entries: HashMap<String, MenuEntry>) {
        for (path, entry) in entries {
            self.entries.entry(path).or_insert(entry);
        }
    }
}

impl FromIterator<(String, MenuEntry)> for Menu {
    /// Left-biased, like `load`: the first entry for a path wins.
    fn from_iter<I: IntoIterator<Item = (String, MenuEntry)>>(iter: I) -> Self {
        let mut menu = Self::default();
        for (path, entry) in iter {
            menu.entries.entry(path).or_insert(entry);
        }
        menu
    }
}

/// Deserialize an optional string, treating `""` as absent
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
