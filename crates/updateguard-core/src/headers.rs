//! Plugin header block parsing

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Recognized header fields, paired with the registry key they are stored
/// under. First occurrence in the file wins.
const HEADER_FIELDS: &[(&str, &str)] = &[
    ("Plugin Name", "PluginName"),
    ("Plugin URI", "PluginURI"),
    ("Version", "Version"),
    ("Description", "Description"),
    ("Author", "Author"),
    ("Author URI", "AuthorURI"),
    ("Requires at least", "RequiresWP"),
    ("Requires PHP", "RequiresPHP"),
    ("Update URI", "UpdateURI"),
];

/// How much of a plugin's main file is searched for the header block.
pub const HEADER_SEARCH_BYTES: usize = 8192;

/// Parsed header mapping for one installed plugin (registry key -> value),
/// matching the descriptor shape sent on the wire during update checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginHeaders {
    #[serde(flatten)]
    pub fields: HashMap<String, String>,
}

impl PluginHeaders {
    /// Look up a header value, treating empty values as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.get("PluginName")
    }

    pub fn update_uri(&self) -> Option<&str> {
        self.get("UpdateURI")
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }
}

/// Parse the header block at the top of a plugin's main file.
///
/// Only the first [`HEADER_SEARCH_BYTES`] are searched. Header lines have
/// the form `Field: value`, usually inside the leading comment block;
/// comment decoration around them is stripped.
pub fn parse_headers(contents: &str) -> PluginHeaders {
    let mut headers = PluginHeaders::default();

    for line in head(contents, HEADER_SEARCH_BYTES).lines() {
        let line = line.trim_start_matches([' ', '\t', '/', '*', '#', '@']);

        for (field, key) in HEADER_FIELDS {
            if headers.fields.contains_key(*key) {
                continue;
            }
            let Some(rest) = line.strip_prefix(field) else {
                continue;
            };
            let Some(value) = rest.strip_prefix(':') else {
                continue;
            };
            let value = value.trim().trim_end_matches("*/").trim();
            headers.fields.insert((*key).to_string(), value.to_string());
        }
    }

    headers
}

/// Truncate to at most `max_bytes` without splitting a UTF-8 character.
fn head(contents: &str, max_bytes: usize) -> &str {
    if contents.len() <= max_bytes {
        return contents;
    }
    let mut end = max_bytes;
    while !contents.is_char_boundary(end) {
        end -= 1;
    }
    &contents[..end]
}
