//! Installed-plugin registry: discovery, loading, slug index

use crate::headers::{parse_headers, PluginHeaders, HEADER_SEARCH_BYTES};
use crate::slug::plugin_slug;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Mapping of plugin file (registry key) to its parsed headers
pub type InstalledPlugins = HashMap<String, PluginHeaders>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read plugin directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Scan a plugins directory the way the host discovers installed plugins:
/// top-level `*.php` files plus one level of `<dir>/<file>.php`.
///
/// A file counts as a plugin only if its header block declares a plugin
/// name. Unreadable files are skipped; a missing directory yields an empty
/// registry.
pub fn scan_plugins_dir(dir: &Path) -> Result<InstalledPlugins, RegistryError> {
    let mut plugins = InstalledPlugins::new();

    if !dir.is_dir() {
        return Ok(plugins);
    }

    for entry in read_dir(dir)? {
        let path = entry.path();
        let Some(entry_name) = file_name(&path) else {
            continue;
        };

        if path.is_dir() {
            let Ok(sub_entries) = std::fs::read_dir(&path) else {
                continue;
            };
            for sub_entry in sub_entries.flatten() {
                let sub_path = sub_entry.path();
                if !is_php_file(&sub_path) {
                    continue;
                }
                let Some(sub_name) = file_name(&sub_path) else {
                    continue;
                };
                if let Some(headers) = read_plugin_headers(&sub_path) {
                    plugins.insert(format!("{}/{}", entry_name, sub_name), headers);
                }
            }
        } else if is_php_file(&path) {
            if let Some(headers) = read_plugin_headers(&path) {
                plugins.insert(entry_name, headers);
            }
        }
    }

    tracing::debug!(count = plugins.len(), "scanned installed plugins");
    Ok(plugins)
}

fn read_dir(dir: &Path) -> Result<impl Iterator<Item = std::fs::DirEntry>, RegistryError> {
    let entries = std::fs::read_dir(dir).map_err(|source| RegistryError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(entries.flatten())
}

fn is_php_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "php")
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

/// Read and parse one plugin file's header block. Returns None for files
/// that cannot be read or declare no plugin name.
fn read_plugin_headers(path: &Path) -> Option<PluginHeaders> {
    let file = File::open(path).ok()?;
    let mut buf = Vec::with_capacity(HEADER_SEARCH_BYTES);
    file.take(HEADER_SEARCH_BYTES as u64)
        .read_to_end(&mut buf)
        .ok()?;

    let contents = String::from_utf8_lossy(&buf);
    let headers = parse_headers(&contents);
    if headers.name().is_none() {
        return None;
    }
    Some(headers)
}

/// Read-through index from plugin slug to plugin file, built once from the
/// installed registry and reused for every lookup after that.
#[derive(Debug, Clone, Default)]
pub struct SlugIndex {
    map: HashMap<String, String>,
}

impl SlugIndex {
    pub fn build(plugins: &InstalledPlugins) -> Self {
        let mut map = HashMap::new();
        for plugin_file in plugins.keys() {
            map.insert(plugin_slug(plugin_file), plugin_file.clone());
        }
        Self { map }
    }

    /// Resolve a slug to the plugin file it was derived from.
    pub fn plugin_file(&self, slug: &str) -> Option<&str> {
        self.map.get(slug).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
