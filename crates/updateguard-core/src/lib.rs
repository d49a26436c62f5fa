//! Core suppression rules and installed-plugin registry

mod headers;
mod registry;
mod slug;
mod suppress;

pub use headers::{parse_headers, PluginHeaders, HEADER_SEARCH_BYTES};
pub use registry::{scan_plugins_dir, InstalledPlugins, RegistryError, SlugIndex};
pub use slug::plugin_slug;
pub use suppress::skips_updates;
