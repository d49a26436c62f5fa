//! Update-source suppression filter for both host extension points

use crate::base::{ApiError, HostConfig, HostFilter, PluginsApiArgs, RequestArgs};
use serde_json::Value;
use std::path::PathBuf;
use updateguard_core::{
    scan_plugins_dir, skips_updates, InstalledPlugins, RegistryError, SlugIndex,
};
use updateguard_telemetry::Paths;
use url::Url;

/// Central registry API host receiving update checks
pub const API_HOST: &str = "api.wordpress.org";

/// Plugin update-check endpoint for the one supported API version.
// TODO: revisit if the registry ships another update-check version such as
// /plugins/update-check/1.2/ — the match stays exact until then.
pub const UPDATE_CHECK_PATH: &str = "/plugins/update-check/1.1/";

/// Metadata query action this filter may block
pub const PLUGIN_INFORMATION_ACTION: &str = "plugin_information";

/// Error code returned for blocked metadata lookups
pub const BLOCKED_ERROR_CODE: &str = "plugins_api_failed";

/// Fixed message accompanying [`BLOCKED_ERROR_CODE`]
pub const BLOCKED_ERROR_MESSAGE: &str = "Request for plugin with Update URI blocked.";

/// Source of the installed-plugin registry
pub trait RegistryProvider: Send + Sync {
    fn load(&self) -> Result<InstalledPlugins, RegistryError>;
}

/// Loads the registry by scanning the host's plugins directory
pub struct DiskRegistry {
    plugins_dir: PathBuf,
}

impl DiskRegistry {
    pub fn new(plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
        }
    }
}

impl RegistryProvider for DiskRegistry {
    fn load(&self) -> Result<InstalledPlugins, RegistryError> {
        scan_plugins_dir(&self.plugins_dir)
    }
}

/// Fixed registry, for hosts that preload plugin data and for tests
pub struct StaticRegistry {
    plugins: InstalledPlugins,
}

impl StaticRegistry {
    pub fn new(plugins: InstalledPlugins) -> Self {
        Self { plugins }
    }
}

impl RegistryProvider for StaticRegistry {
    fn load(&self) -> Result<InstalledPlugins, RegistryError> {
        Ok(self.plugins.clone())
    }
}

/// Keeps plugins that declare an external update source out of outbound
/// update-check payloads, and blocks single-plugin metadata lookups for
/// them. Everything that does not match exactly passes through untouched.
pub struct UpdateUriFilter {
    name: String,
    registry: Box<dyn RegistryProvider>,
    cache: Option<(InstalledPlugins, SlugIndex)>,
}

impl UpdateUriFilter {
    /// Create a filter reading the registry from the host's plugins
    /// directory (config override honored)
    pub fn new() -> Self {
        Self::with_registry(Box::new(DiskRegistry::new(default_plugins_dir())))
    }

    pub fn with_registry(registry: Box<dyn RegistryProvider>) -> Self {
        Self {
            name: "update-uri".to_string(),
            registry,
            cache: None,
        }
    }

    /// Installed plugins and slug index, loaded once on first use and held
    /// for the filter's lifetime. A registry that fails to load behaves as
    /// empty: nothing suppresses.
    fn registry_cache(&mut self) -> &(InstalledPlugins, SlugIndex) {
        let registry = &self.registry;
        self.cache.get_or_insert_with(|| {
            let plugins = registry.load().unwrap_or_default();
            let index = SlugIndex::build(&plugins);
            (plugins, index)
        })
    }

    /// Whether a metadata lookup for this slug resolves to an installed
    /// plugin whose update source suppresses registry traffic
    fn blocks_lookup(&mut self, slug: &str) -> bool {
        let (plugins, index) = self.registry_cache();
        let Some(plugin_file) = index.plugin_file(slug) else {
            return false;
        };
        let Some(headers) = plugins.get(plugin_file) else {
            return false;
        };
        skips_updates(headers.update_uri())
    }
}

impl Default for UpdateUriFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl HostFilter for UpdateUriFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Keeps plugins with an external update source out of wordpress.org update checks"
    }

    fn on_http_request_args(&mut self, args: RequestArgs, url: &str) -> RequestArgs {
        // Every guard fails open: anything unexpected returns the original
        // arguments so the host's update mechanism keeps working.
        let Ok(target) = Url::parse(url) else {
            return args;
        };
        let Some(host) = target.host_str() else {
            return args;
        };
        if !host.eq_ignore_ascii_case(API_HOST) {
            return args;
        }
        if target.path() != UPDATE_CHECK_PATH {
            return args;
        }
        if args.method.as_deref() != Some("POST") {
            return args;
        }
        let Some(body) = &args.body else {
            return args;
        };
        let Some(plugins_field) = body.get("plugins").and_then(Value::as_str) else {
            return args;
        };
        let Ok(payload) = serde_json::from_str::<Value>(plugins_field) else {
            return args;
        };
        let (Some(plugins), Some(active)) = (
            payload.get("plugins").and_then(Value::as_object),
            payload.get("active").and_then(Value::as_array),
        ) else {
            return args;
        };

        let kept_plugins: serde_json::Map<String, Value> = plugins
            .iter()
            .filter(|(_, headers)| !descriptor_suppressed(headers))
            .map(|(plugin_file, headers)| (plugin_file.clone(), headers.clone()))
            .collect();

        // Active entries are removed only when the descriptor they point at
        // is present and suppressed; unknown entries stay.
        let kept_active: Vec<Value> = active
            .iter()
            .filter(|entry| {
                entry
                    .as_str()
                    .and_then(|plugin_file| plugins.get(plugin_file))
                    .map(|headers| !descriptor_suppressed(headers))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();

        let removed = plugins.len() - kept_plugins.len();
        if removed == 0 && kept_active.len() == active.len() {
            return args;
        }

        let filtered = serde_json::json!({
            "plugins": kept_plugins,
            "active": kept_active,
        });
        let Ok(encoded) = serde_json::to_string(&filtered) else {
            return args;
        };

        let mut args = args;
        if let Some(body) = args.body.as_mut() {
            body.insert("plugins".to_string(), Value::String(encoded));
        }
        tracing::debug!(removed, "removed externally updated plugins from update check");
        args
    }

    fn on_plugins_api(
        &mut self,
        result: Option<Value>,
        action: &str,
        args: &PluginsApiArgs,
    ) -> Option<Value> {
        if action != PLUGIN_INFORMATION_ACTION {
            return result;
        }
        let Some(slug) = args.slug.as_deref() else {
            return result;
        };
        if !self.blocks_lookup(slug) {
            return result;
        }

        tracing::debug!(slug, "blocked metadata lookup for externally updated plugin");
        Some(ApiError::new(BLOCKED_ERROR_CODE, BLOCKED_ERROR_MESSAGE).into_result())
    }
}

/// A wire descriptor suppresses when it is an object whose UpdateURI value
/// is an external source. Anything else is kept.
fn descriptor_suppressed(headers: &Value) -> bool {
    let update_uri = headers
        .as_object()
        .and_then(|fields| fields.get("UpdateURI"))
        .and_then(Value::as_str);
    skips_updates(update_uri)
}

fn default_plugins_dir() -> PathBuf {
    match Paths::new() {
        Ok(paths) => HostConfig::load(&paths).plugins_dir(&paths),
        Err(_) => PathBuf::from("wp-content/plugins"),
    }
}
