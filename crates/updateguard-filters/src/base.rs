//! Base filter trait and host payload types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use updateguard_telemetry::Paths;

/// Outgoing HTTP request arguments as the host hands them to filters.
/// Fields this crate never inspects ride along in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Map<String, Value>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Argument object of a plugin metadata query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginsApiArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Error result a filter can substitute for a metadata response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Wrap as the nullable result value passed between integrations
    pub fn into_result(self) -> Value {
        serde_json::json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        })
    }
}

/// Host-root configuration (updateguard.json), read fail-soft: a missing or
/// malformed file means defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub enabled: HashMap<String, bool>,
    #[serde(default)]
    pub plugins_dir: Option<PathBuf>,
}

impl HostConfig {
    pub fn load(paths: &Paths) -> Self {
        Self::load_from(&paths.config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&contents).unwrap_or_default()
    }

    /// Filters are enabled unless the config turns them off
    pub fn is_enabled(&self, filter_name: &str) -> bool {
        self.enabled.get(filter_name).copied().unwrap_or(true)
    }

    /// Installed-plugins directory, honoring a config override. Relative
    /// overrides resolve against the host root.
    pub fn plugins_dir(&self, paths: &Paths) -> PathBuf {
        match &self.plugins_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => paths.host_root.join(dir),
            None => paths.default_plugins_dir(),
        }
    }
}

/// Check if a filter is enabled in the host config
pub fn is_filter_enabled(filter_name: &str) -> bool {
    let Ok(paths) = Paths::new() else {
        return true;
    };
    HostConfig::load(&paths).is_enabled(filter_name)
}

/// Base trait for host extension-point filters
pub trait HostFilter: Send + Sync {
    /// Filter name (unique identifier)
    fn name(&self) -> &str;

    /// Filter version
    fn version(&self) -> &str {
        "0.1.0"
    }

    /// Filter description
    fn description(&self) -> &str {
        ""
    }

    /// Check if filter is enabled in host config
    fn is_enabled(&self) -> bool {
        is_filter_enabled(self.name())
    }

    // Extension points (default implementations pass through)

    /// Called with the arguments of every outgoing HTTP request the host is
    /// about to dispatch
    fn on_http_request_args(&mut self, args: RequestArgs, _url: &str) -> RequestArgs {
        args
    }

    /// Called when plugin metadata is queried; `result` carries whatever
    /// earlier integrations already decided
    fn on_plugins_api(
        &mut self,
        result: Option<Value>,
        _action: &str,
        _args: &PluginsApiArgs,
    ) -> Option<Value> {
        result
    }
}
