//! Suppression event records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Host extension point an event was recorded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionPoint {
    HttpRequestArgs,
    PluginsApi,
}

impl ExtensionPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HttpRequestArgs => "http_request_args",
            Self::PluginsApi => "plugins_api",
        }
    }
}

impl std::fmt::Display for ExtensionPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One hook invocation that suppressed plugin data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressionRecord {
    pub timestamp: DateTime<Utc>,
    pub extension_point: ExtensionPoint,
    pub host_root: String,
    /// Plugin files (or slugs, for metadata lookups) removed or blocked
    pub suppressed: Vec<String>,
    /// Plugins present in the payload before filtering
    #[serde(default)]
    pub payload_plugins: usize,
}

impl SuppressionRecord {
    pub fn new(
        extension_point: ExtensionPoint,
        host_root: String,
        suppressed: Vec<String>,
        payload_plugins: usize,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            extension_point,
            host_root,
            suppressed,
            payload_plugins,
        }
    }
}
