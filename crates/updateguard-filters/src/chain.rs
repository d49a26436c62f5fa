//! Filter chain dispatching host extension points in registration order

use crate::base::{HostFilter, PluginsApiArgs, RequestArgs};
use serde_json::Value;

/// Ordered chain of filters, mirroring how the host threads a value through
/// every integration registered at an extension point.
pub struct FilterChain {
    filters: Vec<Box<dyn HostFilter>>,
}

impl FilterChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Register a filter; disabled filters are dropped
    pub fn register(&mut self, filter: Box<dyn HostFilter>) {
        if filter.is_enabled() {
            self.filters.push(filter);
        }
    }

    /// Thread outgoing request arguments through every filter
    pub fn on_http_request_args(&mut self, mut args: RequestArgs, url: &str) -> RequestArgs {
        for filter in &mut self.filters {
            args = filter.on_http_request_args(args, url);
        }
        args
    }

    /// Thread a metadata query result through every filter
    pub fn on_plugins_api(
        &mut self,
        mut result: Option<Value>,
        action: &str,
        args: &PluginsApiArgs,
    ) -> Option<Value> {
        for filter in &mut self.filters {
            result = filter.on_plugins_api(result, action, args);
        }
        result
    }

    /// Get number of registered filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if chain is empty
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}
