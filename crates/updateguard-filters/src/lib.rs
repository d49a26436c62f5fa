//! Host extension-point filters for update-source suppression

pub mod base;
pub mod chain;
pub mod update_uri;

pub use base::{
    is_filter_enabled, ApiError, HostConfig, HostFilter, PluginsApiArgs, RequestArgs,
};
pub use chain::FilterChain;
pub use update_uri::{
    DiskRegistry, RegistryProvider, StaticRegistry, UpdateUriFilter, API_HOST,
    BLOCKED_ERROR_CODE, BLOCKED_ERROR_MESSAGE, PLUGIN_INFORMATION_ACTION, UPDATE_CHECK_PATH,
};
