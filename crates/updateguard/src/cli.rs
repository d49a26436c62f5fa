use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "updateguard")]
#[command(version)]
#[command(about = "Keeps externally updated plugins out of wordpress.org update traffic")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register updateguard at the host's extension points
    Init,

    /// Show installed-plugin registry and suppression status
    Status,

    /// Print version information
    Version,

    /// Hook: Filter outgoing HTTP request arguments (stdin/stdout JSON)
    #[command(name = "hook:http-request-args")]
    HookHttpRequestArgs,

    /// Hook: Filter plugin metadata queries (stdin/stdout JSON)
    #[command(name = "hook:plugins-api")]
    HookPluginsApi,

    /// Summarize recorded suppression events
    Report,

    /// Manage filters
    Filters {
        #[command(subcommand)]
        action: Option<FilterAction>,
    },
}

#[derive(Subcommand)]
pub enum FilterAction {
    /// List all filters
    List,
    /// Enable a filter
    Enable { name: String },
    /// Disable a filter
    Disable { name: String },
}
