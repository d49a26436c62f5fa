mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, FilterAction};

fn main() -> anyhow::Result<()> {
    // Initialize tracing; hooks speak JSON on stdout, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Status => commands::status::run(),
        Commands::Version => commands::version::run(),
        Commands::Report => commands::report::run(),
        Commands::HookHttpRequestArgs => commands::hooks::hook_http_request_args(),
        Commands::HookPluginsApi => commands::hooks::hook_plugins_api(),
        Commands::Filters { action } => match action {
            Some(FilterAction::List) | None => commands::filters::run_list(),
            Some(FilterAction::Enable { name }) => commands::filters::run_enable(&name),
            Some(FilterAction::Disable { name }) => commands::filters::run_disable(&name),
        },
    }
}
