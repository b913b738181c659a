//! Island command-and-control entry point.
//!
//! Binary name: `island`
//!
//! Parses CLI arguments, wires repositories, buses and handlers into the
//! application state, then dispatches to the requested command.

mod cli;
mod state;

use anyhow::anyhow;
use clap::Parser;
use clap_complete::generate;
use island_infra::filesystem::resolve_data_dir;
use island_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,island_core=debug,island_infra=debug,island_api=debug",
        _ => "trace",
    };
    init_tracing(filter, cli.log_json, cli.otel).map_err(|err| anyhow!(err))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "island", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = cli.data_dir.clone().unwrap_or_else(resolve_data_dir);
    let state = AppState::init(data_dir)?;

    let result = match cli.command {
        Commands::Serve => cli::serve::serve(&state, cli.json).await,
        Commands::Forward { command } => cli::forward::forward(&state, &command, cli.json).await,
        Commands::Completions { .. } => Ok(()),
    };

    shutdown_tracing();
    result
}
