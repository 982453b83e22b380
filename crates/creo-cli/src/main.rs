//! Creo terminal entry point.
//!
//! Binary name: `creo`
//!
//! With no arguments, opens the home menu routing to the chat assistant or
//! the goal tracker. Subcommands drive each feature directly.

mod cli;
mod mode;
mod state;

use clap::Parser;

use cli::{Cli, Command};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    creo_observe::tracing_setup::init_tracing()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let cli = Cli::parse();
    let state = AppState::init()?;

    match cli.command {
        None => cli::home::run(&state).await,
        Some(Command::Chat) => cli::chat::run(&state).await,
        Some(Command::Goals { action }) => cli::goals::run(&state, action).await,
    }
}
