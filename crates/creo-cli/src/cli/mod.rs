//! CLI argument definitions and screen modules.

pub mod chat;
pub mod goals;
pub mod home;

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "creo",
    about = "Creator toolkit: AI content strategist and goal tracker",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Open the content strategist chat.
    Chat,
    /// Manage creator goals.
    Goals {
        #[command(subcommand)]
        action: Option<GoalsAction>,
    },
}

#[derive(Subcommand)]
pub enum GoalsAction {
    /// List goals (active by default).
    List {
        /// Show the achievement history instead.
        #[arg(long)]
        archived: bool,
    },
    /// Add a goal.
    Add {
        /// Goal title.
        title: String,
        /// Target value to reach.
        #[arg(long)]
        target: f64,
        /// Platform the goal is scoped to.
        #[arg(long, default_value = "Instagram")]
        platform: String,
        /// Starting value.
        #[arg(long, default_value_t = 0.0)]
        current: f64,
        /// Unit being counted.
        #[arg(long, default_value = "Followers")]
        unit: String,
    },
    /// Set a goal's current progress value (clamped into range).
    Update { id: Uuid, value: f64 },
    /// Archive a goal into the achievement history.
    Archive { id: Uuid },
    /// Set a new target for a goal.
    Retarget { id: Uuid, target: f64 },
    /// Delete a goal record.
    Delete { id: Uuid },
    /// Chat with the AI growth coach.
    Coach,
}
