//! Home screen: routes to the chat assistant or the goal tracker.

use console::style;
use dialoguer::Select;

use crate::mode::{AppMode, ScreenEvent, transition};
use crate::state::AppState;

use super::{chat, goals};

/// Run the home menu loop until the user quits.
pub async fn run(state: &AppState) -> anyhow::Result<()> {
    let mut mode = AppMode::Home;

    loop {
        match mode {
            AppMode::Home => {
                println!();
                println!("  {}", style("Welcome to Creo").bold());
                println!(
                    "  {}",
                    style("Generate strategies and track your path to social stardom.").dim()
                );
                println!();

                let items = [
                    "Social Strategist - AI content assistant",
                    "Goal Tracker - monitor your growth",
                    "Quit",
                ];
                let choice = Select::new()
                    .with_prompt("Where to?")
                    .items(&items)
                    .default(0)
                    .interact()?;

                mode = match choice {
                    0 => transition(mode, ScreenEvent::OpenChat),
                    1 => transition(mode, ScreenEvent::OpenTracker),
                    _ => return Ok(()),
                };
            }
            AppMode::Chat => {
                chat::run(state).await?;
                mode = transition(mode, ScreenEvent::Back);
            }
            AppMode::Tracker => {
                goals::run_tracker(state).await?;
                mode = transition(mode, ScreenEvent::Back);
            }
        }
    }
}
