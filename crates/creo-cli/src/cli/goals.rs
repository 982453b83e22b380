//! Goal tracker screens and subcommands.
//!
//! Non-interactive subcommands print a table; the interactive tracker
//! (reached from the home menu) wraps the same ledger operations in
//! prompts. The coach screen streams like the chat screen and surfaces
//! proposals as an acceptance card.

use std::io::Write;
use std::time::Duration;

use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use console::style;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use creo_core::coach::service::{CoachSession, CoachTurn};
use creo_core::goal::ledger::GoalLedger;
use creo_core::prompts::REQUEST_PROPOSAL_PROMPT;
use creo_infra::llm::gemini::GeminiSessionFactory;
use creo_infra::storage::JsonFileStorage;
use creo_types::chat::MessageRole;
use creo_types::error::GoalError;
use creo_types::goal::{Goal, GoalDraft, GoalProposal, Platform};

use crate::state::AppState;

use super::GoalsAction;

/// Dispatch a `creo goals` subcommand.
pub async fn run(state: &AppState, action: Option<GoalsAction>) -> anyhow::Result<()> {
    let mut ledger = state.goal_ledger().await?;

    match action.unwrap_or(GoalsAction::List { archived: false }) {
        GoalsAction::List { archived } => {
            if archived {
                print_archived(&ledger.archived());
            } else {
                print_active(&ledger.active());
            }
        }
        GoalsAction::Add {
            title,
            target,
            platform,
            current,
            unit,
        } => {
            let draft = GoalDraft {
                title,
                platform: platform.parse().unwrap_or(Platform::Other),
                target_value: target,
                current_value: current,
                unit,
            };
            match ledger.create(draft).await {
                Ok(goal) => print_created(&goal),
                Err(e) => print_goal_error(&e),
            }
        }
        GoalsAction::Update { id, value } => match ledger.update_progress(id, value).await {
            Ok(goal) => println!(
                "  {} {} is now at {} / {} {} ({}%)",
                style("*").cyan().bold(),
                goal.title,
                goal.current_value,
                goal.target_value,
                goal.unit,
                goal.progress_percent()
            ),
            Err(e) => print_goal_error(&e),
        },
        GoalsAction::Archive { id } => match ledger.archive(id).await {
            Ok(goal) => println!(
                "  {} Saved \"{}\" to achievements.",
                style("*").yellow().bold(),
                goal.title
            ),
            Err(e) => print_goal_error(&e),
        },
        GoalsAction::Retarget { id, target } => match ledger.retarget(id, target).await {
            Ok(goal) => println!(
                "  {} New target for \"{}\": {} {}",
                style("*").cyan().bold(),
                goal.title,
                goal.target_value,
                goal.unit
            ),
            Err(e) => print_goal_error(&e),
        },
        GoalsAction::Delete { id } => match ledger.delete(id).await {
            Ok(()) => println!("  {}", style("Goal deleted.").dim()),
            Err(e) => print_goal_error(&e),
        },
        GoalsAction::Coach => {
            run_coach(state, &mut ledger).await?;
        }
    }

    Ok(())
}

/// Interactive tracker screen (home-menu path).
pub async fn run_tracker(state: &AppState) -> anyhow::Result<()> {
    let mut ledger = state.goal_ledger().await?;

    loop {
        println!();
        println!("  {}", style("Social Goal Tracker").bold());
        print_active(&ledger.active());

        let items = [
            "Add goal",
            "Update progress",
            "Save completed goal to achievements",
            "Raise a target",
            "Delete a goal",
            "Achievement history",
            "Suggest with AI coach",
            "Back",
        ];
        let choice = Select::new().items(&items).default(0).interact()?;

        match choice {
            0 => {
                if let Err(e) = add_goal_prompted(&mut ledger).await? {
                    print_goal_error(&e);
                }
            }
            1 => {
                if let Some(id) = pick_goal(&ledger.active(), "Which goal?")? {
                    let value: f64 = Input::new().with_prompt("New current value").interact_text()?;
                    match ledger.update_progress(id, value).await {
                        Ok(goal) => print_progress_bar(&goal),
                        Err(e) => print_goal_error(&e),
                    }
                }
            }
            2 => {
                let completed: Vec<&Goal> = ledger
                    .active()
                    .into_iter()
                    .filter(|g| g.target_reached())
                    .collect();
                if completed.is_empty() {
                    println!("  {}", style("No completed goals to archive yet.").dim());
                } else if let Some(id) = pick_goal(&completed, "Archive which goal?")? {
                    if let Err(e) = ledger.archive(id).await {
                        print_goal_error(&e);
                    }
                }
            }
            3 => {
                if let Some(id) = pick_goal(&ledger.active(), "Raise the target of which goal?")? {
                    let target: f64 = Input::new().with_prompt("New target").interact_text()?;
                    if let Err(e) = ledger.retarget(id, target).await {
                        print_goal_error(&e);
                    }
                }
            }
            4 => {
                if let Some(id) = pick_goal(&ledger.goals().iter().collect::<Vec<_>>(), "Delete which goal?")? {
                    let confirmed = Confirm::new()
                        .with_prompt("Delete this goal record?")
                        .default(false)
                        .interact()?;
                    if confirmed {
                        if let Err(e) = ledger.delete(id).await {
                            print_goal_error(&e);
                        }
                    }
                }
            }
            5 => print_archived(&ledger.archived()),
            6 => run_coach(state, &mut ledger).await?,
            _ => return Ok(()),
        }
    }
}

/// Interactive coach screen.
async fn run_coach(state: &AppState, ledger: &mut GoalLedger<JsonFileStorage>) -> anyhow::Result<()> {
    let mut coach = CoachSession::new(GeminiSessionFactory::coach(state.gemini()?));

    println!();
    println!("  {}", style("Growth Coach").bold().yellow());
    println!(
        "  {}",
        style("Type to chat, /accept to commit a proposal, /propose to ask for one, /exit to leave.").dim()
    );
    if let Some(first) = coach.transcript().first() {
        println!("\n  {} {}", style("Coach >").yellow().bold(), first.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n  {} ", style("You   >").green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim().to_string();
        if text.is_empty() {
            continue;
        }

        match text.as_str() {
            "/exit" | "/quit" | "/q" => break,
            "/accept" => match coach.accept_proposal(ledger).await {
                Ok(Some(goal)) => {
                    print_created(&goal);
                    break;
                }
                Ok(None) => {
                    println!("  {}", style("No proposal to accept yet.").dim());
                }
                Err(e) => print_goal_error(&e),
            },
            "/propose" => {
                coach_turn(&mut coach, REQUEST_PROPOSAL_PROMPT).await?;
            }
            _ => {
                coach_turn(&mut coach, &text).await?;
            }
        }
    }

    Ok(())
}

/// Submit one coach message and render the streamed reply plus any
/// proposal card.
async fn coach_turn(
    coach: &mut CoachSession<GeminiSessionFactory>,
    text: &str,
) -> anyhow::Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} {msg}")
            .expect("static spinner template"),
    );
    spinner.set_message("coaching...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let label = format!("\n  {} ", style("Coach >").yellow().bold());
    let mut printed = 0usize;

    let result = coach
        .send_with(text, |snapshot| {
            if printed == 0 && !snapshot.is_empty() {
                spinner.finish_and_clear();
                print!("{label}");
            }
            print!("{}", &snapshot[printed..]);
            let _ = std::io::stdout().flush();
            printed = snapshot.len();
        })
        .await;

    spinner.finish_and_clear();
    match result {
        Ok(CoachTurn::Replied {
            text,
            proposal_surfaced,
        }) => {
            // The streamed output included the raw proposal line; reprint
            // the cleaned reply when one was stripped.
            if proposal_surfaced {
                print!("\r");
                println!("{label}{text}");
                if let Some(proposal) = coach.proposal() {
                    print_proposal_card(proposal);
                }
            } else {
                println!();
            }
        }
        Ok(CoachTurn::Rejected(_)) | Ok(CoachTurn::Abandoned) => {}
        Err(e) => {
            tracing::warn!(error = %e, "coach exchange failed");
            if let Some(last) = coach.transcript().last() {
                if last.role == MessageRole::Model {
                    println!("\n  {} {}", style("!").red().bold(), last.text);
                }
            }
        }
    }
    Ok(())
}

async fn add_goal_prompted(
    ledger: &mut GoalLedger<JsonFileStorage>,
) -> anyhow::Result<Result<(), GoalError>> {
    let title: String = Input::new().with_prompt("Goal title").interact_text()?;

    let platforms = ["Instagram", "TikTok", "YouTube", "LinkedIn", "X", "Other"];
    let platform_idx = Select::new()
        .with_prompt("Platform")
        .items(&platforms)
        .default(0)
        .interact()?;

    let unit: String = Input::new()
        .with_prompt("Unit")
        .default("Followers".to_string())
        .interact_text()?;
    let target: f64 = Input::new()
        .with_prompt("Target value")
        .default(1000.0)
        .interact_text()?;
    let current: f64 = Input::new()
        .with_prompt("Start value")
        .default(0.0)
        .interact_text()?;

    let draft = GoalDraft {
        title,
        platform: platforms[platform_idx].parse().unwrap_or(Platform::Other),
        target_value: target,
        current_value: current,
        unit,
    };

    match ledger.create(draft).await {
        Ok(goal) => {
            print_created(&goal);
            Ok(Ok(()))
        }
        Err(e) => Ok(Err(e)),
    }
}

/// Offer a numbered pick over goals; None when the list is empty or the
/// user backs out.
fn pick_goal(goals: &[&Goal], prompt: &str) -> anyhow::Result<Option<Uuid>> {
    if goals.is_empty() {
        println!("  {}", style("No goals yet.").dim());
        return Ok(None);
    }
    let mut items: Vec<String> = goals
        .iter()
        .map(|g| format!("{} ({} / {} {})", g.title, g.current_value, g.target_value, g.unit))
        .collect();
    items.push("Back".to_string());

    let choice = Select::new().with_prompt(prompt).items(&items).default(0).interact()?;
    Ok(goals.get(choice).map(|g| g.id))
}

fn print_active(goals: &[&Goal]) {
    if goals.is_empty() {
        println!();
        println!("  {}", style("No active goals").bold());
        println!(
            "  {}",
            style("Start tracking your creator journey by setting your next big target.").dim()
        );
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Id", "Title", "Platform", "Progress", "%", "Created"]);

    for goal in goals {
        let progress = format!(
            "{} / {} {}",
            goal.current_value, goal.target_value, goal.unit
        );
        let percent = if goal.target_reached() {
            format!("{} *", goal.progress_percent())
        } else {
            goal.progress_percent().to_string()
        };
        table.add_row([
            Cell::new(goal.id),
            Cell::new(&goal.title),
            Cell::new(goal.platform),
            Cell::new(progress),
            Cell::new(percent),
            Cell::new(goal.created_at.format("%Y-%m-%d")),
        ]);
    }

    println!("{table}");
}

fn print_archived(goals: &[&Goal]) {
    if goals.is_empty() {
        println!();
        println!("  {}", style("No history yet").bold());
        println!(
            "  {}",
            style("Complete your active goals to build a track record.").dim()
        );
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Id", "Title", "Platform", "Reached", "Achieved on"]);

    for goal in goals {
        let achieved = goal
            .archived_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        table.add_row([
            Cell::new(goal.id),
            Cell::new(&goal.title),
            Cell::new(goal.platform),
            Cell::new(format!("{} {}", goal.target_value, goal.unit)),
            Cell::new(achieved),
        ]);
    }

    println!("{table}");
}

fn print_progress_bar(goal: &Goal) {
    let percent = goal.progress_percent();
    let filled = (percent as usize * 30) / 100;
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(30 - filled));
    println!(
        "  [{bar}] {percent}%  {} / {} {}",
        goal.current_value, goal.target_value, goal.unit
    );
    if goal.target_reached() {
        println!(
            "  {} {}",
            style("*").yellow().bold(),
            style("High Achiever! Goal met -- archive it or raise the target.").bold()
        );
    }
}

fn print_created(goal: &Goal) {
    println!(
        "  {} Created \"{}\" -- {} {} on {}",
        style("*").green().bold(),
        goal.title,
        goal.target_value,
        goal.unit,
        goal.platform
    );
}

fn print_proposal_card(proposal: &GoalProposal) {
    println!();
    println!(
        "  {}",
        style("Growth recommendation").yellow().bold()
    );
    println!("  {}", proposal.title);
    println!(
        "  {} {} on {}",
        proposal.target_value, proposal.unit, proposal.platform
    );
    println!(
        "  {}",
        style("Type /accept to create this goal.").dim()
    );
}

fn print_goal_error(error: &GoalError) {
    println!("  {} {error}", style("!").red().bold());
}
