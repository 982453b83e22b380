//! Interactive chat screen for the content strategist.
//!
//! Plain input streams a reply into the terminal; slash commands manage
//! the session history. A transport failure prints the fallback notice
//! and keeps the loop alive.

use std::io::Write;
use std::time::Duration;

use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use creo_core::chat::service::ChatSessionService;
use creo_core::chat::transcript::{RejectReason, SubmitOutcome};
use creo_infra::llm::gemini::GeminiSessionFactory;
use creo_infra::storage::JsonFileStorage;
use creo_types::chat::{Message, MessageRole};

use crate::state::AppState;

type Service = ChatSessionService<GeminiSessionFactory, JsonFileStorage>;

/// Available slash commands in the chat screen.
#[derive(Debug, PartialEq)]
enum ChatCommand {
    Help,
    New,
    List(Option<String>),
    Open(usize),
    Delete(usize),
    ClearAll,
    Exit,
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim().to_string());

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/new" => Some(ChatCommand::New),
        "/list" | "/history" => Some(ChatCommand::List(arg.filter(|a| !a.is_empty()))),
        "/open" => match arg.as_deref().map(str::parse::<usize>) {
            Some(Ok(n)) if n > 0 => Some(ChatCommand::Open(n)),
            _ => Some(ChatCommand::Unknown("/open requires a list number".to_string())),
        },
        "/delete" | "/del" => match arg.as_deref().map(str::parse::<usize>) {
            Some(Ok(n)) if n > 0 => Some(ChatCommand::Delete(n)),
            _ => Some(ChatCommand::Unknown(
                "/delete requires a list number".to_string(),
            )),
        },
        "/clear" => Some(ChatCommand::ClearAll),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}          {}", style("/help").cyan(), "Show this help message");
    println!("  {}           {}", style("/new").cyan(), "Start a new strategy session");
    println!("  {} {}", style("/list [filter]").cyan(), "List saved sessions (title search)");
    println!("  {}      {}", style("/open <n>").cyan(), "Reopen a saved session");
    println!("  {}    {}", style("/delete <n>").cyan(), "Delete a saved session");
    println!("  {}         {}", style("/clear").cyan(), "Delete ALL saved sessions");
    println!("  {}          {}", style("/exit").cyan(), "Leave the chat");
    println!();
}

/// Run the interactive chat screen.
pub async fn run(state: &AppState) -> anyhow::Result<()> {
    let mut service = state.chat_service().await?;

    println!();
    println!(
        "  {}",
        style("Social Strategist").bold().cyan()
    );
    println!(
        "  {}",
        style("Type a message, or /help for commands.").dim()
    );
    render_transcript(&service.transcript());

    // Ids of the sessions as last listed, for /open and /delete numbering.
    let mut last_listing: Vec<Uuid> = Vec::new();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n  {} ", style("You >").green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim().to_string();
        if text.is_empty() {
            continue;
        }

        let Some(command) = parse(&text) else {
            send_and_render(&mut service, &text).await?;
            continue;
        };

        match command {
            ChatCommand::Help => print_help(),
            ChatCommand::New => {
                service.new_session().await?;
                println!("\n  {}", style("Started a new session.").dim());
                render_transcript(&service.transcript());
            }
            ChatCommand::List(filter) => {
                last_listing = print_sessions(&service, filter.as_deref().unwrap_or(""));
            }
            ChatCommand::Open(n) => {
                if last_listing.is_empty() {
                    last_listing = print_sessions(&service, "");
                }
                match last_listing.get(n - 1) {
                    Some(&id) => {
                        if service.open_session(id).await? {
                            render_transcript(&service.transcript());
                        }
                    }
                    None => println!("  {} No session #{n} in the last listing.", style("?").yellow()),
                }
            }
            ChatCommand::Delete(n) => {
                if last_listing.is_empty() {
                    last_listing = print_sessions(&service, "");
                }
                match last_listing.get(n - 1).copied() {
                    Some(id) => {
                        let confirmed = Confirm::new()
                            .with_prompt("Delete this saved session?")
                            .default(false)
                            .interact()?;
                        if confirmed && service.delete_session(id).await? {
                            last_listing.retain(|&l| l != id);
                            println!("  {}", style("Session deleted.").dim());
                            render_transcript(&service.transcript());
                        }
                    }
                    None => println!("  {} No session #{n} in the last listing.", style("?").yellow()),
                }
            }
            ChatCommand::ClearAll => {
                let confirmed = Confirm::new()
                    .with_prompt("Clear ALL chat history? This cannot be undone.")
                    .default(false)
                    .interact()?;
                if confirmed {
                    service.clear_history().await?;
                    last_listing.clear();
                    println!("  {}", style("History cleared.").dim());
                    render_transcript(&service.transcript());
                }
            }
            ChatCommand::Exit => break,
            ChatCommand::Unknown(cmd) => {
                println!(
                    "  {} Unknown command: {}. Type /help for available commands.",
                    style("?").yellow().bold(),
                    style(cmd).dim()
                );
            }
        }
    }

    println!("\n  {}", style("Session ended.").dim());
    Ok(())
}

/// Submit a message and print the reply as it streams.
async fn send_and_render(service: &mut Service, text: &str) -> anyhow::Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("static spinner template"),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let label = format!("\n  {} ", style("Creo").cyan().bold());
    let mut printed = 0usize;

    let result = service
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
        Ok(SubmitOutcome::Completed(_)) => println!(),
        Ok(SubmitOutcome::Rejected(RejectReason::Busy)) => {
            println!("  {}", style("A reply is already in progress.").dim());
        }
        Ok(SubmitOutcome::Rejected(RejectReason::EmptyInput)) | Ok(SubmitOutcome::Abandoned) => {}
        Err(e) => {
            if printed > 0 {
                println!();
            }
            tracing::warn!(error = %e, "chat exchange failed");
            // The transcript already carries the fallback notice; show it.
            if let Some(last) = service.transcript().last() {
                println!("\n  {} {}", style("!").red().bold(), last.text);
            }
        }
    }
    Ok(())
}

/// Print the saved-session list and return the ids in display order.
fn print_sessions(service: &Service, filter: &str) -> Vec<Uuid> {
    let records = service.list(filter);
    println!();
    if records.is_empty() {
        println!("  {}", style("No matching strategies").dim().italic());
        return Vec::new();
    }
    for (i, record) in records.iter().enumerate() {
        let marker = if service.active_session() == Some(record.id) {
            style("*").cyan().bold().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "  {marker}{:>3}. {}  {}",
            i + 1,
            record.title,
            style(record.created_at.format("%Y-%m-%d").to_string()).dim()
        );
    }
    records.iter().map(|r| r.id).collect()
}

fn render_transcript(messages: &[Message]) {
    println!();
    for message in messages {
        let label = match message.role {
            MessageRole::User => style("You  >").green().bold(),
            MessageRole::Model => style("Creo >").cyan().bold(),
        };
        println!("  {} {}", label, message.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse("/help"), Some(ChatCommand::Help));
        assert_eq!(parse("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn test_parse_list_with_filter() {
        assert_eq!(parse("/list"), Some(ChatCommand::List(None)));
        assert_eq!(
            parse("/list reels"),
            Some(ChatCommand::List(Some("reels".to_string())))
        );
    }

    #[test]
    fn test_parse_open() {
        assert_eq!(parse("/open 3"), Some(ChatCommand::Open(3)));
        assert!(matches!(parse("/open"), Some(ChatCommand::Unknown(_))));
        assert!(matches!(parse("/open zero"), Some(ChatCommand::Unknown(_))));
        assert!(matches!(parse("/open 0"), Some(ChatCommand::Unknown(_))));
    }

    #[test]
    fn test_parse_delete() {
        assert_eq!(parse("/delete 1"), Some(ChatCommand::Delete(1)));
        assert_eq!(parse("/del 2"), Some(ChatCommand::Delete(2)));
    }

    #[test]
    fn test_parse_not_command() {
        assert_eq!(parse("hello world"), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse("/foo"),
            Some(ChatCommand::Unknown("/foo".to_string()))
        );
    }
}
