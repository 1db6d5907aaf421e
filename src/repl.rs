//! Terminal front end: stdin/stdout REPL over a [`Workflow`].
//!
//! Status lines go to stderr, agent replies to stdout.

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::workflow::{Message, Role, Workflow, WorkflowState};

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/url <address>`: ingest a page and start a chat.
    Url(String),
    /// `/delete`: release tracked objects and reset.
    Delete,
    /// `/objects`: list tracked objects.
    Objects,
    /// `/debug`: dump the gateway call log.
    Debug,
    /// `/status`: print the workflow state.
    Status,
    Help,
    Quit,
    /// Anything that is not a command is a chat message.
    Chat(String),
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(Self::Chat(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let command = match name {
            "url" => Self::Url(arg.to_string()),
            "delete" => Self::Delete,
            "objects" => Self::Objects,
            "debug" => Self::Debug,
            "status" => Self::Status,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        };
        Some(command)
    }
}

const HELP: &str = "Commands:
  /url <address>  analyze a page and start chatting about it
  /delete         delete the objects created for the current page
  /objects        list created objects
  /debug          show every API call made so far
  /status         show the current state
  /quit           release objects and exit
Anything else is sent to the agent.";

/// Read commands from stdin until `/quit` or EOF, then release whatever is
/// still tracked.
pub async fn run(workflow: &Workflow) {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    eprintln!("{HELP}\n");
    eprint!("> ");

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Error reading stdin: {}", e);
                break;
            }
        };

        match Command::parse(&line) {
            None => {}
            Some(Command::Quit) => break,
            Some(command) => handle(workflow, command).await,
        }
        eprint!("> ");
    }

    if !workflow.tracked_resources().is_empty() {
        eprintln!("Releasing created objects...");
        handle(workflow, Command::Delete).await;
    }
}

async fn handle(workflow: &Workflow, command: Command) {
    match command {
        Command::Url(url) => {
            eprintln!("Processing URL content... this may take 10-30 seconds");
            if let Err(e) = workflow.run(&url).await {
                eprintln!("Error: {e}");
            }
            print_messages(&workflow.messages());
        }
        Command::Chat(text) => {
            if !workflow.can_send() {
                eprintln!("Process a URL first to start chatting");
                return;
            }
            if let Some(reply) = workflow.send(&text).await {
                print_message(&reply);
            }
        }
        Command::Delete => match workflow.teardown().await {
            Ok(report) => {
                eprintln!("Deleted {} object(s)", report.released.len());
                for failure in &report.failures {
                    eprintln!("  could not delete {}: {}", failure.name, failure.error);
                }
            }
            Err(e) => eprintln!("Error: {e}"),
        },
        Command::Objects => {
            let names = workflow.tracked_resources();
            if names.is_empty() {
                eprintln!("Created objects: none");
            } else {
                eprintln!("Created objects: {}", names.join(", "));
            }
        }
        Command::Debug => println!("{}", workflow.call_log().to_pretty_json()),
        Command::Status => eprintln!("{}", status_line(workflow.state())),
        Command::Help => eprintln!("{HELP}"),
        Command::Unknown(name) => eprintln!("Unknown command '/{name}', try /help"),
        Command::Quit => {}
    }
}

fn status_line(state: WorkflowState) -> &'static str {
    match state {
        WorkflowState::Ready => "Ready",
        WorkflowState::Processing => "Processing...",
        WorkflowState::Failed => "Failed (submit a URL again, or /delete)",
        WorkflowState::Idle => "Waiting for URL",
    }
}

fn print_messages(messages: &[Message]) {
    for message in messages {
        print_message(message);
    }
}

fn print_message(message: &Message) {
    let time = message.created_at.with_timezone(&chrono::Local).format("%H:%M:%S");
    match message.role {
        Role::Agent => println!("\n[{time}] assistant: {}\n", message.text),
        Role::User => println!("[{time}] you: {}", message.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_commands() {
        assert_eq!(
            Command::parse("/url https://example.com "),
            Some(Command::Url("https://example.com".into()))
        );
        assert_eq!(Command::parse("/delete"), Some(Command::Delete));
        assert_eq!(Command::parse("/exit"), Some(Command::Quit));
        assert_eq!(
            Command::parse("/frobnicate now"),
            Some(Command::Unknown("frobnicate".into()))
        );
    }

    #[test]
    fn plain_text_is_chat() {
        assert_eq!(
            Command::parse("  What is this page about?  "),
            Some(Command::Chat("What is this page about?".into()))
        );
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn url_without_argument_is_empty() {
        assert_eq!(Command::parse("/url"), Some(Command::Url(String::new())));
    }
}
