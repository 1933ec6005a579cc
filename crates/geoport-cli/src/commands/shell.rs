//! Interactive session over a single long-lived coordinator.

use super::context::{AppContext, print_json};
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

const PROMPT: &str = "geoport> ";

/// One line typed at the prompt.
#[derive(Parser, Debug, PartialEq)]
#[command(name = "geoport", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
enum ShellCommand {
    /// Override the location
    #[command(allow_negative_numbers = true)]
    Set {
        latitude: f64,
        longitude: f64,
        /// Origin label recorded in history
        source: Option<String>,
    },
    /// Stop the override
    Stop,
    /// Show the current override
    Status,
    /// Show history, newest first
    History { limit: Option<usize> },
    /// Re-apply a history entry
    Reapply { entry_id: Uuid },
    /// Remove a history entry
    Forget { entry_id: Uuid },
    /// Remove all history
    Clear,
    /// Position held by the local simulation
    Where,
    /// Coordinator health
    Health,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

fn parse(line: &str) -> Result<Option<ShellCommand>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    ShellLine::try_parse_from(words).map(|parsed| Some(parsed.command))
}

/// Completes and hints command names at the start of the line.
struct ShellHelper {
    commands: Vec<String>,
}

impl ShellHelper {
    fn new() -> Self {
        let mut commands: Vec<String> = ShellLine::command()
            .get_subcommands()
            .map(|command| command.get_name().to_string())
            .collect();
        commands.push("help".to_string());
        Self { commands }
    }

    fn matching<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a String> + 'a {
        self.commands
            .iter()
            .filter(move |command| command.starts_with(prefix))
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.contains(' ') {
            return Ok((0, Vec::new()));
        }

        let candidates = self
            .matching(line)
            .map(|command| Pair {
                display: command.clone(),
                replacement: command.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return None;
        }
        self.matching(line)
            .find(|command| command.len() > line.len())
            .map(|command| command[line.len()..].to_string())
    }
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

pub async fn run(ctx: &AppContext) -> Result<()> {
    let mut events = ctx.coordinator.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("event: {}", line),
                    Err(e) => tracing::warn!(error = %e, "Could not render event"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event printer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut editor: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(ShellHelper::new()));

    println!("GeoPort shell for device '{}'. Type 'help' for commands.", ctx.device_id);

    loop {
        // rustyline blocks on the terminal; keep the runtime's other workers free.
        let readline = tokio::task::block_in_place(|| editor.readline(PROMPT));

        let line = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C detected. Type 'quit' to exit.");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                printer.abort();
                return Err(e.into());
            }
        };

        let command = match parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                let _ = e.print();
                continue;
            }
        };
        let _ = editor.add_history_entry(line.as_str());

        if command == ShellCommand::Quit {
            break;
        }
        if let Err(e) = execute(ctx, command).await {
            eprintln!("error: {}", e);
        }
    }

    printer.abort();
    Ok(())
}

async fn execute(ctx: &AppContext, command: ShellCommand) -> Result<()> {
    let coordinator = &ctx.coordinator;
    let (device, auth) = (ctx.device_id.as_str(), ctx.authorization.as_str());

    match command {
        ShellCommand::Set {
            latitude,
            longitude,
            source,
        } => print_json(
            &coordinator
                .set_override(device, auth, latitude, longitude, source.as_deref())
                .await?,
        ),
        ShellCommand::Stop => print_json(&coordinator.stop_override(device, auth).await?),
        ShellCommand::Status => print_json(&coordinator.get_status(device, auth).await?),
        ShellCommand::History { limit } => {
            print_json(&coordinator.get_history(device, auth, limit).await?)
        }
        ShellCommand::Reapply { entry_id } => {
            match coordinator
                .reapply_history_entry(device, auth, entry_id, None)
                .await?
            {
                Some(receipt) => print_json(&receipt),
                None => anyhow::bail!("History entry {} not found", entry_id),
            }
        }
        ShellCommand::Forget { entry_id } => {
            let removed = coordinator
                .remove_history_entry(device, auth, entry_id)
                .await?;
            println!("{}", if removed { "removed" } else { "not found" });
            Ok(())
        }
        ShellCommand::Clear => {
            coordinator.clear_history(device, auth).await?;
            println!("history cleared");
            Ok(())
        }
        ShellCommand::Where => print_json(&coordinator.simulated_position(device).await),
        ShellCommand::Health => print_json(&coordinator.health().await),
        ShellCommand::Quit => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_set() {
        assert_eq!(
            parse("set 39.9042 -116.4 shortcuts").unwrap(),
            Some(ShellCommand::Set {
                latitude: 39.9042,
                longitude: -116.4,
                source: Some("shortcuts".to_string()),
            })
        );
        assert_eq!(
            parse("  set 1 2  ").unwrap(),
            Some(ShellCommand::Set {
                latitude: 1.0,
                longitude: 2.0,
                source: None,
            })
        );
        assert!(parse("set 1").is_err());
        assert!(parse("set north 2").is_err());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("stop").unwrap(), Some(ShellCommand::Stop));
        assert_eq!(
            parse("history 5").unwrap(),
            Some(ShellCommand::History { limit: Some(5) })
        );
        assert_eq!(parse("exit").unwrap(), Some(ShellCommand::Quit));
        assert!(parse("stop now").is_err());
        assert!(parse("teleport").is_err());
    }

    #[test]
    fn test_help_is_rendered_by_clap() {
        let err = parse("help").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_parse_entry_ids() {
        let id = Uuid::new_v4();
        assert_eq!(
            parse(&format!("reapply {}", id)).unwrap(),
            Some(ShellCommand::Reapply { entry_id: id })
        );
        assert!(parse("forget not-a-uuid").is_err());
    }

    #[test]
    fn test_helper_knows_every_command() {
        let helper = ShellHelper::new();
        for name in ["set", "stop", "status", "history", "reapply", "where", "quit", "help"] {
            assert!(helper.commands.iter().any(|c| c == name), "missing {}", name);
        }

        let matches: Vec<&String> = helper.matching("st").collect();
        assert_eq!(matches, vec!["stop", "status"]);
    }
}
