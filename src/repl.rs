//! Interactive session

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::router::Router;

const HELP: &str = "\
Commands:
  /help      Show this help
  /history   Show the conversation so far
  /forget    Drop the conversation and current issue
  /quit      Exit

Anything else is a question. Mention an issue key (e.g. PROJ-123) to set
the issue under discussion; follow-ups reuse it.";

/// Run the read-eval-print loop until the user quits
pub async fn run(router: &mut Router) -> Result<()> {
    let mut editor = DefaultEditor::new()?;

    println!("{}", "IssuePilot - ask about your issues. /help for commands.".cyan());

    loop {
        match editor.readline(&"ipilot> ".bold().to_string()) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;

                match line {
                    "/quit" | "/exit" => break,
                    "/help" => println!("{HELP}"),
                    "/history" => {
                        if router.history().is_empty() {
                            println!("{}", "No conversation yet.".dimmed());
                        } else {
                            for entry in router.history() {
                                println!("{entry}");
                            }
                        }
                    }
                    "/forget" => {
                        let reply = router.ask("forget").await?;
                        println!("{}", reply.yellow());
                    }
                    question => match router.ask(question).await {
                        Ok(reply) => println!("{}", reply.green()),
                        Err(e) => {
                            // Configuration problems end the session
                            return Err(e.into());
                        }
                    },
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                debug!("repl: interrupted");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("{}", "Bye.".dimmed());
    Ok(())
}
