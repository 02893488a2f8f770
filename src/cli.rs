//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// IssuePilot - conversational assistant for tracked issues
#[derive(Parser)]
#[command(
    name = "ipilot",
    about = "Ask questions about your issues, run operations, generate tests",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask a single question and exit
    Ask {
        /// The question (remaining words are joined)
        #[arg(value_name = "QUESTION", required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Start an interactive session
    Repl,
}
