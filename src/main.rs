//! IssuePilot CLI entry point

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info};

use issuepilot::cli::{Cli, Command};
use issuepilot::config::Config;
use issuepilot::jira::{JiraClient, TrackerClient};
use issuepilot::llm::{LlmClient, create_client};
use issuepilot::repl;
use issuepilot::router::Router;

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("issuepilot")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = match cli_log_level.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{other}', defaulting to INFO");
            tracing::Level::INFO
        }
        None | Some("INFO") => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("issuepilot.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate()?;

    let llm: Arc<dyn LlmClient> = create_client(&config.llm).context("Failed to create LLM client")?;
    let tracker: Arc<dyn TrackerClient> =
        Arc::new(JiraClient::from_config(&config.jira).context("Failed to create tracker client")?);

    let mut router = Router::new(&config, llm, tracker).context("Failed to build router")?;

    debug!(command = ?cli.command, "main: dispatching");
    match cli.command {
        Some(Command::Ask { question }) => {
            let question = question.join(" ");
            let reply = router.ask(&question).await?;
            println!("{reply}");
            Ok(())
        }
        Some(Command::Repl) | None => repl::run(&mut router).await,
    }
}
