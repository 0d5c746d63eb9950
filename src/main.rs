use clap::Parser;
use colored::*;
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};

use quickask::api::ChatClient;
use quickask::cli::Args;
use quickask::config::{Config, FileConfig};
use quickask::orchestrator::{Orchestrator, QueryOutcome};
use quickask::session::Session;
use quickask::tools::{build_registry, ToolExecutor};
use quickask::ui::output::display_tool_list;
use quickask::ui::TerminalPresenter;
use quickask::{QuickAskError, Result};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<i32> {
    if args.list_tools {
        let mut file = FileConfig::load()?;
        if args.no_tools {
            file.tools.enabled = false;
        }
        let registry = build_registry(&file.tools).map_err(QuickAskError::ConfigError)?;
        display_tool_list(&registry.specs());
        return Ok(0);
    }

    let config = Config::from_env_and_args(&args).map_err(QuickAskError::ConfigError)?;

    let registry = Arc::new(build_registry(&config.tools).map_err(QuickAskError::ConfigError)?);
    if config.verbose {
        eprintln!(
            "{}",
            format!(
                "[AI] Model: {} | Endpoint: {} | Tools: {}",
                config.model,
                config.api_endpoint,
                registry.len()
            )
            .dimmed()
        );
    }

    let executor = ToolExecutor::new(registry, Duration::from_secs(config.tool_timeout))
        .with_verbose(config.verbose);
    let client = ChatClient::new(&config)?;
    let orchestrator =
        Orchestrator::new(&client, &executor, config.max_rounds).with_verbose(config.verbose);
    let mut session = Session::new().with_verbose(config.verbose);

    if !args.query.is_empty() {
        let query = args.query.join(" ");
        let mut presenter = TerminalPresenter::new(config.verbose, false);
        session.show(&mut presenter);
        let cancel = session.cancel_handle();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
        let outcome = session.submit(&query, &orchestrator, &mut presenter).await;
        watcher.abort();
        return Ok(match outcome? {
            QueryOutcome::Done { .. } => 0,
            QueryOutcome::Failed { .. } => 1,
            QueryOutcome::Cancelled { .. } => 130,
        });
    }

    interactive(&mut session, &orchestrator, config.verbose).await?;
    Ok(0)
}

/// Line-driven launcher: two quick empty Enter presses stand in for the
/// double-tapped hotkey.
async fn interactive(
    session: &mut Session,
    orchestrator: &Orchestrator<'_>,
    verbose: bool,
) -> Result<()> {
    let mut presenter = TerminalPresenter::new(verbose, true);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "{}",
        "quickask ready: press Enter twice quickly to ask, /quit to exit".dimmed()
    );

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        let input = line.trim();

        if !session.is_visible() {
            match input {
                "" => {
                    session.key_down(Instant::now(), &mut presenter);
                }
                "/quit" => break,
                _ => {}
            }
            continue;
        }

        match input {
            "" => presenter.prompt(),
            "/quit" => break,
            "/hide" | "/esc" => session.hide(&mut presenter),
            "/clear" => {
                session.clear(&mut presenter);
                presenter.prompt();
            }
            query => {
                let cancel = session.cancel_handle();
                let watcher = tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        cancel.cancel();
                    }
                });
                let outcome = session.submit(query, orchestrator, &mut presenter).await;
                watcher.abort();
                match outcome? {
                    QueryOutcome::Cancelled { .. } => session.hide(&mut presenter),
                    QueryOutcome::Done { .. } | QueryOutcome::Failed { .. } => {}
                }
            }
        }
    }

    Ok(())
}
