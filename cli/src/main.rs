//! Herald CLI - drives a notification queue from stdin.
//!
//! Each input line is a command (`ok <title>`, `fail <title>`, `dismiss <id>`,
//! `clear`, `list`, `stats`, `quit`). Every change to the queue is rendered to
//! stdout as it happens. At end of input the program waits for the queue to
//! drain by expiry, then exits.

mod command;
mod render;

use std::{env, path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use herald_config::HeraldConfig;
use herald_core::NotificationQueue;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::command::{Command, CommandError};
use crate::render::{render_snapshot, render_stats};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries rendered notifications; logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<HeraldConfig> {
    match path {
        Some(path) => HeraldConfig::load_from(&path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(HeraldConfig::load()?.unwrap_or_default()),
    }
}

fn execute(queue: &NotificationQueue, command: Command) {
    match command {
        Command::Success(title) => {
            queue.success(title);
        }
        Command::Fail(title) => {
            queue.fail(title);
        }
        Command::Dismiss(id) => {
            if !queue.dismiss(id) {
                eprintln!("no notification #{id}");
            }
        }
        Command::Clear => {
            queue.clear();
        }
        Command::List => println!("{}", render_snapshot(&queue.snapshot(), Instant::now())),
        Command::Stats => println!("{}", render_stats(&queue.stats())),
        // Handled by the caller; it ends the loop.
        Command::Quit => {}
    }
}

async fn run(queue: &NotificationQueue) -> Result<()> {
    let mut changes = queue.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => return Ok(()),
                    Ok(command) => execute(queue, command),
                    Err(CommandError::Empty) => {}
                    Err(err) => eprintln!("error: {err}"),
                }
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let snapshot = changes.borrow_and_update().clone();
                println!("{}", render_snapshot(&snapshot, Instant::now()));
            }
        }
    }

    tracing::debug!(remaining = queue.len(), "Input closed, draining queue");
    while !queue.is_empty() {
        if changes.changed().await.is_err() {
            break;
        }
        let snapshot = changes.borrow_and_update().clone();
        println!("{}", render_snapshot(&snapshot, Instant::now()));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = load_config(env::args_os().nth(1).map(PathBuf::from))?;
    let ttl = config.ttl()?;
    let queue = NotificationQueue::new(ttl)?;
    tracing::info!(ttl = ?ttl.as_duration(), "Notification queue ready");

    run(&queue).await
}
