//! # Taskpulse
//!
//! Terminal front end for the taskpulse urgency and filter engine.
//!
//! ## Usage
//!
//! ```bash
//! # Tasks sorted by urgency
//! taskpulse list
//!
//! # Only tasks matching a named filter, scored as of a fixed moment
//! taskpulse list --filter Open --at 2025-06-01T09:00
//!
//! # How one task's score is derived
//! taskpulse show 3
//!
//! # Available filters
//! taskpulse filters
//! ```
//!
//! ## Data Storage
//!
//! Tasks are read from your local data directory:
//! *   Linux: `~/.local/share/taskpulse/tasks.json`
//! *   macOS: `~/Library/Application Support/taskpulse/tasks.json`
//! *   Windows: `%APPDATA%\taskpulse\tasks.json`
//!
//! Override with `TASKS_DB`; user filters live in `filters.json` next to it
//! (or `TASKPULSE_FILTERS`). `TASKPULSE_LOG` sets the log level.

use chrono::{NaiveDate, NaiveDateTime};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use log::error;
use std::io;
use std::process::ExitCode;

use taskpulse::commands::{cmd_filters, cmd_list, cmd_show};
use taskpulse::config::Config;
use taskpulse::datetime::{default_time, now_local};
use taskpulse::logging::init_logging;
use taskpulse::Instant;

#[derive(Parser)]
#[command(name = "taskpulse")]
#[command(about = "Urgency-sorted view of your tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks sorted by urgency
    List {
        /// Name of a built-in or user filter
        #[arg(short, long)]
        filter: Option<String>,
        /// Score as of YYYY-MM-DD or YYYY-MM-DDTHH:MM instead of now
        #[arg(long, value_parser = parse_instant)]
        at: Option<Instant>,
    },
    /// Explain a task's urgency
    Show {
        id: u64,
        /// Score as of YYYY-MM-DD or YYYY-MM-DDTHH:MM instead of now
        #[arg(long, value_parser = parse_instant)]
        at: Option<Instant>,
    },
    /// List available filters
    Filters,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn parse_instant(s: &str) -> Result<Instant, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_time(default_time())))
        .map_err(|e| format!("invalid time '{s}': {e}. Use YYYY-MM-DD or YYYY-MM-DDTHH:MM."))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::from_env();
    if let Err(e) = init_logging(&config.log_level) {
        eprintln!("{e}");
    }
    let now = now_local();

    let result = match cli.command {
        Some(Commands::List { filter, at }) => {
            cmd_list(&config, filter.as_deref(), at.unwrap_or(now))
        }
        Some(Commands::Show { id, at }) => cmd_show(&config, id, at.unwrap_or(now)),
        Some(Commands::Filters) => cmd_filters(&config),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "taskpulse", &mut io::stdout());
            Ok(())
        }
        None => cmd_list(&config, None, now),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("event=command_failed module=cli error={e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
