//! Command-line driver for the practice board.
//!
//! # Responsibility
//! - Provide a minimal executable over `saadhana_core` and a SQLite file.
//! - Keep output deterministic for quick local sanity checks.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use saadhana_core::{
    parse_due_date, Bucket, PriorityFilter, Sadhana, SadhanaBoard, SadhanaDraft, SqliteKvStore,
    ToggleOutcome,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_DB_FILE_NAME: &str = "saadhana_board.sqlite3";
const DB_PATH_ENV: &str = "SAADHANA_DB_PATH";

type CliResult = Result<(), Box<dyn Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or_else(|| saadhana_core::default_log_level());
        saadhana_core::init_logging(level, log_dir)?;
    }

    if let Commands::Ping = cli.command {
        println!("saadhana_core ping={}", saadhana_core::ping());
        println!("saadhana_core version={}", saadhana_core::core_version());
        return Ok(());
    }

    let store = SqliteKvStore::open(resolve_db_path(cli.db.as_deref()))?;
    let mut board = SadhanaBoard::open(store);

    match cli.command {
        Commands::Ping => Ok(()),
        Commands::List {
            filter,
            search,
            today,
        } => list(&mut board, filter, search, today.as_deref()),
        Commands::Add {
            title,
            category,
            priority,
            due,
            time,
            description,
            tags,
        } => {
            let draft = SadhanaDraft {
                title,
                description,
                category,
                due_date: due,
                time,
                priority,
                tags,
            };
            let id = board.add(draft)?;
            println!("added {id}");
            Ok(())
        }
        Commands::Done { id, reflection } => complete(&mut board, id, &reflection),
        Commands::Reopen { id } => reopen(&mut board, id),
        Commands::Delete { id } => {
            if board.delete(id) {
                println!("deleted {id}");
            } else {
                println!("no sadhana {id}");
            }
            Ok(())
        }
    }
}

fn list(
    board: &mut SadhanaBoard<SqliteKvStore>,
    filter: PriorityFilter,
    search: String,
    today: Option<&str>,
) -> CliResult {
    let today = match today {
        Some(raw) => parse_due_date(raw).ok_or_else(|| format!("invalid --today `{raw}`"))?,
        None => chrono::Local::now().date_naive(),
    };

    board.set_filter(filter);
    board.set_search_query(search);
    let grouped = board.grouped(today);

    for bucket in Bucket::ALL {
        let records = grouped.bucket(bucket);
        println!("{} ({})", bucket.as_str(), records.len());
        for record in records {
            println!("  {}", format_record(record));
        }
    }
    Ok(())
}

fn complete(board: &mut SadhanaBoard<SqliteKvStore>, id: i64, reflection: &str) -> CliResult {
    if board.get(id).is_some_and(|record| record.completed) {
        println!("sadhana {id} is already completed");
        return Ok(());
    }

    match board.toggle_completion(id) {
        ToggleOutcome::AwaitingReflection => {
            board.save_reflection(reflection)?;
            println!("completed {id}");
        }
        ToggleOutcome::Reopened => println!("reopened {id}"),
        ToggleOutcome::NotFound => println!("no sadhana {id}"),
    }
    Ok(())
}

fn reopen(board: &mut SadhanaBoard<SqliteKvStore>, id: i64) -> CliResult {
    if !board.get(id).is_some_and(|record| record.completed) {
        println!("sadhana {id} is not completed");
        return Ok(());
    }

    board.toggle_completion(id);
    println!("reopened {id}");
    Ok(())
}

fn format_record(record: &Sadhana) -> String {
    let mut line = format!(
        "[{}] {} ({}, {})",
        record.id, record.title, record.category, record.priority
    );
    if let Some(due) = record.due_date.as_deref() {
        line.push_str(&format!(" due {due}"));
    }
    if let Some(time) = record.time.as_deref() {
        line.push_str(&format!(" at {time}"));
    }
    if !record.tags.is_empty() {
        line.push_str(&format!(" #{}", record.tags.join(" #")));
    }
    if let Some(reflection) = record.reflection.as_deref() {
        line.push_str(&format!(" reflection=\"{reflection}\""));
    }
    line
}

fn resolve_db_path(requested: Option<&str>) -> PathBuf {
    if let Some(path) = requested.map(str::trim).filter(|path| !path.is_empty()) {
        return PathBuf::from(path);
    }
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}
