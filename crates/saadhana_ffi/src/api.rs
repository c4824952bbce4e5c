//! FFI use-case API for the UI shell.
//!
//! # Responsibility
//! - Expose the board contract (buckets, mutations, filter/search setters)
//!   as plain envelopes.
//! - Own the process-wide board session.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Errors are reported in envelopes, never as `Result`.
//! - The session is opened explicitly by `board_open`, or lazily from the
//!   default database path on first use.

use chrono::{Local, NaiveDate};
use log::{info, warn};
use saadhana_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, parse_due_date,
    ping as ping_inner, Bucket, Category, GroupedSadhanas, Priority, PriorityFilter, Sadhana,
    SadhanaBoard, SadhanaDraft, SadhanaId, SqliteKvStore, ToggleOutcome,
};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

const DEFAULT_DB_FILE_NAME: &str = "saadhana_board.sqlite3";
const DB_PATH_ENV: &str = "SAADHANA_DB_PATH";

static BOARD_SESSION: Mutex<Option<BoardSession>> = Mutex::new(None);

struct BoardSession {
    db_path: PathBuf,
    board: SadhanaBoard<SqliteKvStore>,
}

/// Minimal health-check API for bridge smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Flat practice record shape for the UI shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SadhanaItem {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// `daily|goal`.
    pub category: String,
    pub due_date: Option<String>,
    pub time: Option<String>,
    /// `low|medium|high`.
    pub priority: String,
    pub tags: Vec<String>,
    pub reflection: Option<String>,
}

/// Grouped board snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardViewResponse {
    pub ok: bool,
    pub message: String,
    /// Active priority filter label (`all|low|medium|high`).
    pub filter: String,
    pub search_query: String,
    pub overdue: Vec<SadhanaItem>,
    pub today: Vec<SadhanaItem>,
    pub upcoming: Vec<SadhanaItem>,
    pub no_due_date: Vec<SadhanaItem>,
    pub completed: Vec<SadhanaItem>,
    /// Id of the record awaiting reflection capture.
    pub staged_id: Option<i64>,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardActionResponse {
    pub ok: bool,
    pub sadhana_id: Option<i64>,
    pub message: String,
}

impl BoardActionResponse {
    fn success(message: impl Into<String>, sadhana_id: Option<SadhanaId>) -> Self {
        Self {
            ok: true,
            sadhana_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            sadhana_id: None,
            message: message.into(),
        }
    }
}

/// Opens (or reopens) the board session on `db_path`.
///
/// A blank path falls back to `SAADHANA_DB_PATH`, then to a file in the
/// temp directory. Returns an empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn board_open(db_path: String) -> String {
    let path = resolve_db_path(db_path.as_str());
    let mut guard = BOARD_SESSION.lock().unwrap_or_else(PoisonError::into_inner);
    match open_session(path) {
        Ok(session) => {
            *guard = Some(session);
            String::new()
        }
        Err(err) => err,
    }
}

/// Returns the database path of the open session, or an empty string.
#[flutter_rust_bridge::frb(sync)]
pub fn board_db_path() -> String {
    BOARD_SESSION
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map(|session| session.db_path.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Returns the five ordered buckets for `today` (`YYYY-MM-DD`, defaults to
/// the local date).
#[flutter_rust_bridge::frb(sync)]
pub fn board_view(today: Option<String>) -> BoardViewResponse {
    let today = match today.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => match parse_due_date(raw) {
            Some(date) => date,
            None => {
                return BoardViewResponse {
                    message: format!("board_view failed: invalid date `{raw}`"),
                    ..BoardViewResponse::default()
                };
            }
        },
        None => Local::now().date_naive(),
    };

    match with_board(|board| Ok(to_view_response(board, today))) {
        Ok(response) => response,
        Err(err) => BoardViewResponse {
            message: format!("board_view failed: {err}"),
            ..BoardViewResponse::default()
        },
    }
}

/// Adds a practice; `category` is `daily|goal`, `priority` is `low|medium|high`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add(
    title: String,
    description: Option<String>,
    category: String,
    due_date: Option<String>,
    time: Option<String>,
    priority: String,
    tags: Vec<String>,
) -> BoardActionResponse {
    let (category, priority) = match parse_labels(&category, &priority) {
        Ok(labels) => labels,
        Err(err) => return BoardActionResponse::failure(format!("board_add failed: {err}")),
    };

    let draft = SadhanaDraft {
        title,
        description: non_blank(description),
        category,
        due_date: non_blank(due_date),
        time: non_blank(time),
        priority,
        tags,
    };

    match with_board(|board| board.add(draft).map_err(|err| err.to_string())) {
        Ok(id) => BoardActionResponse::success("Sadhana added.", Some(id)),
        Err(err) => BoardActionResponse::failure(format!("board_add failed: {err}")),
    }
}

/// Replaces the record with `item.id`; unknown ids succeed without change.
#[flutter_rust_bridge::frb(sync)]
pub fn board_update(item: SadhanaItem) -> BoardActionResponse {
    let record = match from_item(item) {
        Ok(record) => record,
        Err(err) => return BoardActionResponse::failure(format!("board_update failed: {err}")),
    };
    let id = record.id;

    match with_board(|board| board.update(record).map_err(|err| err.to_string())) {
        Ok(true) => BoardActionResponse::success("Sadhana updated.", Some(id)),
        Ok(false) => BoardActionResponse::success("No matching sadhana.", None),
        Err(err) => BoardActionResponse::failure(format!("board_update failed: {err}")),
    }
}

/// Deletes a record; unknown ids succeed without change.
#[flutter_rust_bridge::frb(sync)]
pub fn board_delete(id: i64) -> BoardActionResponse {
    match with_board(|board| Ok(board.delete(id))) {
        Ok(true) => BoardActionResponse::success("Sadhana deleted.", Some(id)),
        Ok(false) => BoardActionResponse::success("No matching sadhana.", None),
        Err(err) => BoardActionResponse::failure(format!("board_delete failed: {err}")),
    }
}

/// Reopens a completed record, or stages an open one for reflection.
///
/// The message is `reopened`, `awaiting_reflection` or `not_found`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_toggle_completion(id: i64) -> BoardActionResponse {
    match with_board(|board| Ok(board.toggle_completion(id))) {
        Ok(ToggleOutcome::Reopened) => BoardActionResponse::success("reopened", Some(id)),
        Ok(ToggleOutcome::AwaitingReflection) => {
            BoardActionResponse::success("awaiting_reflection", Some(id))
        }
        Ok(ToggleOutcome::NotFound) => BoardActionResponse::failure("not_found"),
        Err(err) => {
            BoardActionResponse::failure(format!("board_toggle_completion failed: {err}"))
        }
    }
}

/// Completes the staged record with `reflection`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_save_reflection(reflection: String) -> BoardActionResponse {
    match with_board(|board| {
        board
            .save_reflection(reflection.as_str())
            .map_err(|err| err.to_string())
    }) {
        Ok(id) => BoardActionResponse::success("Reflection saved.", Some(id)),
        Err(err) => BoardActionResponse::failure(format!("board_save_reflection failed: {err}")),
    }
}

/// Dismisses reflection capture without completing the record.
#[flutter_rust_bridge::frb(sync)]
pub fn board_cancel_reflection() -> BoardActionResponse {
    match with_board(|board| Ok(board.cancel_reflection().map(|staged| staged.id))) {
        Ok(id) => BoardActionResponse::success("Reflection cancelled.", id),
        Err(err) => {
            BoardActionResponse::failure(format!("board_cancel_reflection failed: {err}"))
        }
    }
}

/// Sets the priority filter (`all|low|medium|high`).
#[flutter_rust_bridge::frb(sync)]
pub fn board_set_filter(filter: String) -> BoardActionResponse {
    let parsed = match filter.parse::<PriorityFilter>() {
        Ok(parsed) => parsed,
        Err(err) => return BoardActionResponse::failure(format!("board_set_filter failed: {err}")),
    };
    match with_board(|board| {
        board.set_filter(parsed);
        Ok(())
    }) {
        Ok(()) => BoardActionResponse::success(format!("filter={parsed}"), None),
        Err(err) => BoardActionResponse::failure(format!("board_set_filter failed: {err}")),
    }
}

/// Sets the case-insensitive title search text.
#[flutter_rust_bridge::frb(sync)]
pub fn board_set_search(query: String) -> BoardActionResponse {
    match with_board(|board| {
        board.set_search_query(query);
        Ok(())
    }) {
        Ok(()) => BoardActionResponse::success("Search updated.", None),
        Err(err) => BoardActionResponse::failure(format!("board_set_search failed: {err}")),
    }
}

fn resolve_db_path(requested: &str) -> PathBuf {
    let trimmed = requested.trim();
    if !trimmed.is_empty() {
        return PathBuf::from(trimmed);
    }
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

fn open_session(db_path: PathBuf) -> Result<BoardSession, String> {
    let store = SqliteKvStore::open(&db_path).map_err(|err| {
        warn!("event=board_session module=ffi status=error error_code=db_open_failed error={err}");
        format!("board DB open failed: {err}")
    })?;
    info!("event=board_session module=ffi status=ok");
    Ok(BoardSession {
        db_path,
        board: SadhanaBoard::open(store),
    })
}

fn with_board<T>(
    f: impl FnOnce(&mut SadhanaBoard<SqliteKvStore>) -> Result<T, String>,
) -> Result<T, String> {
    let mut guard = BOARD_SESSION.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.is_none() {
        *guard = Some(open_session(resolve_db_path(""))?);
    }
    match guard.as_mut() {
        Some(session) => f(&mut session.board),
        None => Err("board session unavailable".to_string()),
    }
}

fn to_view_response(
    board: &mut SadhanaBoard<SqliteKvStore>,
    today: NaiveDate,
) -> BoardViewResponse {
    let filter = board.filter().to_string();
    let search_query = board.search_query().to_string();
    let staged_id = board.staged().map(|staged| staged.id);
    let grouped = board.grouped(today);

    BoardViewResponse {
        ok: true,
        message: format!("{} sadhana(s).", grouped.total()),
        filter,
        search_query,
        overdue: items(grouped, Bucket::Overdue),
        today: items(grouped, Bucket::Today),
        upcoming: items(grouped, Bucket::Upcoming),
        no_due_date: items(grouped, Bucket::NoDueDate),
        completed: items(grouped, Bucket::Completed),
        staged_id,
    }
}

fn items(grouped: &GroupedSadhanas, bucket: Bucket) -> Vec<SadhanaItem> {
    grouped.bucket(bucket).iter().map(to_item).collect()
}

fn to_item(record: &Sadhana) -> SadhanaItem {
    SadhanaItem {
        id: record.id,
        title: record.title.clone(),
        description: record.description.clone(),
        completed: record.completed,
        category: record.category.as_str().to_string(),
        due_date: record.due_date.clone(),
        time: record.time.clone(),
        priority: record.priority.as_str().to_string(),
        tags: record.tags.clone(),
        reflection: record.reflection.clone(),
    }
}

fn from_item(item: SadhanaItem) -> Result<Sadhana, String> {
    let (category, priority) = parse_labels(&item.category, &item.priority)?;
    Ok(Sadhana {
        id: item.id,
        title: item.title,
        description: non_blank(item.description),
        completed: item.completed,
        category,
        due_date: non_blank(item.due_date),
        time: non_blank(item.time),
        priority,
        tags: item.tags,
        reflection: non_blank(item.reflection),
    })
}

fn parse_labels(category: &str, priority: &str) -> Result<(Category, Priority), String> {
    let category = category.parse::<Category>().map_err(|err| err.to_string())?;
    let priority = priority.parse::<Priority>().map_err(|err| err.to_string())?;
    Ok((category, priority))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|inner| !inner.trim().is_empty())
}
