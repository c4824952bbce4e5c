//! Board use-case service.
//!
//! # Responsibility
//! - Own the practice collection for the lifetime of a host session.
//! - Provide add/update/delete/completion mutations with validation.
//! - Hold filter/search/reflection-staging state and the memoized view.
//!
//! # Invariants
//! - The in-memory collection is the source of truth; a failed store write
//!   is logged and never rolls back in-memory state.
//! - Every mutation mirrors the full collection to the store.
//! - Ids are unique and strictly increasing within the collection.

use crate::board::classify::{group_sadhanas, GroupedSadhanas, PriorityFilter};
use crate::model::sadhana::{
    normalize_tags, validate_title, Sadhana, SadhanaDraft, SadhanaId, SadhanaValidationError,
};
use crate::repo::sadhana_repo::SadhanaRepository;
use crate::store::KeyValueStore;
use chrono::{Local, NaiveDate, Utc};
use log::{error, info};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("{0}")]
    Validation(#[from] SadhanaValidationError),
    #[error("no sadhana is awaiting a reflection")]
    NothingStaged,
}

/// Result of a completion toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Record was completed; completion and reflection were cleared.
    Reopened,
    /// Record was open; it is now staged for reflection capture.
    AwaitingReflection,
    /// No record with the given id.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewKey {
    revision: u64,
    filter: PriorityFilter,
    search_query: String,
    today: NaiveDate,
}

/// Stateful practice board over a key/value store.
pub struct SadhanaBoard<S: KeyValueStore> {
    repo: SadhanaRepository<S>,
    records: Vec<Sadhana>,
    filter: PriorityFilter,
    search_query: String,
    staged: Option<Sadhana>,
    revision: u64,
    view: Option<(ViewKey, GroupedSadhanas)>,
}

impl<S: KeyValueStore> SadhanaBoard<S> {
    /// Loads the collection from `store` (empty on missing or malformed data).
    pub fn open(store: S) -> Self {
        Self::from_repo(SadhanaRepository::new(store))
    }

    pub fn from_repo(repo: SadhanaRepository<S>) -> Self {
        let records = repo.load();
        info!(
            "event=board_open module=service status=ok key={} count={}",
            repo.key(),
            records.len()
        );
        Self {
            repo,
            records,
            filter: PriorityFilter::All,
            search_query: String::new(),
            staged: None,
            revision: 0,
            view: None,
        }
    }

    pub fn records(&self) -> &[Sadhana] {
        &self.records
    }

    pub fn get(&self, id: SadhanaId) -> Option<&Sadhana> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn repository(&self) -> &SadhanaRepository<S> {
        &self.repo
    }

    pub fn filter(&self) -> PriorityFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: PriorityFilter) {
        self.filter = filter;
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Snapshot of the record awaiting reflection capture, if any.
    pub fn staged(&self) -> Option<&Sadhana> {
        self.staged.as_ref()
    }

    /// Validates and appends a new record; returns its assigned id.
    pub fn add(&mut self, draft: SadhanaDraft) -> Result<SadhanaId, SadhanaValidationError> {
        if let Err(err) = validate_title(&draft.title) {
            info!("event=sadhana_add module=service status=rejected reason=empty_title");
            return Err(err);
        }

        let id = match self.next_id(Utc::now().timestamp_millis()) {
            Some(id) => id,
            None => {
                error!("event=sadhana_add module=service status=rejected reason=id_space_exhausted");
                return Err(SadhanaValidationError::IdSpaceExhausted(SadhanaId::MAX));
            }
        };
        self.records.push(Sadhana::from_draft(id, draft));
        self.commit("sadhana_add");
        Ok(id)
    }

    /// Replaces the record with the same id.
    ///
    /// Returns `Ok(false)` when no record matches. Tags are normalized and a
    /// reflection on an incomplete record is dropped.
    pub fn update(&mut self, record: Sadhana) -> Result<bool, SadhanaValidationError> {
        if let Err(err) = validate_title(&record.title) {
            info!(
                "event=sadhana_update module=service status=rejected reason=empty_title id={}",
                record.id
            );
            return Err(err);
        }

        let Some(slot) = self.records.iter_mut().find(|existing| existing.id == record.id) else {
            return Ok(false);
        };

        let mut record = record;
        record.tags = normalize_tags(&record.tags);
        if !record.completed {
            record.reflection = None;
        }
        *slot = record;
        self.commit("sadhana_update");
        Ok(true)
    }

    /// Removes the record with `id`; returns whether anything was removed.
    pub fn delete(&mut self, id: SadhanaId) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        if self.records.len() == before {
            return false;
        }

        if self.staged.as_ref().is_some_and(|staged| staged.id == id) {
            self.staged = None;
        }
        self.commit("sadhana_delete");
        true
    }

    /// Reopens a completed record, or stages an open one for reflection.
    pub fn toggle_completion(&mut self, id: SadhanaId) -> ToggleOutcome {
        let Some(record) = self.records.iter_mut().find(|record| record.id == id) else {
            return ToggleOutcome::NotFound;
        };

        if record.completed {
            record.reopen();
            self.commit("sadhana_reopen");
            return ToggleOutcome::Reopened;
        }

        self.staged = Some(record.clone());
        ToggleOutcome::AwaitingReflection
    }

    /// Completes the staged record with `reflection` and clears staging.
    pub fn save_reflection(&mut self, reflection: &str) -> Result<SadhanaId, BoardError> {
        let staged = self.staged.take().ok_or(BoardError::NothingStaged)?;

        if let Some(record) = self.records.iter_mut().find(|record| record.id == staged.id) {
            record.complete_with_reflection(reflection);
            self.commit("sadhana_complete");
        }
        Ok(staged.id)
    }

    /// Drops the staged record without completing it.
    pub fn cancel_reflection(&mut self) -> Option<Sadhana> {
        self.staged.take()
    }

    /// Removes every record and the stored collection.
    pub fn clear_all(&mut self) {
        self.records.clear();
        self.staged = None;
        self.revision += 1;
        if let Err(err) = self.repo.clear() {
            error!(
                "event=board_clear module=service status=error error_code=store_clear_failed error={}",
                err
            );
        }
    }

    /// Buckets for `today`, re-derived only when an input changed.
    pub fn grouped(&mut self, today: NaiveDate) -> &GroupedSadhanas {
        let key = ViewKey {
            revision: self.revision,
            filter: self.filter,
            search_query: self.search_query.clone(),
            today,
        };

        if !matches!(&self.view, Some((cached, _)) if *cached == key) {
            self.view = None;
        }

        let (records, filter, search_query) = (&self.records, self.filter, &self.search_query);
        &self
            .view
            .get_or_insert_with(|| (key, group_sadhanas(records, filter, search_query, today)))
            .1
    }

    /// Buckets for the local calendar date.
    pub fn grouped_today(&mut self) -> &GroupedSadhanas {
        self.grouped(Local::now().date_naive())
    }

    fn next_id(&self, now_ms: i64) -> Option<SadhanaId> {
        let max_existing = self.records.iter().map(|record| record.id).max();
        match max_existing {
            Some(max) if max >= now_ms => max.checked_add(1),
            _ => Some(now_ms),
        }
    }

    fn commit(&mut self, event: &str) {
        self.revision += 1;
        match self.repo.save(&self.records) {
            Ok(()) => info!(
                "event={} module=service status=ok count={}",
                event,
                self.records.len()
            ),
            Err(err) => error!(
                "event={} module=service status=error error_code=persist_failed error={}",
                event, err
            ),
        }
    }
}
