//! Practice classification and ordering.
//!
//! # Responsibility
//! - Filter a practice list by priority and title search text.
//! - Partition the retained records into five display buckets.
//! - Order every bucket deterministically.
//!
//! # Invariants
//! - Buckets are disjoint; every retained record lands in exactly one.
//! - Output depends only on the inputs (`today` is explicit, no clock reads).
//! - Every bucket order is total: the final tie-break is the record id.

use crate::model::sadhana::{Category, ParseLabelError, Priority, Sadhana, SadhanaId};
use chrono::NaiveDate;
use log::warn;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Priority filter applied before grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub fn accepts(self, priority: Priority) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == priority,
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        value
            .parse::<Priority>()
            .map(Self::Only)
            .map_err(|_| ParseLabelError {
                field: "filter",
                value: value.to_string(),
            })
    }
}

impl Display for PriorityFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(priority) => Display::fmt(priority, f),
        }
    }
}

/// Named display partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Overdue,
    Today,
    Upcoming,
    NoDueDate,
    Completed,
}

impl Bucket {
    /// All buckets in display order.
    pub const ALL: [Bucket; 5] = [
        Bucket::Overdue,
        Bucket::Today,
        Bucket::Upcoming,
        Bucket::NoDueDate,
        Bucket::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Today => "today",
            Self::Upcoming => "upcoming",
            Self::NoDueDate => "noDueDate",
            Self::Completed => "completed",
        }
    }
}

/// Record counts per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BucketCounts {
    pub overdue: usize,
    pub today: usize,
    pub upcoming: usize,
    pub no_due_date: usize,
    pub completed: usize,
}

impl BucketCounts {
    pub fn total(&self) -> usize {
        self.overdue + self.today + self.upcoming + self.no_due_date + self.completed
    }

    pub fn open(&self) -> usize {
        self.total() - self.completed
    }
}

/// Grouped and ordered view model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupedSadhanas {
    pub overdue: Vec<Sadhana>,
    pub today: Vec<Sadhana>,
    pub upcoming: Vec<Sadhana>,
    pub no_due_date: Vec<Sadhana>,
    pub completed: Vec<Sadhana>,
}

impl GroupedSadhanas {
    pub fn bucket(&self, bucket: Bucket) -> &[Sadhana] {
        match bucket {
            Bucket::Overdue => &self.overdue,
            Bucket::Today => &self.today,
            Bucket::Upcoming => &self.upcoming,
            Bucket::NoDueDate => &self.no_due_date,
            Bucket::Completed => &self.completed,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<Sadhana> {
        match bucket {
            Bucket::Overdue => &mut self.overdue,
            Bucket::Today => &mut self.today,
            Bucket::Upcoming => &mut self.upcoming,
            Bucket::NoDueDate => &mut self.no_due_date,
            Bucket::Completed => &mut self.completed,
        }
    }

    pub fn counts(&self) -> BucketCounts {
        BucketCounts {
            overdue: self.overdue.len(),
            today: self.today.len(),
            upcoming: self.upcoming.len(),
            no_due_date: self.no_due_date.len(),
            completed: self.completed.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.counts().total()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Finds which bucket holds the given record id.
    pub fn locate(&self, id: SadhanaId) -> Option<Bucket> {
        Bucket::ALL
            .into_iter()
            .find(|bucket| self.bucket(*bucket).iter().any(|record| record.id == id))
    }
}

/// Returns whether a record passes the priority filter and title search.
///
/// `search_query` is matched case-insensitively as a title substring; a blank
/// query matches everything.
pub fn matches_filter(record: &Sadhana, filter: PriorityFilter, search_query: &str) -> bool {
    if !filter.accepts(record.priority) {
        return false;
    }
    let needle = search_query.trim();
    needle.is_empty() || contains_ignore_case(&record.title, needle)
}

/// Assigns one record to its bucket for the given calendar date.
///
/// Daily records are always `Today` while open. A goal whose due date cannot
/// be parsed falls back to `NoDueDate`.
pub fn classify(record: &Sadhana, today: NaiveDate) -> Bucket {
    if record.completed {
        return Bucket::Completed;
    }
    if record.category == Category::Daily {
        return Bucket::Today;
    }

    let Some(raw_due) = record.due_date.as_deref() else {
        return Bucket::NoDueDate;
    };

    match record.due_on() {
        Some(due) => match due.cmp(&today) {
            Ordering::Less => Bucket::Overdue,
            Ordering::Equal => Bucket::Today,
            Ordering::Greater => Bucket::Upcoming,
        },
        None => {
            warn!(
                "event=sadhana_classify module=board status=invalid_due_date id={} due_date_len={}",
                record.id,
                raw_due.len()
            );
            Bucket::NoDueDate
        }
    }
}

/// Filters, groups and orders a practice list.
pub fn group_sadhanas(
    records: &[Sadhana],
    filter: PriorityFilter,
    search_query: &str,
    today: NaiveDate,
) -> GroupedSadhanas {
    let mut grouped = GroupedSadhanas::default();

    for record in records
        .iter()
        .filter(|record| matches_filter(record, filter, search_query))
    {
        grouped
            .bucket_mut(classify(record, today))
            .push(record.clone());
    }

    grouped.overdue.sort_by(by_due_date_then_priority);
    grouped.today.sort_by(by_priority_then_title);
    grouped.upcoming.sort_by(by_due_date_then_priority);
    grouped.no_due_date.sort_by(by_priority_then_title);
    grouped.completed.sort_by(|a, b| b.id.cmp(&a.id));

    grouped
}

fn by_priority_then_title(a: &Sadhana, b: &Sadhana) -> Ordering {
    a.priority
        .rank()
        .cmp(&b.priority.rank())
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.id.cmp(&b.id))
}

// Only used for overdue/upcoming, where every record has a parsed due date.
fn by_due_date_then_priority(a: &Sadhana, b: &Sadhana) -> Ordering {
    a.due_on()
        .cmp(&b.due_on())
        .then_with(|| by_priority_then_title(a, b))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
