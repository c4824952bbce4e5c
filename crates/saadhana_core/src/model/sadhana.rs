//! Sadhana (practice record) domain model.
//!
//! # Responsibility
//! - Define the canonical practice record shared by board views and storage.
//! - Own field-level validation and tag/due-date normalization helpers.
//!
//! # Invariants
//! - `title` is never blank after create/update.
//! - An incomplete record never carries a `reflection`.
//! - `id` is assigned once at creation and never reassigned.
//!
//! # See also
//! - docs/architecture/data-model.md

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

static LEADING_ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(\d{4}-\d{2}-\d{2})(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:\d{2})?)?\s*$",
    )
    .expect("valid iso date regex")
});

/// Stable identifier for a practice record.
///
/// Derived from the creation timestamp in epoch milliseconds.
pub type SadhanaId = i64;

/// Scheduling category of a practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Repeats every day; always shown under today while open.
    Daily,
    /// One-off goal with an optional due date.
    Goal,
}

/// Practice priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Ordinal weight used for sorting; high sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Goal => "goal",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown enum label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {field} value `{value}`")]
pub struct ParseLabelError {
    pub field: &'static str,
    pub value: String,
}

impl FromStr for Priority {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseLabelError {
                field: "priority",
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for Category {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "goal" => Ok(Self::Goal),
            _ => Err(ParseLabelError {
                field: "category",
                value: value.to_string(),
            }),
        }
    }
}

/// Validation failures for practice records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SadhanaValidationError {
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("sadhana {0} carries a reflection but is not completed")]
    ReflectionWithoutCompletion(SadhanaId),
    #[error("no sadhana id is available after {0}")]
    IdSpaceExhausted(SadhanaId),
}

/// Canonical practice record.
///
/// Serialized in camelCase so the stored JSON matches the browser format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sadhana {
    pub id: SadhanaId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub category: Category,
    /// Raw ISO date string; parsed lazily by [`parse_due_date`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub priority: Priority,
    #[serde(
        default,
        deserialize_with = "nullable_tags",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
    /// Set only when the record transitions to completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
}

impl Sadhana {
    /// Builds a fresh, incomplete record from a draft and an assigned id.
    pub fn from_draft(id: SadhanaId, draft: SadhanaDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            completed: false,
            category: draft.category,
            due_date: draft.due_date,
            time: draft.time,
            priority: draft.priority,
            tags: normalize_tags(&draft.tags),
            reflection: None,
        }
    }

    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), SadhanaValidationError> {
        validate_title(&self.title)?;
        if !self.completed && self.reflection.is_some() {
            return Err(SadhanaValidationError::ReflectionWithoutCompletion(self.id));
        }
        Ok(())
    }

    /// Parsed due date, or `None` when absent or unparseable.
    pub fn due_on(&self) -> Option<NaiveDate> {
        self.due_date.as_deref().and_then(parse_due_date)
    }

    /// Clears completion together with any reflection.
    pub fn reopen(&mut self) {
        self.completed = false;
        self.reflection = None;
    }

    /// Marks complete and records the reflection; blank text stores none.
    pub fn complete_with_reflection(&mut self, reflection: &str) {
        self.completed = true;
        self.reflection = if reflection.trim().is_empty() {
            None
        } else {
            Some(reflection.to_string())
        };
    }
}

/// Stored `"tags": null` decodes as no tags.
fn nullable_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Add-operation input: everything except the identity and completion state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SadhanaDraft {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub due_date: Option<String>,
    pub time: Option<String>,
    pub priority: Priority,
    pub tags: Vec<String>,
}

impl SadhanaDraft {
    pub fn new(title: impl Into<String>, category: Category, priority: Priority) -> Self {
        Self {
            title: title.into(),
            description: None,
            category,
            due_date: None,
            time: None,
            priority,
            tags: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Rejects empty or whitespace-only titles.
pub fn validate_title(title: &str) -> Result<(), SadhanaValidationError> {
    if title.trim().is_empty() {
        return Err(SadhanaValidationError::EmptyTitle);
    }
    Ok(())
}

/// Parses a stored due date into a calendar date.
///
/// Accepts `YYYY-MM-DD` and ISO datetimes whose leading component is a
/// calendar date (`2024-05-01T00:00:00.000Z`). The time component is ignored.
pub fn parse_due_date(value: &str) -> Option<NaiveDate> {
    let captures = LEADING_ISO_DATE_RE.captures(value)?;
    let date_part = captures.get(1)?.as_str();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Normalizes one tag value: trimmed and lowercased; blank tags are dropped.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes, deduplicates and sorts tag values.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut unique = BTreeSet::new();
    for tag in tags {
        if let Some(value) = normalize_tag(tag) {
            unique.insert(value);
        }
    }
    unique.into_iter().collect()
}
