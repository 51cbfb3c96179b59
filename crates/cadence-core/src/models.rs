//! Core data structures: task status, anchor mode, and the slice of task
//! state the engine operates on, plus the storage-facing raw DTO.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::civil::{CivilDate, CivilDateTime};
use crate::recurrence::RecurrenceRule;

/// A task's status symbol.
///
/// Statuses are open-ended: anything that is not the `open`/`done` pair is
/// carried verbatim as [`TaskStatus::Custom`]. The resolution engine only
/// ever *reads* this and only ever *writes* [`TaskStatus::Done`]; custom
/// statuses such as "in-progress" are never reset to a default.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Open,
    Done,
    Custom(String),
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Open => write!(f, "open"),
            TaskStatus::Done => write!(f, "done"),
            TaskStatus::Custom(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        match s {
            "" | "open" => TaskStatus::Open,
            "done" => TaskStatus::Done,
            other => TaskStatus::Custom(other.to_string()),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TaskStatus::from(s))
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TaskStatus::from(s.as_str()))
    }
}

/// Whether occurrence computation runs from a fixed calendar grid
/// (`Scheduled`, e.g. "every Monday") or floats forward from the most recent
/// completion (`Completion`, e.g. "every 3 days since last done").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceAnchorMode {
    Scheduled,
    Completion,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurrence anchor mode: {0}")]
pub struct ParseAnchorModeError(String);

impl FromStr for RecurrenceAnchorMode {
    type Err = ParseAnchorModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(RecurrenceAnchorMode::Scheduled),
            "completion" | "done" => Ok(RecurrenceAnchorMode::Completion),
            _ => Err(ParseAnchorModeError(s.to_string())),
        }
    }
}

impl fmt::Display for RecurrenceAnchorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceAnchorMode::Scheduled => write!(f, "scheduled"),
            RecurrenceAnchorMode::Completion => write!(f, "completion"),
        }
    }
}

/// The subset of a task relevant to recurrence resolution.
///
/// A value type: every engine operation takes a snapshot and returns a new
/// snapshot, so the caller owns change propagation and write serialization.
/// `complete_instances` and `skipped_instances` are keyed by occurrence date;
/// they are disjoint in intended use, but the engine tolerates overlap
/// (the advancement walk treats their union as resolved).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecurrenceState {
    pub status: TaskStatus,
    pub recurrence: Option<RecurrenceRule>,
    pub anchor_mode: RecurrenceAnchorMode,
    pub scheduled: Option<CivilDateTime>,
    pub due: Option<CivilDateTime>,
    pub complete_instances: BTreeSet<CivilDate>,
    pub skipped_instances: BTreeSet<CivilDate>,
}

impl Default for TaskRecurrenceState {
    fn default() -> Self {
        Self {
            status: TaskStatus::Open,
            recurrence: None,
            anchor_mode: RecurrenceAnchorMode::Scheduled,
            scheduled: None,
            due: None,
            complete_instances: BTreeSet::new(),
            skipped_instances: BTreeSet::new(),
        }
    }
}

impl TaskRecurrenceState {
    /// The most recent completion key, if any.
    pub fn last_completion(&self) -> Option<CivilDate> {
        self.complete_instances.iter().next_back().copied()
    }

    /// Returns a snapshot with the given anchor dates applied.
    pub fn with_anchors(&self, anchors: AnchorDates) -> Self {
        Self {
            scheduled: anchors.scheduled,
            due: anchors.due,
            ..self.clone()
        }
    }

    /// Builds engine state from the raw string fields the storage layer
    /// persists. Lenient by policy: a malformed recurrence descriptor makes
    /// the task non-recurring, malformed date strings are dropped, so one
    /// bad task never blocks resolution of a batch.
    pub fn from_raw(raw: &RawTaskRecurrence) -> Self {
        Self {
            status: raw
                .status
                .as_deref()
                .map(TaskStatus::from)
                .unwrap_or(TaskStatus::Open),
            recurrence: raw
                .recurrence
                .as_deref()
                .and_then(RecurrenceRule::parse_lenient),
            anchor_mode: raw
                .recurrence_anchor
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(RecurrenceAnchorMode::Scheduled),
            scheduled: raw
                .scheduled
                .as_deref()
                .and_then(|s| CivilDateTime::from_storage_string(s).ok()),
            due: raw
                .due
                .as_deref()
                .and_then(|s| CivilDateTime::from_storage_string(s).ok()),
            complete_instances: raw
                .complete_instances
                .iter()
                .filter_map(|s| CivilDate::from_storage_string(s).ok())
                .collect(),
            skipped_instances: raw
                .skipped_instances
                .iter()
                .filter_map(|s| CivilDate::from_storage_string(s).ok())
                .collect(),
        }
    }
}

/// The scheduled/due pair produced by occurrence advancement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorDates {
    pub scheduled: Option<CivilDateTime>,
    pub due: Option<CivilDateTime>,
}

/// Raw task fields exactly as the frontmatter/storage layer supplies them:
/// strings and string arrays, everything optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTaskRecurrence {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub recurrence: Option<String>,
    #[serde(default)]
    pub recurrence_anchor: Option<String>,
    #[serde(default)]
    pub scheduled: Option<String>,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub complete_instances: Vec<String>,
    #[serde(default)]
    pub skipped_instances: Vec<String>,
}
