//! Workflow task model.
//!
//! # Responsibility
//! - Define the task record shared by every board of a project.
//! - Model board targeting as a tagged `Assignment` instead of a sentinel string.
//!
//! # Invariants
//! - `id` is stable across every board copy of the same task.
//! - `updated_at` is never earlier than `created_at`.
//! - `title` is never blank.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier shared by all board copies of one task.
pub type TaskId = Uuid;

/// Wire literal used by clients to mean "every board".
pub const ASSIGN_ALL_LITERAL: &str = "Both";

/// Task urgency shown on the kanban card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// Stable string form used in storage and FFI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses the stable string form, case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Which boards should hold a copy of a task.
///
/// On the wire this stays an optional string: `null`/`""` is `Unassigned`,
/// `"Both"` is `All`, anything else names one board owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Assignment {
    /// Nobody picked it up yet; visible on every board.
    #[default]
    Unassigned,
    /// Assigned to the board(s) owned by this name.
    Single(String),
    /// Explicitly shared with every board.
    All,
}

impl Assignment {
    /// Parses the optional wire form.
    ///
    /// Leading/trailing whitespace is ignored. Only the exact literal `Both`
    /// maps to `All`; any other non-empty value is treated as an owner name.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::Unassigned,
            Some(ASSIGN_ALL_LITERAL) => Self::All,
            Some(name) => Self::Single(name.to_string()),
        }
    }

    /// Returns the form this assignment keeps after a storage round trip.
    ///
    /// `Single` names are trimmed, a blank name becomes `Unassigned` and the
    /// `Both` literal becomes `All`.
    pub fn canonical(self) -> Self {
        match self {
            Self::Single(name) => Self::parse(Some(&name)),
            other => other,
        }
    }

    /// Returns whether `name` collides with the wire literal for `All`.
    pub fn is_reserved_name(name: &str) -> bool {
        name.trim() == ASSIGN_ALL_LITERAL
    }

    /// Returns whether a board owned by `owner_name` should hold the task.
    pub fn targets(&self, owner_name: &str) -> bool {
        match self {
            Self::Unassigned | Self::All => true,
            Self::Single(name) => name == owner_name,
        }
    }

    /// Returns the optional wire form.
    pub fn as_wire(&self) -> Option<&str> {
        match self {
            Self::Unassigned => None,
            Self::Single(name) => Some(name.as_str()),
            Self::All => Some(ASSIGN_ALL_LITERAL),
        }
    }
}

impl From<Option<String>> for Assignment {
    fn from(value: Option<String>) -> Self {
        Self::parse(value.as_deref())
    }
}

impl From<Assignment> for Option<String> {
    fn from(value: Assignment) -> Self {
        value.as_wire().map(str::to_string)
    }
}

/// Kanban task replicated onto every board its assignment targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub assigned_to: Assignment,
    #[serde(default)]
    pub completed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Restamped on every fan-out update.
    pub updated_at: i64,
}

impl Task {
    /// Builds a task from a draft, generating a fresh ID.
    ///
    /// Both timestamps are set to `now_ms`; the assignment is made canonical.
    pub fn from_draft(draft: TaskDraft, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            priority: draft.priority,
            assigned_to: draft.assigned_to.canonical(),
            completed: draft.completed,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Validates task invariants.
    ///
    /// # Errors
    /// - `NilUuid` when `id` is nil.
    /// - `BlankTitle` when `title` is empty after trim.
    /// - `UpdatedBeforeCreated` when `updated_at < created_at`.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilUuid);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        if self.updated_at < self.created_at {
            return Err(TaskValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

/// Caller input for creating a task; ID and timestamps are assigned by fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub priority: TaskPriority,
    pub assigned_to: Assignment,
    pub completed: bool,
}

impl TaskDraft {
    /// Creates an incomplete medium-priority draft.
    pub fn new(title: impl Into<String>, assigned_to: Assignment) -> Self {
        Self {
            title: title.into(),
            priority: TaskPriority::default(),
            assigned_to,
            completed: false,
        }
    }
}

/// Task validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    NilUuid,
    BlankTitle,
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "task uuid must not be nil"),
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "task updated_at ({updated_at}) must be >= created_at ({created_at})"
            ),
        }
    }
}

impl Error for TaskValidationError {}

#[cfg(test)]
mod tests {
    use super::{Assignment, Task, TaskDraft, TaskPriority, TaskValidationError};

    #[test]
    fn parse_maps_sentinels_to_variants() {
        assert_eq!(Assignment::parse(None), Assignment::Unassigned);
        assert_eq!(Assignment::parse(Some("  ")), Assignment::Unassigned);
        assert_eq!(Assignment::parse(Some("Both")), Assignment::All);
        assert_eq!(
            Assignment::parse(Some(" Sam ")),
            Assignment::Single("Sam".to_string())
        );
    }

    #[test]
    fn canonical_single_matches_its_stored_form() {
        assert_eq!(
            Assignment::Single("Both".to_string()).canonical(),
            Assignment::All
        );
        assert_eq!(
            Assignment::Single("   ".to_string()).canonical(),
            Assignment::Unassigned
        );
        assert_eq!(
            Assignment::Single(" Sam ".to_string()).canonical(),
            Assignment::Single("Sam".to_string())
        );
        assert_eq!(Assignment::All.canonical(), Assignment::All);

        let task = Task::from_draft(
            TaskDraft::new("warm up", Assignment::Single(" Both".to_string())),
            1,
        );
        assert_eq!(task.assigned_to, Assignment::All);
        assert!(Assignment::is_reserved_name(" Both "));
        assert!(!Assignment::is_reserved_name("both"));
    }

    #[test]
    fn single_assignment_targets_exact_owner_only() {
        let assignment = Assignment::Single("Sam".to_string());
        assert!(assignment.targets("Sam"));
        assert!(!assignment.targets("sam"));
        assert!(!assignment.targets("You"));
        assert!(Assignment::All.targets("anyone"));
        assert!(Assignment::Unassigned.targets("anyone"));
    }

    #[test]
    fn assignment_serializes_as_optional_string() {
        let mut task = Task::from_draft(
            TaskDraft::new("track vocals", Assignment::All),
            1_700_000_000_000,
        );
        task.priority = TaskPriority::High;

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["assigned_to"], "Both");
        assert_eq!(json["priority"], "high");

        task.assigned_to = Assignment::Unassigned;
        let json = serde_json::to_value(&task).unwrap();
        assert!(json["assigned_to"].is_null());

        let decoded: Task = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, task);
    }

    #[test]
    fn validate_rejects_blank_title_and_reversed_timestamps() {
        let mut task = Task::from_draft(TaskDraft::new("  ", Assignment::All), 10);
        assert_eq!(task.validate().unwrap_err(), TaskValidationError::BlankTitle);

        task.title = "mix".to_string();
        task.updated_at = 5;
        assert_eq!(
            task.validate().unwrap_err(),
            TaskValidationError::UpdatedBeforeCreated {
                created_at: 10,
                updated_at: 5,
            }
        );
    }

    #[test]
    fn priority_parse_is_case_insensitive() {
        assert_eq!(TaskPriority::parse("HIGH"), Some(TaskPriority::High));
        assert_eq!(TaskPriority::parse("urgent"), None);
    }
}
