//! Per-person task board model.
//!
//! # Responsibility
//! - Hold one owner's ordered copy of the project tasks.
//!
//! # Invariants
//! - Task order is meaningful and preserved across in-place updates.
//! - A task id appears at most once per board.
//! - `owner_name` never equals the `Both` assignment literal.

use crate::model::task::{Assignment, Task, TaskId, TaskValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable board identifier.
pub type BoardId = Uuid;

/// Ordered task list owned by one collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    /// Matched against `Assignment::Single` names.
    pub owner_name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Board {
    /// Creates an empty board with a generated stable ID.
    pub fn new(name: impl Into<String>, owner_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            owner_name: owner_name.into(),
            tasks: Vec::new(),
        }
    }

    /// Returns the list position of `task_id`, if present.
    pub fn position_of(&self, task_id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == task_id)
    }

    pub fn contains_task(&self, task_id: TaskId) -> bool {
        self.position_of(task_id).is_some()
    }

    /// Validates board fields and every task it holds.
    pub fn validate(&self) -> Result<(), BoardValidationError> {
        if self.id.is_nil() {
            return Err(BoardValidationError::NilUuid);
        }
        if self.name.trim().is_empty() {
            return Err(BoardValidationError::BlankName);
        }
        if self.owner_name.trim().is_empty() {
            return Err(BoardValidationError::BlankOwner);
        }
        if Assignment::is_reserved_name(&self.owner_name) {
            return Err(BoardValidationError::ReservedOwner);
        }

        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if !seen.insert(task.id) {
                return Err(BoardValidationError::DuplicateTask(task.id));
            }
            task.validate()
                .map_err(|source| BoardValidationError::InvalidTask {
                    task_id: task.id,
                    source,
                })?;
        }
        Ok(())
    }
}

/// Board validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardValidationError {
    NilUuid,
    BlankName,
    BlankOwner,
    /// Owner name would read back as the `All` assignment.
    ReservedOwner,
    DuplicateTask(TaskId),
    InvalidTask {
        task_id: TaskId,
        source: TaskValidationError,
    },
}

impl Display for BoardValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "board uuid must not be nil"),
            Self::BlankName => write!(f, "board name must not be blank"),
            Self::BlankOwner => write!(f, "board owner must not be blank"),
            Self::ReservedOwner => write!(f, "board owner must not be the `Both` literal"),
            Self::DuplicateTask(id) => write!(f, "task {id} appears twice on one board"),
            Self::InvalidTask { task_id, source } => {
                write!(f, "invalid task {task_id}: {source}")
            }
        }
    }
}

impl Error for BoardValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Board, BoardValidationError};
    use crate::model::task::{Assignment, Task, TaskDraft};

    #[test]
    fn validate_rejects_duplicate_task_ids() {
        let task = Task::from_draft(TaskDraft::new("demo", Assignment::All), 1);
        let mut board = Board::new("Mine", "You");
        board.tasks.push(task.clone());
        board.tasks.push(task.clone());

        assert_eq!(
            board.validate().unwrap_err(),
            BoardValidationError::DuplicateTask(task.id)
        );
    }

    #[test]
    fn validate_rejects_reserved_owner_name() {
        let board = Board::new("Shared", "Both");
        assert_eq!(
            board.validate().unwrap_err(),
            BoardValidationError::ReservedOwner
        );
    }

    #[test]
    fn position_of_reports_list_index() {
        let first = Task::from_draft(TaskDraft::new("a", Assignment::All), 1);
        let second = Task::from_draft(TaskDraft::new("b", Assignment::All), 1);
        let mut board = Board::new("Mine", "You");
        board.tasks = vec![first.clone(), second.clone()];

        assert_eq!(board.position_of(second.id), Some(1));
        assert!(board.contains_task(first.id));
    }
}
