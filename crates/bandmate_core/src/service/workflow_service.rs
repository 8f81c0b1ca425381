//! Project workflow use-case service.
//!
//! # Responsibility
//! - Run task mutations through fan-out and persist the resulting snapshot.
//! - Provide project and board management for the workflow screen.
//!
//! # Invariants
//! - Every write is load -> pure transform -> full snapshot replace.
//! - Blank titles/names are rejected before any write.
//! - Board owners never collide with the `Both` assignment literal.
//! - Log lines carry metadata only, never task titles or owner names.

use crate::model::board::{Board, BoardId};
use crate::model::task::{
    Assignment, Task, TaskDraft, TaskId, TaskValidationError, ASSIGN_ALL_LITERAL,
};
use crate::repo::board_repo::{BoardRepository, Project, ProjectId};
use crate::repo::RepoError;
use crate::service::now_epoch_ms;
use crate::workflow::fanout::{add_board, apply_task_mutation, remove_board, TaskMutation};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from workflow service operations.
#[derive(Debug)]
pub enum WorkflowServiceError {
    /// A required name field is blank after trim.
    BlankName(&'static str),
    /// Board owner equals the literal reserved for the `All` assignment.
    ReservedOwnerName,
    InvalidTask(TaskValidationError),
    ProjectNotFound(ProjectId),
    BoardNotFound(BoardId),
    TaskNotFound(TaskId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for WorkflowServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName(field) => write!(f, "{field} must not be blank"),
            Self::ReservedOwnerName => {
                write!(f, "board owner `{ASSIGN_ALL_LITERAL}` is reserved")
            }
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::BoardNotFound(id) => write!(f, "board not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkflowServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for WorkflowServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ProjectNotFound(id) => Self::ProjectNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<TaskValidationError> for WorkflowServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

/// Task write result envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChange {
    /// Stamped task for create/update; `None` after delete.
    pub task: Option<Task>,
    /// Persisted snapshot after the write.
    pub boards: Vec<Board>,
}

/// Workflow service facade.
pub struct WorkflowService<R: BoardRepository> {
    repo: R,
}

impl<R: BoardRepository> WorkflowService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one empty project.
    pub fn create_project(
        &self,
        name: impl Into<String>,
    ) -> Result<Project, WorkflowServiceError> {
        let name = normalize_name(name.into(), "project name")?;
        let project = self.repo.create_project(name.as_str())?;
        info!("event=project_create module=workflow status=ok");
        Ok(project)
    }

    /// Loads the current board snapshot.
    pub fn boards(&self, project_id: ProjectId) -> Result<Vec<Board>, WorkflowServiceError> {
        Ok(self.repo.load_boards(project_id)?)
    }

    /// Adds one board, seeded with tasks it should already hold.
    pub fn add_board(
        &self,
        project_id: ProjectId,
        name: impl Into<String>,
        owner_name: impl Into<String>,
    ) -> Result<Vec<Board>, WorkflowServiceError> {
        let name = normalize_name(name.into(), "board name")?;
        let owner_name = normalize_name(owner_name.into(), "board owner")?;
        if Assignment::is_reserved_name(&owner_name) {
            return Err(WorkflowServiceError::ReservedOwnerName);
        }

        let current = self.repo.load_boards(project_id)?;
        let next = add_board(&current, name, owner_name);
        self.persist(project_id, &next, "board_add")?;
        Ok(next)
    }

    /// Removes one board and its task copies.
    pub fn remove_board(
        &self,
        project_id: ProjectId,
        board_id: BoardId,
    ) -> Result<Vec<Board>, WorkflowServiceError> {
        let current = self.repo.load_boards(project_id)?;
        if !current.iter().any(|board| board.id == board_id) {
            return Err(WorkflowServiceError::BoardNotFound(board_id));
        }
        let next = remove_board(&current, board_id);
        self.persist(project_id, &next, "board_remove")?;
        Ok(next)
    }

    /// Creates a task and copies it onto every targeted board.
    pub fn create_task(
        &self,
        project_id: ProjectId,
        mut draft: TaskDraft,
    ) -> Result<TaskChange, WorkflowServiceError> {
        draft.title = draft.title.trim().to_string();
        if draft.title.is_empty() {
            return Err(TaskValidationError::BlankTitle.into());
        }
        self.mutate(project_id, TaskMutation::Create(draft))
    }

    /// Replaces a task and moves its copies to match the new assignment.
    ///
    /// A task ID unknown to every board is appended to the boards it targets.
    pub fn update_task(
        &self,
        project_id: ProjectId,
        mut task: Task,
    ) -> Result<TaskChange, WorkflowServiceError> {
        task.title = task.title.trim().to_string();
        if task.title.is_empty() {
            return Err(TaskValidationError::BlankTitle.into());
        }
        self.mutate(project_id, TaskMutation::Update(task))
    }

    /// Toggles completion of an existing task on every board.
    pub fn set_task_completed(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        completed: bool,
    ) -> Result<TaskChange, WorkflowServiceError> {
        let current = self.repo.load_boards(project_id)?;
        let mut task = find_task(&current, task_id)
            .cloned()
            .ok_or(WorkflowServiceError::TaskNotFound(task_id))?;
        task.completed = completed;
        self.mutate(project_id, TaskMutation::Update(task))
    }

    /// Removes a task from every board.
    pub fn delete_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> Result<TaskChange, WorkflowServiceError> {
        self.mutate(project_id, TaskMutation::Delete(task_id))
    }

    fn mutate(
        &self,
        project_id: ProjectId,
        mutation: TaskMutation,
    ) -> Result<TaskChange, WorkflowServiceError> {
        let current = self.repo.load_boards(project_id)?;
        if let TaskMutation::Update(task) = &mutation {
            if find_task(&current, task.id).is_none() {
                warn!(
                    "event=task_update module=workflow status=warn reason=unknown_task_appended"
                );
            }
        }

        let label = mutation.label();
        let outcome = apply_task_mutation(&current, mutation, now_epoch_ms());
        let touched = outcome
            .task
            .as_ref()
            .map(|task| {
                outcome
                    .boards
                    .iter()
                    .filter(|board| board.contains_task(task.id))
                    .count()
            })
            .unwrap_or(0);

        self.persist(project_id, &outcome.boards, "task_fanout")?;
        info!(
            "event=task_fanout module=workflow status=ok op={label} boards={} holding={touched}",
            outcome.boards.len()
        );

        Ok(TaskChange {
            task: outcome.task,
            boards: outcome.boards,
        })
    }

    fn persist(
        &self,
        project_id: ProjectId,
        boards: &[Board],
        event: &'static str,
    ) -> Result<(), WorkflowServiceError> {
        self.repo.replace_boards(project_id, boards).map_err(|err| {
            error!("event={event} module=workflow status=error error={err}");
            WorkflowServiceError::from(err)
        })
    }
}

fn find_task(boards: &[Board], task_id: TaskId) -> Option<&Task> {
    boards
        .iter()
        .flat_map(|board| board.tasks.iter())
        .find(|task| task.id == task_id)
}

fn normalize_name(value: String, field: &'static str) -> Result<String, WorkflowServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorkflowServiceError::BlankName(field));
    }
    Ok(trimmed.to_string())
}
