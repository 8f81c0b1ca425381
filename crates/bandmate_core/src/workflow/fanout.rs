//! Task fan-out across per-person boards.
//!
//! # Responsibility
//! - Apply one create/update/delete task mutation to a board snapshot.
//! - Keep board membership consistent with each task's `Assignment`.
//!
//! # Invariants
//! - Input snapshots are borrowed and never mutated; a new snapshot is returned.
//! - After every mutation a task is on board `b` iff its assignment targets
//!   `b.owner_name`.
//! - In-place updates keep the task's list position on each board.

use crate::model::board::{Board, BoardId};
use crate::model::task::{Task, TaskDraft, TaskId};
use std::collections::HashSet;

/// One task change requested by the workflow screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskMutation {
    /// Create a new task; ID and timestamps are assigned during fan-out.
    Create(TaskDraft),
    /// Replace a task by ID, possibly with a new assignment.
    Update(Task),
    /// Remove a task from every board.
    Delete(TaskId),
}

impl TaskMutation {
    /// Short stable label used in log events.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }
}

/// Result of applying one mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanoutOutcome {
    /// Complete new board snapshot, same board order as the input.
    pub boards: Vec<Board>,
    /// Stamped task for create/update; `None` for delete.
    pub task: Option<Task>,
}

/// How one board breaks the membership invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipViolation {
    /// Task sits on a board its assignment does not target.
    Stray { board_id: BoardId, task_id: TaskId },
    /// Task is targeted at a board that does not hold it.
    Missing { board_id: BoardId, task_id: TaskId },
}

/// Applies `mutation` to `boards` and returns the reconciled snapshot.
///
/// `now_ms` stamps `created_at`/`updated_at` for create and `updated_at` for
/// update. Assignments are made canonical before targeting, so a task lands
/// where its stored form says it belongs. None of the mutation kinds can fail.
pub fn apply_task_mutation(
    boards: &[Board],
    mutation: TaskMutation,
    now_ms: i64,
) -> FanoutOutcome {
    match mutation {
        TaskMutation::Create(draft) => {
            let task = Task::from_draft(draft, now_ms);
            FanoutOutcome {
                boards: fan_out_create(boards, &task),
                task: Some(task),
            }
        }
        TaskMutation::Update(mut task) => {
            task.assigned_to = std::mem::take(&mut task.assigned_to).canonical();
            task.updated_at = now_ms.max(task.created_at);
            FanoutOutcome {
                boards: fan_out_update(boards, &task),
                task: Some(task),
            }
        }
        TaskMutation::Delete(task_id) => FanoutOutcome {
            boards: fan_out_delete(boards, task_id),
            task: None,
        },
    }
}

fn fan_out_create(boards: &[Board], task: &Task) -> Vec<Board> {
    boards
        .iter()
        .map(|board| {
            let mut next = board.clone();
            if task.assigned_to.targets(&board.owner_name) {
                next.tasks.push(task.clone());
            }
            next
        })
        .collect()
}

// An unknown task id falls through to the append branch on every targeted
// board, so an update can introduce a task that was never created there.
fn fan_out_update(boards: &[Board], task: &Task) -> Vec<Board> {
    boards
        .iter()
        .map(|board| {
            let mut next = board.clone();
            let targeted = task.assigned_to.targets(&board.owner_name);
            match (next.position_of(task.id), targeted) {
                (Some(index), true) => next.tasks[index] = task.clone(),
                (Some(index), false) => {
                    next.tasks.remove(index);
                }
                (None, true) => next.tasks.push(task.clone()),
                (None, false) => {}
            }
            next
        })
        .collect()
}

fn fan_out_delete(boards: &[Board], task_id: TaskId) -> Vec<Board> {
    boards
        .iter()
        .map(|board| {
            let mut next = board.clone();
            next.tasks.retain(|task| task.id != task_id);
            next
        })
        .collect()
}

/// Appends a new board and seeds it with every existing task that targets
/// `owner_name`.
///
/// Seeded tasks keep the order in which they are first seen across the
/// current boards; duplicates by ID are collapsed.
pub fn add_board(
    boards: &[Board],
    name: impl Into<String>,
    owner_name: impl Into<String>,
) -> Vec<Board> {
    let mut board = Board::new(name, owner_name);
    for task in distinct_tasks(boards) {
        if task.assigned_to.targets(&board.owner_name) {
            board.tasks.push(task.clone());
        }
    }

    let mut next = boards.to_vec();
    next.push(board);
    next
}

/// Returns the snapshot without `board_id`. Unknown IDs leave it unchanged.
pub fn remove_board(boards: &[Board], board_id: BoardId) -> Vec<Board> {
    boards
        .iter()
        .filter(|board| board.id != board_id)
        .cloned()
        .collect()
}

/// Lists every board/task pair that breaks the membership invariant.
///
/// A task is known to the project if any board holds it; the copy seen first
/// decides its assignment.
pub fn membership_violations(boards: &[Board]) -> Vec<MembershipViolation> {
    let tasks = distinct_tasks(boards);
    let mut violations = Vec::new();

    for board in boards {
        for task in &board.tasks {
            if !task.assigned_to.targets(&board.owner_name) {
                violations.push(MembershipViolation::Stray {
                    board_id: board.id,
                    task_id: task.id,
                });
            }
        }
        for task in &tasks {
            if task.assigned_to.targets(&board.owner_name) && !board.contains_task(task.id) {
                violations.push(MembershipViolation::Missing {
                    board_id: board.id,
                    task_id: task.id,
                });
            }
        }
    }

    violations
}

fn distinct_tasks(boards: &[Board]) -> Vec<&Task> {
    let mut seen = HashSet::new();
    boards
        .iter()
        .flat_map(|board| board.tasks.iter())
        .filter(|task| seen.insert(task.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        add_board, apply_task_mutation, membership_violations, remove_board,
        MembershipViolation, TaskMutation,
    };
    use crate::model::board::Board;
    use crate::model::task::{Assignment, TaskDraft};

    fn two_boards() -> Vec<Board> {
        vec![Board::new("My tasks", "You"), Board::new("Sam's tasks", "Sam")]
    }

    fn titles(board: &Board) -> Vec<&str> {
        board.tasks.iter().map(|task| task.title.as_str()).collect()
    }

    #[test]
    fn create_stamps_id_and_timestamps() {
        let outcome = apply_task_mutation(
            &two_boards(),
            TaskMutation::Create(TaskDraft::new("write hook", Assignment::All)),
            42,
        );
        let task = outcome.task.unwrap();
        assert!(!task.id.is_nil());
        assert_eq!(task.created_at, 42);
        assert_eq!(task.updated_at, 42);
    }

    #[test]
    fn unassigned_create_lands_on_every_board() {
        let outcome = apply_task_mutation(
            &two_boards(),
            TaskMutation::Create(TaskDraft::new("pick a key", Assignment::Unassigned)),
            1,
        );
        assert!(outcome.boards.iter().all(|board| board.tasks.len() == 1));
    }

    #[test]
    fn update_in_place_preserves_position() {
        let boards = two_boards();
        let first = apply_task_mutation(
            &boards,
            TaskMutation::Create(TaskDraft::new("first", Assignment::All)),
            1,
        );
        let second = apply_task_mutation(
            &first.boards,
            TaskMutation::Create(TaskDraft::new("second", Assignment::All)),
            2,
        );

        let mut edited = first.task.unwrap();
        edited.title = "first (edited)".to_string();
        let updated = apply_task_mutation(&second.boards, TaskMutation::Update(edited), 3);

        for board in &updated.boards {
            assert_eq!(titles(board), vec!["first (edited)", "second"]);
            assert_eq!(board.tasks[0].updated_at, 3);
            assert_eq!(board.tasks[0].created_at, 1);
        }
    }

    #[test]
    fn update_never_moves_updated_at_before_created_at() {
        let created = apply_task_mutation(
            &two_boards(),
            TaskMutation::Create(TaskDraft::new("bounce", Assignment::All)),
            100,
        );
        let task = created.task.unwrap();
        let updated = apply_task_mutation(&created.boards, TaskMutation::Update(task), 50);
        assert_eq!(updated.task.unwrap().updated_at, 100);
    }

    #[test]
    fn delete_removes_task_regardless_of_assignment() {
        let created = apply_task_mutation(
            &two_boards(),
            TaskMutation::Create(TaskDraft::new("master", Assignment::All)),
            1,
        );
        let task_id = created.task.unwrap().id;
        let deleted = apply_task_mutation(&created.boards, TaskMutation::Delete(task_id), 2);
        assert!(deleted.task.is_none());
        assert!(deleted.boards.iter().all(|board| board.tasks.is_empty()));
    }

    #[test]
    fn input_snapshot_is_not_mutated() {
        let boards = two_boards();
        let before = boards.clone();
        let _ = apply_task_mutation(
            &boards,
            TaskMutation::Create(TaskDraft::new("lyrics", Assignment::All)),
            1,
        );
        assert_eq!(boards, before);
    }

    #[test]
    fn add_board_seeds_targeted_tasks_once() {
        let created = apply_task_mutation(
            &two_boards(),
            TaskMutation::Create(TaskDraft::new("shared", Assignment::All)),
            1,
        );
        let for_sam = apply_task_mutation(
            &created.boards,
            TaskMutation::Create(TaskDraft::new(
                "sam only",
                Assignment::Single("Sam".to_string()),
            )),
            2,
        );
        let for_kai = apply_task_mutation(
            &for_sam.boards,
            TaskMutation::Create(TaskDraft::new(
                "kai only",
                Assignment::Single("Kai".to_string()),
            )),
            3,
        );

        let boards = add_board(&for_kai.boards, "Kai's tasks", "Kai");
        let kai = boards.last().unwrap();
        assert_eq!(titles(kai), vec!["shared"]);
        assert!(membership_violations(&boards).is_empty());
    }

    #[test]
    fn remove_board_drops_only_that_board() {
        let boards = two_boards();
        let remaining = remove_board(&boards, boards[0].id);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].owner_name, "Sam");
    }

    #[test]
    fn violations_report_stray_and_missing_copies() {
        let created = apply_task_mutation(
            &two_boards(),
            TaskMutation::Create(TaskDraft::new(
                "sam only",
                Assignment::Single("Sam".to_string()),
            )),
            1,
        );
        let mut broken = created.boards.clone();
        let task = broken[1].tasks.remove(0);
        broken[0].tasks.push(task.clone());

        let violations = membership_violations(&broken);
        assert!(violations.contains(&MembershipViolation::Stray {
            board_id: broken[0].id,
            task_id: task.id,
        }));
        assert!(violations.contains(&MembershipViolation::Missing {
            board_id: broken[1].id,
            task_id: task.id,
        }));
    }
}
