//! Project workflow board repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist projects and their complete board snapshots.
//! - Keep board and task ordering stable across reload.
//!
//! # Invariants
//! - Boards load in `sort_order ASC`; tasks load in `position ASC`.
//! - `replace_boards` is all-or-nothing: the previous snapshot survives any
//!   failed write.
//! - Snapshots that break task/board membership are rejected before writing.

use super::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::model::board::{Board, BoardId};
use crate::model::task::{Assignment, Task, TaskPriority};
use crate::workflow::fanout::membership_violations;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::collections::HashMap;
use uuid::Uuid;

/// Stable project identifier.
pub type ProjectId = Uuid;

/// Project header read model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}

/// Repository interface for workflow board snapshots.
pub trait BoardRepository {
    /// Creates one empty project.
    fn create_project(&self, name: &str) -> RepoResult<Project>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Loads the full ordered board snapshot of one project.
    fn load_boards(&self, project_id: ProjectId) -> RepoResult<Vec<Board>>;
    /// Replaces the full board snapshot of one project atomically.
    fn replace_boards(&self, project_id: ProjectId, boards: &[Board]) -> RepoResult<()>;
}

/// SQLite-backed board repository.
pub struct SqliteBoardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBoardRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["projects", "boards", "board_tasks"])?;
        Ok(Self { conn })
    }
}

impl BoardRepository for SqliteBoardRepository<'_> {
    fn create_project(&self, name: &str) -> RepoResult<Project> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO projects (uuid, name) VALUES (?1, ?2);",
            params![id.to_string(), name],
        )?;
        self.get_project(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created project {id} not found in read-back"))
        })
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, name, created_at FROM projects WHERE uuid = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            return Ok(Some(Project {
                id: parse_uuid(&uuid_text, "projects.uuid")?,
                name: row.get(1)?,
                created_at: row.get(2)?,
            }));
        }
        Ok(None)
    }

    fn load_boards(&self, project_id: ProjectId) -> RepoResult<Vec<Board>> {
        ensure_project_exists(self.conn, project_id)?;

        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, owner_name
             FROM boards
             WHERE project_uuid = ?1
             ORDER BY sort_order ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut boards = Vec::new();
        let mut index_by_id: HashMap<BoardId, usize> = HashMap::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            let board = Board {
                id: parse_uuid(&uuid_text, "boards.uuid")?,
                name: row.get(1)?,
                owner_name: row.get(2)?,
                tasks: Vec::new(),
            };
            index_by_id.insert(board.id, boards.len());
            boards.push(board);
        }

        let mut stmt = self.conn.prepare(
            "SELECT
                t.board_uuid AS board_uuid,
                t.task_uuid AS task_uuid,
                t.title AS title,
                t.priority AS priority,
                t.assigned_to AS assigned_to,
                t.completed AS completed,
                t.created_at AS created_at,
                t.updated_at AS updated_at
             FROM board_tasks t
             JOIN boards b ON b.uuid = t.board_uuid
             WHERE b.project_uuid = ?1
             ORDER BY t.board_uuid ASC, t.position ASC;",
        )?;
        let mut rows = stmt.query([project_id.to_string()])?;
        while let Some(row) = rows.next()? {
            let board_text: String = row.get("board_uuid")?;
            let board_id = parse_uuid(&board_text, "board_tasks.board_uuid")?;
            let task = parse_task_row(row)?;
            let Some(&index) = index_by_id.get(&board_id) else {
                return Err(RepoError::InvalidData(format!(
                    "task {} references unknown board {board_id}",
                    task.id
                )));
            };
            boards[index].tasks.push(task);
        }

        for board in &boards {
            board.validate()?;
        }
        Ok(boards)
    }

    fn replace_boards(&self, project_id: ProjectId, boards: &[Board]) -> RepoResult<()> {
        for board in boards {
            board.validate()?;
        }
        let violations = membership_violations(boards);
        if !violations.is_empty() {
            return Err(RepoError::InconsistentSnapshot(violations));
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_project_exists(&tx, project_id)?;

        tx.execute(
            "DELETE FROM boards WHERE project_uuid = ?1;",
            [project_id.to_string()],
        )?;

        {
            let mut insert_board = tx.prepare(
                "INSERT INTO boards (uuid, project_uuid, name, owner_name, sort_order)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            let mut insert_task = tx.prepare(
                "INSERT INTO board_tasks (
                    board_uuid,
                    task_uuid,
                    position,
                    title,
                    priority,
                    assigned_to,
                    completed,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            )?;

            for (sort_order, board) in boards.iter().enumerate() {
                insert_board.execute(params![
                    board.id.to_string(),
                    project_id.to_string(),
                    board.name.as_str(),
                    board.owner_name.as_str(),
                    sort_order as i64,
                ])?;
                for (position, task) in board.tasks.iter().enumerate() {
                    insert_task.execute(params![
                        board.id.to_string(),
                        task.id.to_string(),
                        position as i64,
                        task.title.as_str(),
                        task.priority.as_str(),
                        task.assigned_to.as_wire(),
                        bool_to_int(task.completed),
                        task.created_at,
                        task.updated_at,
                    ])?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }
}

fn ensure_project_exists(conn: &Connection, project_id: ProjectId) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM projects WHERE uuid = ?1);",
        [project_id.to_string()],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::ProjectNotFound(project_id))
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("task_uuid")?;
    let priority_text: String = row.get("priority")?;
    let priority = TaskPriority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in board_tasks.priority"
        ))
    })?;
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in board_tasks.completed"
            )));
        }
    };
    let assigned_to: Option<String> = row.get("assigned_to")?;

    Ok(Task {
        id: parse_uuid(&uuid_text, "board_tasks.task_uuid")?,
        title: row.get("title")?,
        priority,
        assigned_to: Assignment::parse(assigned_to.as_deref()),
        completed,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
