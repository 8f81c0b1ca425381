//! FFI use-case API for mobile-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to the UI via FRB.
//! - Keep error semantics simple: envelopes with `ok` + `message`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Structured payloads (profiles, posts, boards, tasks) cross the boundary
//!   as JSON strings.

use bandmate_core::db::open_db;
use bandmate_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    rank, Assignment, Board, FeedRequest, FeedService, FeedServiceError, Post, ScoredPost,
    SqliteBoardRepository, SqliteFeedRepository, Task, TaskDraft, TaskPriority, UserProfile,
    WorkflowService, WorkflowServiceError,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const DB_FILE_NAME: &str = "bandmate.sqlite3";
const DB_PATH_ENV: &str = "BANDMATE_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One ranked feed entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRankItem {
    pub post_id: String,
    /// Match score in `[0, 1]`.
    pub score: f64,
}

/// Response envelope for `feed_rank`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRankResponse {
    pub ok: bool,
    /// Posts in display order.
    pub items: Vec<FeedRankItem>,
    pub message: String,
}

/// Ranks externally sourced posts for one profile.
///
/// Input semantics:
/// - `profile_json`: one `UserProfile` object.
/// - `posts_json`: array of `Post` objects; missing sets decode as empty.
///
/// # FFI contract
/// - Sync call, pure computation, no DB access.
/// - Never panics; malformed JSON yields `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn feed_rank(profile_json: String, posts_json: String) -> FeedRankResponse {
    let parsed = serde_json::from_str::<UserProfile>(&profile_json)
        .map_err(|err| format!("invalid profile json: {err}"))
        .and_then(|profile| {
            serde_json::from_str::<Vec<Post>>(&posts_json)
                .map(|posts| (profile, posts))
                .map_err(|err| format!("invalid posts json: {err}"))
        });

    match parsed {
        Ok((profile, posts)) => {
            let items = rank(&profile, &posts)
                .iter()
                .map(rank_item)
                .collect::<Vec<_>>();
            FeedRankResponse {
                ok: true,
                message: format!("Ranked {} post(s).", items.len()),
                items,
            }
        }
        Err(message) => {
            warn!("event=ffi_feed_rank module=ffi status=error error_code=invalid_json");
            FeedRankResponse {
                ok: false,
                items: Vec::new(),
                message: format!("feed_rank failed: {message}"),
            }
        }
    }
}

/// Response envelope for feed writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSaveResponse {
    pub ok: bool,
    /// ID of the stored profile or post.
    pub id: Option<String>,
    /// Stored, normalized record as JSON.
    pub record_json: Option<String>,
    pub message: String,
}

impl FeedSaveResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            record_json: None,
            message: message.into(),
        }
    }

    fn stored<T: serde::Serialize>(message: &str, id: Uuid, record: &T) -> Self {
        match serde_json::to_string(record) {
            Ok(json) => Self {
                ok: true,
                id: Some(id.to_string()),
                record_json: Some(json),
                message: message.to_string(),
            },
            Err(err) => Self::failure(format!("failed to encode record: {err}")),
        }
    }
}

/// Stores or replaces one profile.
///
/// Input semantics:
/// - `profile_json`: one `UserProfile`; genres, roles and skills are stored
///   trimmed and lowercase.
#[flutter_rust_bridge::frb(sync)]
pub fn feed_save_profile(profile_json: String) -> FeedSaveResponse {
    let profile = match serde_json::from_str::<UserProfile>(&profile_json) {
        Ok(profile) => profile,
        Err(err) => {
            return FeedSaveResponse::failure(format!(
                "feed_save_profile failed: invalid profile json: {err}"
            ))
        }
    };
    match with_feed_service(|service| service.save_profile(profile)) {
        Ok(saved) => FeedSaveResponse::stored("Profile saved.", saved.id, &saved),
        Err(err) => FeedSaveResponse::failure(format!("feed_save_profile failed: {err}")),
    }
}

/// Publishes one post into the local feed store.
#[flutter_rust_bridge::frb(sync)]
pub fn feed_publish_post(post_json: String) -> FeedSaveResponse {
    let post = match serde_json::from_str::<Post>(&post_json) {
        Ok(post) => post,
        Err(err) => {
            return FeedSaveResponse::failure(format!(
                "feed_publish_post failed: invalid post json: {err}"
            ))
        }
    };
    match with_feed_service(|service| service.publish_post(post)) {
        Ok(stored) => FeedSaveResponse::stored("Post published.", stored.id, &stored),
        Err(err) => FeedSaveResponse::failure(format!("feed_publish_post failed: {err}")),
    }
}

/// Response envelope for `feed_ranked_feed`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPageResponse {
    pub ok: bool,
    /// Page entries in display order.
    pub items: Vec<FeedRankItem>,
    /// Page entries with full post bodies, as a JSON array of `{post, score}`.
    pub items_json: Option<String>,
    /// Candidates ranked before paging.
    pub total_candidates: u32,
    /// Effective page size after defaulting and capping.
    pub applied_limit: u32,
    pub message: String,
}

impl FeedPageResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            items_json: None,
            total_candidates: 0,
            applied_limit: 0,
            message: message.into(),
        }
    }
}

/// Returns one ranked page of stored posts for a stored viewer profile.
///
/// Input semantics:
/// - `limit`: `None`/`0` uses the default page size, larger values are capped.
/// - `since`: optional epoch-ms lower bound on post `created_at`.
#[flutter_rust_bridge::frb(sync)]
pub fn feed_ranked_feed(
    viewer_id: String,
    limit: Option<u32>,
    offset: u32,
    since: Option<i64>,
) -> FeedPageResponse {
    let viewer = match parse_id(&viewer_id, "viewer_id") {
        Ok(id) => id,
        Err(message) => return FeedPageResponse::failure(message),
    };
    let request = FeedRequest {
        limit,
        offset,
        since,
    };
    let page = match with_feed_service(|service| service.ranked_feed(viewer, request)) {
        Ok(page) => page,
        Err(err) => return FeedPageResponse::failure(format!("feed_ranked_feed failed: {err}")),
    };
    let items_json = match serde_json::to_string(&page.items) {
        Ok(json) => json,
        Err(err) => return FeedPageResponse::failure(format!("failed to encode page: {err}")),
    };
    FeedPageResponse {
        ok: true,
        items: page.items.iter().map(rank_item).collect(),
        items_json: Some(items_json),
        total_candidates: u32::try_from(page.total_candidates).unwrap_or(u32::MAX),
        applied_limit: page.applied_limit,
        message: format!("Ranked {} candidate(s).", page.total_candidates),
    }
}

fn rank_item(scored: &ScoredPost) -> FeedRankItem {
    FeedRankItem {
        post_id: scored.post.id.to_string(),
        score: scored.score,
    }
}

/// Generic response envelope for workflow calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Project ID for project-level calls.
    pub project_id: Option<String>,
    /// Created/updated task ID for task calls.
    pub task_id: Option<String>,
    /// Current board snapshot as a JSON array of boards.
    pub boards_json: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl WorkflowResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            project_id: None,
            task_id: None,
            boards_json: None,
            message: message.into(),
        }
    }

    fn with_boards(
        message: impl Into<String>,
        project_id: Option<String>,
        task_id: Option<String>,
        boards: &[Board],
    ) -> Self {
        match serde_json::to_string(boards) {
            Ok(json) => Self {
                ok: true,
                project_id,
                task_id,
                boards_json: Some(json),
                message: message.into(),
            },
            Err(err) => Self::failure(format!("failed to encode boards: {err}")),
        }
    }
}

/// Creates one empty project workflow.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_create_project(name: String) -> WorkflowResponse {
    match with_workflow_service(|service| service.create_project(name)) {
        Ok(project) => WorkflowResponse::with_boards(
            "Project created.",
            Some(project.id.to_string()),
            None,
            &[],
        ),
        Err(err) => WorkflowResponse::failure(format!("workflow_create_project failed: {err}")),
    }
}

/// Returns the board snapshot of one project.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_boards(project_id: String) -> WorkflowResponse {
    let project = match parse_id(&project_id, "project_id") {
        Ok(id) => id,
        Err(message) => return WorkflowResponse::failure(message),
    };
    match with_workflow_service(|service| service.boards(project)) {
        Ok(boards) => {
            WorkflowResponse::with_boards("Boards loaded.", Some(project_id), None, &boards)
        }
        Err(err) => WorkflowResponse::failure(format!("workflow_boards failed: {err}")),
    }
}

/// Adds one board for `owner_name`.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_add_board(
    project_id: String,
    name: String,
    owner_name: String,
) -> WorkflowResponse {
    let project = match parse_id(&project_id, "project_id") {
        Ok(id) => id,
        Err(message) => return WorkflowResponse::failure(message),
    };
    match with_workflow_service(|service| service.add_board(project, name, owner_name)) {
        Ok(boards) => {
            WorkflowResponse::with_boards("Board added.", Some(project_id), None, &boards)
        }
        Err(err) => WorkflowResponse::failure(format!("workflow_add_board failed: {err}")),
    }
}

/// Creates one task and fans it out.
///
/// Input semantics:
/// - `priority`: `low|medium|high`; `None` means `medium`.
/// - `assigned_to`: `None`/empty for unassigned, `Both` for every board,
///   otherwise one board owner name.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_create_task(
    project_id: String,
    title: String,
    priority: Option<String>,
    assigned_to: Option<String>,
) -> WorkflowResponse {
    let project = match parse_id(&project_id, "project_id") {
        Ok(id) => id,
        Err(message) => return WorkflowResponse::failure(message),
    };
    let priority = match priority.as_deref().map(str::trim) {
        None | Some("") => TaskPriority::default(),
        Some(raw) => match TaskPriority::parse(raw) {
            Some(priority) => priority,
            None => {
                return WorkflowResponse::failure(format!(
                    "workflow_create_task failed: unsupported priority `{raw}`"
                ))
            }
        },
    };

    let mut draft = TaskDraft::new(title, Assignment::parse(assigned_to.as_deref()));
    draft.priority = priority;
    match with_workflow_service(|service| service.create_task(project, draft)) {
        Ok(change) => WorkflowResponse::with_boards(
            "Task created.",
            Some(project_id),
            change.task.map(|task| task.id.to_string()),
            &change.boards,
        ),
        Err(err) => WorkflowResponse::failure(format!("workflow_create_task failed: {err}")),
    }
}

/// Replaces one task from its JSON form and fans the change out.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_update_task(project_id: String, task_json: String) -> WorkflowResponse {
    let project = match parse_id(&project_id, "project_id") {
        Ok(id) => id,
        Err(message) => return WorkflowResponse::failure(message),
    };
    let task = match serde_json::from_str::<Task>(&task_json) {
        Ok(task) => task,
        Err(err) => {
            return WorkflowResponse::failure(format!(
                "workflow_update_task failed: invalid task json: {err}"
            ))
        }
    };
    match with_workflow_service(|service| service.update_task(project, task)) {
        Ok(change) => WorkflowResponse::with_boards(
            "Task updated.",
            Some(project_id),
            change.task.map(|task| task.id.to_string()),
            &change.boards,
        ),
        Err(err) => WorkflowResponse::failure(format!("workflow_update_task failed: {err}")),
    }
}

/// Marks one task complete or incomplete on every board.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_set_task_completed(
    project_id: String,
    task_id: String,
    completed: bool,
) -> WorkflowResponse {
    let ids = parse_id(&project_id, "project_id")
        .and_then(|project| parse_id(&task_id, "task_id").map(|task| (project, task)));
    let (project, task) = match ids {
        Ok(ids) => ids,
        Err(message) => return WorkflowResponse::failure(message),
    };
    match with_workflow_service(|service| service.set_task_completed(project, task, completed)) {
        Ok(change) => WorkflowResponse::with_boards(
            "Task updated.",
            Some(project_id),
            Some(task_id),
            &change.boards,
        ),
        Err(err) => {
            WorkflowResponse::failure(format!("workflow_set_task_completed failed: {err}"))
        }
    }
}

/// Removes one task from every board.
#[flutter_rust_bridge::frb(sync)]
pub fn workflow_delete_task(project_id: String, task_id: String) -> WorkflowResponse {
    let ids = parse_id(&project_id, "project_id")
        .and_then(|project| parse_id(&task_id, "task_id").map(|task| (project, task)));
    let (project, task) = match ids {
        Ok(ids) => ids,
        Err(message) => return WorkflowResponse::failure(message),
    };
    match with_workflow_service(|service| service.delete_task(project, task)) {
        Ok(change) => WorkflowResponse::with_boards(
            "Task deleted.",
            Some(project_id),
            Some(task_id),
            &change.boards,
        ),
        Err(err) => WorkflowResponse::failure(format!("workflow_delete_task failed: {err}")),
    }
}

fn parse_id(raw: &str, field: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid {field}: `{raw}`"))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_feed_service<T>(
    f: impl FnOnce(&FeedService<SqliteFeedRepository<'_>>) -> Result<T, FeedServiceError>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("DB open failed: {err}"))?;
    let repo =
        SqliteFeedRepository::try_new(&conn).map_err(|err| format!("repo init failed: {err}"))?;
    let service = FeedService::new(repo);
    f(&service).map_err(|err| err.to_string())
}

fn with_workflow_service<T>(
    f: impl FnOnce(&WorkflowService<SqliteBoardRepository<'_>>) -> Result<T, WorkflowServiceError>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("DB open failed: {err}"))?;
    let repo =
        SqliteBoardRepository::try_new(&conn).map_err(|err| format!("repo init failed: {err}"))?;
    let service = WorkflowService::new(repo);
    f(&service).map_err(|err| err.to_string())
}
