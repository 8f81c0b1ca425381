//! Core domain logic for Bandmate.
//! This crate is the single source of truth for feed ranking and board fan-out.

pub mod db;
pub mod feed;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod workflow;

pub use feed::ranking::{match_components, match_score, rank, MatchBreakdown};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::{Board, BoardId, BoardValidationError};
pub use model::profile::{Post, PostId, ProfileId, ScoredPost, UserProfile};
pub use model::task::{Assignment, Task, TaskDraft, TaskId, TaskPriority, TaskValidationError};
pub use repo::board_repo::{BoardRepository, Project, ProjectId, SqliteBoardRepository};
pub use repo::feed_repo::{FeedRepository, PostListQuery, SqliteFeedRepository};
pub use repo::{RepoError, RepoResult};
pub use service::feed_service::{FeedPage, FeedRequest, FeedService, FeedServiceError};
pub use service::workflow_service::{TaskChange, WorkflowService, WorkflowServiceError};
pub use workflow::fanout::{
    add_board, apply_task_mutation, membership_violations, remove_board, FanoutOutcome,
    MembershipViolation, TaskMutation,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
