//! Discovery feed use-case service.
//!
//! # Responsibility
//! - Save profiles and publish posts with normalized vocabulary.
//! - Serve the ranked, paginated discovery feed of one viewer.
//!
//! # Invariants
//! - Genres, roles, skills and tags are stored trimmed, lowercase and deduplicated.
//! - A viewer never sees their own posts.
//! - Page order follows `feed::ranking::rank`.

use crate::feed::ranking::rank;
use crate::model::profile::{Post, ProfileId, ScoredPost, UserProfile};
use crate::repo::feed_repo::{FeedRepository, PostListQuery};
use crate::repo::RepoError;
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Page size used when the caller does not pass one.
pub const FEED_DEFAULT_LIMIT: u32 = 20;
/// Upper bound for one feed page.
pub const FEED_LIMIT_MAX: u32 = 100;

/// Service error for feed use-cases.
#[derive(Debug)]
pub enum FeedServiceError {
    /// Viewer profile does not exist.
    ProfileNotFound(ProfileId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for FeedServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProfileNotFound(id) => write!(f, "profile not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent feed state: {details}"),
        }
    }
}

impl Error for FeedServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for FeedServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ProfileNotFound(id) => Self::ProfileNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Paging and recency window for one `ranked_feed` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedRequest {
    /// `None`/`0` uses the default page size; larger values are capped.
    pub limit: Option<u32>,
    pub offset: u32,
    /// Only rank posts created at or after this epoch-ms instant.
    pub since: Option<i64>,
}

/// One page of the ranked discovery feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage {
    pub items: Vec<ScoredPost>,
    /// Number of candidates ranked before pagination.
    pub total_candidates: usize,
    /// Effective normalized limit used for this page.
    pub applied_limit: u32,
}

/// Feed service facade over repository implementations.
pub struct FeedService<R: FeedRepository> {
    repo: R,
}

impl<R: FeedRepository> FeedService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Normalizes and stores one profile, returning the stored shape.
    pub fn save_profile(
        &self,
        mut profile: UserProfile,
    ) -> Result<UserProfile, FeedServiceError> {
        profile.display_name = profile.display_name.trim().to_string();
        profile.genres = normalize_terms(&profile.genres);
        profile.roles = normalize_terms(&profile.roles);
        profile.skills = normalize_terms(&profile.skills);

        self.repo.upsert_profile(&profile)?;
        self.repo
            .get_profile(profile.id)?
            .ok_or(FeedServiceError::InconsistentState(
                "saved profile not found in read-back",
            ))
    }

    /// Normalizes and stores one post, returning the stored shape.
    pub fn publish_post(&self, mut post: Post) -> Result<Post, FeedServiceError> {
        post.title = post.title.trim().to_string();
        post.genre = normalize_term(&post.genre).unwrap_or_default();
        post.tags = normalize_terms(&post.tags);
        post.roles_needed = normalize_terms(&post.roles_needed);

        let post_id = self.repo.create_post(&post)?;
        info!("event=post_publish module=feed status=ok tags={}", post.tags.len());
        self.repo
            .get_post(post_id)?
            .ok_or(FeedServiceError::InconsistentState(
                "published post not found in read-back",
            ))
    }

    /// Ranks every candidate for `viewer_id` and returns one page.
    ///
    /// Pagination is applied after ranking, so page boundaries follow score
    /// order rather than storage order.
    pub fn ranked_feed(
        &self,
        viewer_id: ProfileId,
        request: FeedRequest,
    ) -> Result<FeedPage, FeedServiceError> {
        let started_at = Instant::now();
        let Some(viewer) = self.repo.get_profile(viewer_id)? else {
            warn!("event=feed_rank module=feed status=error error_code=profile_not_found");
            return Err(FeedServiceError::ProfileNotFound(viewer_id));
        };

        let candidates = self.repo.list_posts(&PostListQuery {
            exclude_author: Some(viewer_id),
            since: request.since,
        })?;

        let applied_limit = normalize_feed_limit(request.limit);
        let ranked = rank(&viewer, &candidates);
        let total_candidates = ranked.len();
        let items = ranked
            .into_iter()
            .skip(request.offset as usize)
            .take(applied_limit as usize)
            .collect::<Vec<_>>();

        info!(
            "event=feed_rank module=feed status=ok candidates={} returned={} duration_ms={}",
            total_candidates,
            items.len(),
            started_at.elapsed().as_millis()
        );

        Ok(FeedPage {
            items,
            total_candidates,
            applied_limit,
        })
    }
}

/// Clamps a requested page size into `1..=FEED_LIMIT_MAX`.
pub fn normalize_feed_limit(limit: Option<u32>) -> u32 {
    match limit {
        None | Some(0) => FEED_DEFAULT_LIMIT,
        Some(value) => value.min(FEED_LIMIT_MAX),
    }
}

/// Normalizes one vocabulary term. Returns `None` for blank input.
pub fn normalize_term(value: &str) -> Option<String> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

fn normalize_terms(values: &BTreeSet<String>) -> BTreeSet<String> {
    values
        .iter()
        .filter_map(|value| normalize_term(value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_feed_limit, normalize_term, FEED_DEFAULT_LIMIT, FEED_LIMIT_MAX};

    #[test]
    fn feed_limit_defaults_and_caps() {
        assert_eq!(normalize_feed_limit(None), FEED_DEFAULT_LIMIT);
        assert_eq!(normalize_feed_limit(Some(0)), FEED_DEFAULT_LIMIT);
        assert_eq!(normalize_feed_limit(Some(7)), 7);
        assert_eq!(normalize_feed_limit(Some(5_000)), FEED_LIMIT_MAX);
    }

    #[test]
    fn normalize_term_trims_and_lowercases() {
        assert_eq!(normalize_term("  Lo-Fi "), Some("lo-fi".to_string()));
        assert_eq!(normalize_term("   "), None);
    }
}
