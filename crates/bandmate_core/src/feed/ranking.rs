//! Match scoring and feed ranking.
//!
//! # Responsibility
//! - Compute the weighted genre/role/skill match score of a post.
//! - Order scored posts for display.
//!
//! # Invariants
//! - Scores lie in `[0, 1]`.
//! - Order is score DESC, then `created_at` DESC, then input order.
//! - Ranking an already ranked list leaves its order unchanged.

use crate::model::profile::{Post, ScoredPost, UserProfile};
use std::cmp::Ordering;

/// Weight of an exact genre hit.
pub const GENRE_WEIGHT: f64 = 0.5;
/// Weight of any shared role between post needs and user roles.
pub const ROLE_WEIGHT: f64 = 0.3;
/// Weight of the fraction of post tags covered by user skills.
pub const SKILL_WEIGHT: f64 = 0.2;

/// Per-signal breakdown behind one match score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchBreakdown {
    /// `1.0` when the post genre is one of the user's genres.
    pub genre_match: f64,
    /// `1.0` when the post needs at least one role the user fills.
    pub role_match: f64,
    /// Share of post tags covered by user skills, `0.0` for untagged posts.
    pub skill_overlap: f64,
}

impl MatchBreakdown {
    /// Combines the signals with the fixed feed weights.
    pub fn score(&self) -> f64 {
        let raw = GENRE_WEIGHT * self.genre_match
            + ROLE_WEIGHT * self.role_match
            + SKILL_WEIGHT * self.skill_overlap;
        raw.clamp(0.0, 1.0)
    }
}

/// Computes the individual match signals of `post` for `user`.
pub fn match_components(user: &UserProfile, post: &Post) -> MatchBreakdown {
    let genre_match = if user.genres.contains(&post.genre) {
        1.0
    } else {
        0.0
    };

    let role_match = if post
        .roles_needed
        .iter()
        .any(|role| user.roles.contains(role))
    {
        1.0
    } else {
        0.0
    };

    let skill_overlap = if post.tags.is_empty() {
        0.0
    } else {
        let covered = post
            .tags
            .iter()
            .filter(|tag| user.skills.contains(*tag))
            .count();
        covered as f64 / post.tags.len() as f64
    };

    MatchBreakdown {
        genre_match,
        role_match,
        skill_overlap,
    }
}

/// Returns the weighted match score of `post` for `user`.
pub fn match_score(user: &UserProfile, post: &Post) -> f64 {
    match_components(user, post).score()
}

/// Scores and orders candidate posts for one user.
///
/// Accepts any number of posts, including none. The returned list is a fresh
/// allocation; `posts` is left untouched.
pub fn rank(user: &UserProfile, posts: &[Post]) -> Vec<ScoredPost> {
    let mut scored = posts
        .iter()
        .map(|post| ScoredPost {
            score: match_score(user, post),
            post: post.clone(),
        })
        .collect::<Vec<_>>();

    // `sort_by` is stable, so equal keys keep input order.
    scored.sort_by(compare_ranked);
    scored
}

fn compare_ranked(left: &ScoredPost, right: &ScoredPost) -> Ordering {
    right
        .score
        .total_cmp(&left.score)
        .then_with(|| right.post.created_at.cmp(&left.post.created_at))
}
