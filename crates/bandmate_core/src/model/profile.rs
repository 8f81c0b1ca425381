//! Profile and post model used by feed discovery.
//!
//! # Responsibility
//! - Describe what a musician plays and offers (`UserProfile`).
//! - Describe what a collaboration post asks for (`Post`).
//!
//! # Invariants
//! - Set-valued fields are never absent; missing wire fields decode as empty.
//! - `Post::created_at` is Unix epoch milliseconds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a user profile.
pub type ProfileId = Uuid;

/// Stable identifier of a feed post.
pub type PostId = Uuid;

/// Musician profile matched against feed posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: ProfileId,
    #[serde(default)]
    pub display_name: String,
    /// Genres the user plays or listens to.
    #[serde(default)]
    pub genres: BTreeSet<String>,
    /// Roles the user can fill (`producer`, `vocalist`, ...).
    #[serde(default)]
    pub roles: BTreeSet<String>,
    /// Concrete skills (`mixing`, `sound design`, ...).
    #[serde(default)]
    pub skills: BTreeSet<String>,
}

impl UserProfile {
    /// Creates an empty profile with a generated stable ID.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            genres: BTreeSet::new(),
            roles: BTreeSet::new(),
            skills: BTreeSet::new(),
        }
    }
}

/// Candidate collaboration post shown in the discovery feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// Author profile, when known. Used to hide a viewer's own posts.
    #[serde(default)]
    pub author_id: Option<ProfileId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub roles_needed: BTreeSet<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Post {
    /// Creates a post with a generated stable ID and empty tag/role sets.
    pub fn new(genre: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id: None,
            title: String::new(),
            genre: genre.into(),
            tags: BTreeSet::new(),
            roles_needed: BTreeSet::new(),
            created_at,
        }
    }

    /// Validates fields required before persistence.
    pub fn validate(&self) -> Result<(), PostValidationError> {
        if self.id.is_nil() {
            return Err(PostValidationError::NilUuid);
        }
        if self.created_at < 0 {
            return Err(PostValidationError::NegativeCreatedAt(self.created_at));
        }
        Ok(())
    }
}

/// Validation failures for `Post` writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    NilUuid,
    NegativeCreatedAt(i64),
}

impl Display for PostValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "post uuid must not be nil"),
            Self::NegativeCreatedAt(value) => {
                write!(f, "post created_at must be >= 0, got {value}")
            }
        }
    }
}

impl Error for PostValidationError {}

/// A post paired with its match score for one ranking pass.
///
/// Never persisted; rebuilt on every call to `feed::ranking::rank`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPost {
    pub post: Post,
    /// Weighted match score in `[0, 1]`.
    pub score: f64,
}
