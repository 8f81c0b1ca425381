//! Profile and post repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist musician profiles and collaboration posts locally.
//! - Keep JSON encoding of set-valued columns inside the repository.
//!
//! # Invariants
//! - Post writes call `Post::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Post listing order is `created_at DESC, uuid ASC`.

use super::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::model::profile::{Post, PostId, ProfileId, UserProfile};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;

const POST_SELECT_SQL: &str = "SELECT
    uuid,
    author_uuid,
    title,
    genre,
    tags_json,
    roles_needed_json,
    created_at
FROM posts";

/// Query options for listing feed candidates.
#[derive(Debug, Clone, Default)]
pub struct PostListQuery {
    /// Hide posts written by this profile.
    pub exclude_author: Option<ProfileId>,
    /// Only posts created at or after this epoch-ms instant.
    pub since: Option<i64>,
}

/// Repository interface for profile and post persistence.
pub trait FeedRepository {
    /// Inserts or fully replaces one profile.
    fn upsert_profile(&self, profile: &UserProfile) -> RepoResult<()>;
    fn get_profile(&self, id: ProfileId) -> RepoResult<Option<UserProfile>>;
    fn create_post(&self, post: &Post) -> RepoResult<PostId>;
    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>>;
    fn list_posts(&self, query: &PostListQuery) -> RepoResult<Vec<Post>>;
    fn delete_post(&self, id: PostId) -> RepoResult<()>;
}

/// SQLite-backed feed repository.
pub struct SqliteFeedRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFeedRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["profiles", "posts"])?;
        Ok(Self { conn })
    }
}

impl FeedRepository for SqliteFeedRepository<'_> {
    fn upsert_profile(&self, profile: &UserProfile) -> RepoResult<()> {
        if profile.id.is_nil() {
            return Err(RepoError::InvalidData("profile uuid must not be nil".to_string()));
        }

        self.conn.execute(
            "INSERT INTO profiles (uuid, display_name, genres_json, roles_json, skills_json)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (uuid) DO UPDATE SET
                display_name = excluded.display_name,
                genres_json = excluded.genres_json,
                roles_json = excluded.roles_json,
                skills_json = excluded.skills_json,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                profile.id.to_string(),
                profile.display_name.as_str(),
                encode_set(&profile.genres)?,
                encode_set(&profile.roles)?,
                encode_set(&profile.skills)?,
            ],
        )?;
        Ok(())
    }

    fn get_profile(&self, id: ProfileId) -> RepoResult<Option<UserProfile>> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, display_name, genres_json, roles_json, skills_json
                 FROM profiles
                 WHERE uuid = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((uuid, display_name, genres, roles, skills)) = row else {
            return Ok(None);
        };

        Ok(Some(UserProfile {
            id: parse_uuid(&uuid, "profiles.uuid")?,
            display_name,
            genres: decode_set(&genres, "profiles.genres_json")?,
            roles: decode_set(&roles, "profiles.roles_json")?,
            skills: decode_set(&skills, "profiles.skills_json")?,
        }))
    }

    fn create_post(&self, post: &Post) -> RepoResult<PostId> {
        post.validate()?;

        self.conn.execute(
            "INSERT INTO posts (
                uuid,
                author_uuid,
                title,
                genre,
                tags_json,
                roles_needed_json,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                post.id.to_string(),
                post.author_id.map(|id| id.to_string()),
                post.title.as_str(),
                post.genre.as_str(),
                encode_set(&post.tags)?,
                encode_set(&post.roles_needed)?,
                post.created_at,
            ],
        )?;

        Ok(post.id)
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_row(row)?));
        }
        Ok(None)
    }

    fn list_posts(&self, query: &PostListQuery) -> RepoResult<Vec<Post>> {
        let mut sql = format!("{POST_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(author) = query.exclude_author {
            sql.push_str(" AND (author_uuid IS NULL OR author_uuid != ?)");
            bind_values.push(Value::Text(author.to_string()));
        }

        if let Some(since) = query.since {
            sql.push_str(" AND created_at >= ?");
            bind_values.push(Value::Integer(since));
        }

        sql.push_str(" ORDER BY created_at DESC, uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row)?);
        }
        Ok(posts)
    }

    fn delete_post(&self, id: PostId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM posts WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::PostNotFound(id));
        }
        Ok(())
    }
}

fn parse_post_row(row: &Row<'_>) -> RepoResult<Post> {
    let uuid_text: String = row.get("uuid")?;
    let author_id = match row.get::<_, Option<String>>("author_uuid")? {
        Some(value) => Some(parse_uuid(&value, "posts.author_uuid")?),
        None => None,
    };
    let tags_json: String = row.get("tags_json")?;
    let roles_json: String = row.get("roles_needed_json")?;

    let post = Post {
        id: parse_uuid(&uuid_text, "posts.uuid")?,
        author_id,
        title: row.get("title")?,
        genre: row.get("genre")?,
        tags: decode_set(&tags_json, "posts.tags_json")?,
        roles_needed: decode_set(&roles_json, "posts.roles_needed_json")?,
        created_at: row.get("created_at")?,
    };
    post.validate()?;
    Ok(post)
}

fn encode_set(values: &BTreeSet<String>) -> RepoResult<String> {
    serde_json::to_string(values)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode set: {err}")))
}

fn decode_set(raw: &str, column: &str) -> RepoResult<BTreeSet<String>> {
    serde_json::from_str(raw)
        .map_err(|err| RepoError::InvalidData(format!("invalid json array in {column}: {err}")))
}
