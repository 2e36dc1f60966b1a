/// Data models for posts-service
///
/// - `Post`: a titled text post that may accept comments
/// - `Comment`: a comment on a post, optionally replying to another comment of the same post
/// - `NewPost` / `NewComment`: validated creation requests
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_POST_CONTENT_LENGTH: usize = 10_000;
pub const MAX_COMMENT_LENGTH: usize = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub comments_allowed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    /// `None` for top-level comments
    pub parent_id: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub comments_allowed: bool,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>, comments_allowed: bool) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            comments_allowed,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_text("title", &self.title, MAX_TITLE_LENGTH)?;
        check_text("content", &self.content, MAX_POST_CONTENT_LENGTH)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub post_id: String,
    pub parent_id: Option<String>,
    pub content: String,
}

impl NewComment {
    pub fn new(
        post_id: impl Into<String>,
        parent_id: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            post_id: post_id.into(),
            // an empty parent id from the API means "top-level"
            parent_id: parent_id.filter(|id| !id.is_empty()),
            content: content.into(),
        }
    }

    pub fn validate_content(&self) -> Result<()> {
        check_text("content", &self.content, MAX_COMMENT_LENGTH)
    }
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::EmptyField(field));
    }
    if value.chars().count() > max {
        return Err(AppError::FieldTooLong { field, max });
    }
    Ok(())
}
