//! In-process store
//!
//! Posts and comments live in two maps, each behind its own reader/writer lock.
//! Lock scopes never span an await point.

use super::{ensure_commentable, ensure_parent, ContentStore};
use crate::config::StorageBackend;
use crate::error::{AppError, Result};
use crate::models::{Comment, NewComment, NewPost, Post};
use crate::pagination::{keyset_cmp, paginate, Page, PageRequest};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: RwLock<HashMap<String, Post>>,
    comments: RwLock<HashMap<String, Comment>>,
    /// Last timestamp handed out
    clock: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strictly increasing creation times, even when the wall clock stalls or steps back
    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut last = self.clock.lock();
        let now = Utc::now();
        let stamp = match *last {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(stamp);
        stamp
    }

    fn comments_allowed(&self, post_id: &str) -> Option<bool> {
        self.posts.read().get(post_id).map(|post| post.comments_allowed)
    }

    fn comment_post(&self, comment_id: &str) -> Option<String> {
        self.comments
            .read()
            .get(comment_id)
            .map(|comment| comment.post_id.clone())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::InMemory
    }

    async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        new_post.validate()?;

        let post = Post {
            id: Uuid::new_v4().to_string(),
            title: new_post.title,
            content: new_post.content,
            comments_allowed: new_post.comments_allowed,
            created_at: self.next_timestamp(),
        };
        self.posts.write().insert(post.id.clone(), post.clone());

        debug!(post_id = %post.id, "post stored");
        Ok(post)
    }

    async fn get_post(&self, post_id: &str) -> Result<Post> {
        self.posts
            .read()
            .get(post_id)
            .cloned()
            .ok_or_else(|| AppError::PostNotFound(post_id.to_string()))
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self.posts.read().values().cloned().collect();
        posts.sort_by(keyset_cmp);
        Ok(posts)
    }

    async fn create_comment(&self, new_comment: NewComment) -> Result<Comment> {
        ensure_commentable(&new_comment.post_id, self.comments_allowed(&new_comment.post_id))?;
        if let Some(parent_id) = &new_comment.parent_id {
            ensure_parent(
                parent_id,
                &new_comment.post_id,
                self.comment_post(parent_id).as_deref(),
            )?;
        }
        new_comment.validate_content()?;

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            post_id: new_comment.post_id,
            parent_id: new_comment.parent_id,
            content: new_comment.content,
            created_at: self.next_timestamp(),
        };
        self.comments
            .write()
            .insert(comment.id.clone(), comment.clone());

        debug!(comment_id = %comment.id, post_id = %comment.post_id, "comment stored");
        Ok(comment)
    }

    async fn comment_exists(&self, comment_id: &str, post_id: &str) -> Result<()> {
        match self.comment_post(comment_id) {
            None => Err(AppError::CommentNotFound(comment_id.to_string())),
            Some(owner) if owner != post_id => Err(AppError::ParentPostMismatch {
                parent_id: comment_id.to_string(),
                post_id: post_id.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    async fn list_comments(&self, post_id: &str, request: &PageRequest) -> Result<Page<Comment>> {
        let candidates: Vec<Comment> = self
            .comments
            .read()
            .values()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect();

        paginate(candidates, request)
    }
}
