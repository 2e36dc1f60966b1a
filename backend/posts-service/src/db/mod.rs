//! Entity store for posts and comments
//!
//! One [`ContentStore`] implementation is picked at startup from
//! `STORAGE_BACKEND` and shared by every request as `Arc<dyn ContentStore>`.

use crate::config::{Config, StorageBackend};
use crate::error::{AppError, Result};
use crate::models::{Comment, NewComment, NewPost, Post};
use crate::pagination::{Page, PageRequest};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub mod memory;
pub mod postgres;
pub mod transaction;

pub use memory::MemoryStore;
pub use postgres::PgContentStore;
pub use transaction::run_in_transaction;

#[async_trait]
pub trait ContentStore: Send + Sync {
    fn backend(&self) -> StorageBackend;

    /// Validate and persist a post with a fresh id and creation time
    async fn create_post(&self, new_post: NewPost) -> Result<Post>;

    async fn get_post(&self, post_id: &str) -> Result<Post>;

    /// All posts, oldest first
    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// Persist a comment after checking, in order: the post exists, it accepts
    /// comments, the parent (if any) exists and belongs to the same post, and
    /// the content is valid
    async fn create_comment(&self, new_comment: NewComment) -> Result<Comment>;

    /// Succeeds when `comment_id` exists and belongs to `post_id`
    async fn comment_exists(&self, comment_id: &str, post_id: &str) -> Result<()>;

    /// One keyset page of a post's comments. A post without comments, or an
    /// unknown post, yields an empty page.
    async fn list_comments(&self, post_id: &str, request: &PageRequest) -> Result<Page<Comment>>;
}

/// Build the configured store. The relational backend connects, verifies the
/// connection and applies migrations before it is returned.
pub async fn build_store(config: &Config) -> Result<Arc<dyn ContentStore>> {
    match config.storage {
        StorageBackend::InMemory => {
            info!("Using in-memory storage");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            config.database.log_config();
            let pool = db_pool::create_pool(config.database.clone()).await?;
            let store = PgContentStore::new(pool, config.retry_policy());
            store.migrate().await?;
            info!("Using postgres storage");
            Ok(Arc::new(store))
        }
    }
}

/// `comments_allowed` is `None` when the post does not exist
pub(crate) fn ensure_commentable(post_id: &str, comments_allowed: Option<bool>) -> Result<()> {
    match comments_allowed {
        None => Err(AppError::PostNotFound(post_id.to_string())),
        Some(false) => Err(AppError::CommentsDisabled(post_id.to_string())),
        Some(true) => Ok(()),
    }
}

/// `parent_post_id` is the post the parent belongs to, `None` when the parent does not exist
pub(crate) fn ensure_parent(parent_id: &str, post_id: &str, parent_post_id: Option<&str>) -> Result<()> {
    match parent_post_id {
        None => Err(AppError::ParentNotFound(parent_id.to_string())),
        Some(owner) if owner != post_id => Err(AppError::ParentPostMismatch {
            parent_id: parent_id.to_string(),
            post_id: post_id.to_string(),
        }),
        Some(_) => Ok(()),
    }
}
