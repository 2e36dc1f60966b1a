/// Comment service - handles comment creation and paging
///
/// Writers take the post's exclusive lock and readers its shared lock, so a
/// page never interleaves with an insert into the same thread.
use crate::db::ContentStore;
use crate::error::Result;
use crate::locks::KeyedLocks;
use crate::metrics;
use crate::models::{Comment, NewComment};
use crate::pagination::{Page, PageRequest};
use std::sync::Arc;
use tracing::{info, instrument};

pub struct CommentService {
    store: Arc<dyn ContentStore>,
    locks: Arc<KeyedLocks>,
    max_page_size: usize,
}

impl CommentService {
    pub fn new(store: Arc<dyn ContentStore>, locks: Arc<KeyedLocks>, max_page_size: usize) -> Self {
        Self {
            store,
            locks,
            max_page_size,
        }
    }

    /// Create a comment on a post, optionally as a reply to another comment
    #[instrument(
        name = "comments.create_comment",
        skip_all,
        fields(backend = %self.store.backend(), post_id = %new_comment.post_id)
    )]
    pub async fn create_comment(&self, new_comment: NewComment) -> Result<Comment> {
        let _guard = self.locks.acquire(&new_comment.post_id).await;

        let result = self.store.create_comment(new_comment).await;
        metrics::observe(self.store.backend().as_str(), "create_comment", &result);

        let comment = result?;
        info!(comment_id = %comment.id, parent_id = ?comment.parent_id, "Comment created");
        Ok(comment)
    }

    /// One page of a post's comments, oldest first
    #[instrument(name = "comments.list_comments", skip(self), fields(backend = %self.store.backend()))]
    pub async fn list_comments(
        &self,
        post_id: &str,
        first: Option<i64>,
        after: Option<String>,
    ) -> Result<Page<Comment>> {
        let request = PageRequest::new(first, after, self.max_page_size)?;
        let _guard = self.locks.acquire_shared(post_id).await;

        let result = self.store.list_comments(post_id, &request).await;
        metrics::observe(self.store.backend().as_str(), "list_comments", &result);
        result
    }

    /// Check that `comment_id` exists and belongs to `post_id`
    #[instrument(name = "comments.comment_exists", skip(self), fields(backend = %self.store.backend()))]
    pub async fn comment_exists(&self, comment_id: &str, post_id: &str) -> Result<()> {
        let result = self.store.comment_exists(comment_id, post_id).await;
        metrics::observe(self.store.backend().as_str(), "comment_exists", &result);
        result
    }
}
