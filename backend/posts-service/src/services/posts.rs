/// Post service - handles post creation and retrieval
use crate::db::ContentStore;
use crate::error::Result;
use crate::metrics;
use crate::models::{NewPost, Post};
use std::sync::Arc;
use tracing::{info, instrument};

pub struct PostService {
    store: Arc<dyn ContentStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Create a new post
    #[instrument(name = "posts.create_post", skip_all, fields(backend = %self.store.backend()))]
    pub async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let result = self.store.create_post(new_post).await;
        metrics::observe(self.store.backend().as_str(), "create_post", &result);

        let post = result?;
        info!(post_id = %post.id, comments_allowed = post.comments_allowed, "Post created");
        Ok(post)
    }

    /// Get a post by ID
    #[instrument(name = "posts.get_post", skip(self), fields(backend = %self.store.backend()))]
    pub async fn get_post(&self, post_id: &str) -> Result<Post> {
        let result = self.store.get_post(post_id).await;
        metrics::observe(self.store.backend().as_str(), "get_post", &result);
        result
    }

    /// All posts, oldest first
    #[instrument(name = "posts.list_posts", skip(self), fields(backend = %self.store.backend()))]
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        let result = self.store.list_posts().await;
        metrics::observe(self.store.backend().as_str(), "list_posts", &result);
        result
    }
}
