//! Post queries and mutations

use super::comments::CommentConnection;
use crate::models::{NewPost, Post};
use crate::services::{CommentService, PostService};
use async_graphql::{ComplexObject, Context, ErrorExtensions, Object, Result as GraphQLResult, SimpleObject};
use std::sync::Arc;

#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "Post", complex)]
pub struct PostObject {
    pub id: String,
    pub title: String,
    pub content: String,
    pub comments_allowed: bool,
    /// RFC 3339 creation time
    pub created_at: String,
}

impl From<Post> for PostObject {
    fn from(post: Post) -> Self {
        PostObject {
            id: post.id,
            title: post.title,
            content: post.content,
            comments_allowed: post.comments_allowed,
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

#[ComplexObject]
impl PostObject {
    /// Comments of this post, oldest first
    async fn comments(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
    ) -> GraphQLResult<CommentConnection> {
        let service = ctx.data::<Arc<CommentService>>()?;
        let page = service
            .list_comments(&self.id, first.map(i64::from), after)
            .await
            .map_err(|e| e.extend())?;
        Ok(page.into())
    }
}

#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    /// All posts, oldest first
    async fn posts(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<PostObject>> {
        let service = ctx.data::<Arc<PostService>>()?;
        let posts = service.list_posts().await.map_err(|e| e.extend())?;
        Ok(posts.into_iter().map(PostObject::from).collect())
    }

    async fn post(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<PostObject> {
        let service = ctx.data::<Arc<PostService>>()?;
        let post = service.get_post(&id).await.map_err(|e| e.extend())?;
        Ok(post.into())
    }
}

#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    async fn create_post(
        &self,
        ctx: &Context<'_>,
        title: String,
        content: String,
        comments_allowed: bool,
    ) -> GraphQLResult<PostObject> {
        let service = ctx.data::<Arc<PostService>>()?;
        let post = service
            .create_post(NewPost::new(title, content, comments_allowed))
            .await
            .map_err(|e| e.extend())?;
        Ok(post.into())
    }
}
