//! Comment mutation and the comment connection type

use crate::models::{Comment, NewComment};
use crate::pagination::Page;
use crate::services::CommentService;
use async_graphql::{Context, ErrorExtensions, Object, Result as GraphQLResult, SimpleObject};
use std::sync::Arc;

#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "Comment")]
pub struct CommentObject {
    pub id: String,
    pub post_id: String,
    /// Comment this one replies to, absent for top-level comments
    pub parent_id: Option<String>,
    pub content: String,
    /// RFC 3339 creation time
    pub created_at: String,
}

impl From<Comment> for CommentObject {
    fn from(comment: Comment) -> Self {
        CommentObject {
            id: comment.id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            content: comment.content,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct CommentEdge {
    /// Pass as `after` to continue behind this comment
    pub cursor: String,
    pub node: CommentObject,
}

#[derive(SimpleObject, Clone, Debug)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(SimpleObject, Clone, Debug)]
pub struct CommentConnection {
    pub edges: Vec<CommentEdge>,
    pub page_info: PageInfo,
}

impl From<Page<Comment>> for CommentConnection {
    fn from(page: Page<Comment>) -> Self {
        CommentConnection {
            edges: page
                .items
                .into_iter()
                .map(|comment| CommentEdge {
                    cursor: comment.id.clone(),
                    node: comment.into(),
                })
                .collect(),
            page_info: PageInfo {
                has_next_page: page.has_next_page,
                end_cursor: page.end_cursor,
            },
        }
    }
}

#[derive(Default)]
pub struct CommentMutation;

#[Object]
impl CommentMutation {
    async fn create_comment(
        &self,
        ctx: &Context<'_>,
        post_id: String,
        parent_id: Option<String>,
        content: String,
    ) -> GraphQLResult<CommentObject> {
        let service = ctx.data::<Arc<CommentService>>()?;
        let comment = service
            .create_comment(NewComment::new(post_id, parent_id, content))
            .await
            .map_err(|e| e.extend())?;
        Ok(comment.into())
    }
}
