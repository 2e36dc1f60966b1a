//! GraphQL schema for posts-service

use crate::error::AppError;
use crate::services::{CommentService, PostService};
use async_graphql::{EmptySubscription, ErrorExtensions, MergedObject, Schema};
use std::sync::Arc;

pub mod comments;
pub mod posts;

#[derive(MergedObject, Default)]
pub struct QueryRoot(posts::PostQuery);

#[derive(MergedObject, Default)]
pub struct MutationRoot(posts::PostMutation, comments::CommentMutation);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(posts: Arc<PostService>, comments: Arc<CommentService>) -> AppSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(posts)
        .data(comments)
        .finish()
}

/// Errors reach clients with their message and a `code` extension
impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", self.code()))
    }
}
