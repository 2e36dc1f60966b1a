/// Business logic layer for posts-service
///
/// - Post service: post creation and retrieval
/// - Comment service: comment creation and paging, serialized per post
pub mod comments;
pub mod posts;

pub use comments::CommentService;
pub use posts::PostService;
