//! Integration Tests: GraphQL API
//!
//! Executes queries and mutations against the schema backed by the in-memory store.

use async_graphql::{Request, Variables};
use posts_service::db::{ContentStore, MemoryStore};
use posts_service::locks::KeyedLocks;
use posts_service::schema::{build_schema, AppSchema};
use posts_service::services::{CommentService, PostService};
use serde_json::{json, Value};
use std::sync::Arc;

fn schema() -> AppSchema {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    build_schema(
        Arc::new(PostService::new(store.clone())),
        Arc::new(CommentService::new(store, Arc::new(KeyedLocks::new()), 20)),
    )
}

async fn execute(schema: &AppSchema, query: &str, variables: Value) -> Value {
    let response = schema
        .execute(Request::new(query).variables(Variables::from_json(variables)))
        .await;
    serde_json::to_value(&response).unwrap()
}

async fn create_post(schema: &AppSchema, comments_allowed: bool) -> String {
    let response = execute(
        schema,
        r#"mutation($allowed: Boolean!) {
            createPost(title: "Hello", content: "World", commentsAllowed: $allowed) { id }
        }"#,
        json!({ "allowed": comments_allowed }),
    )
    .await;
    response["data"]["createPost"]["id"].as_str().unwrap().to_string()
}

async fn create_comment(schema: &AppSchema, post_id: &str, parent_id: Option<&str>) -> Value {
    execute(
        schema,
        r#"mutation($postId: String!, $parentId: String) {
            createComment(postId: $postId, parentId: $parentId, content: "nice") { id postId parentId }
        }"#,
        json!({ "postId": post_id, "parentId": parent_id }),
    )
    .await
}

const COMMENTS_QUERY: &str = r#"query($id: String!, $first: Int, $after: String) {
    post(id: $id) {
        comments(first: $first, after: $after) {
            edges { cursor node { id } }
            pageInfo { hasNextPage endCursor }
        }
    }
}"#;

#[tokio::test]
async fn test_create_and_fetch_post() {
    let schema = schema();
    let id = create_post(&schema, true).await;

    let response = execute(
        &schema,
        r#"query($id: String!) { post(id: $id) { id title content commentsAllowed } posts { id } }"#,
        json!({ "id": id }),
    )
    .await;

    assert_eq!(response["data"]["post"]["title"], "Hello");
    assert_eq!(response["data"]["post"]["commentsAllowed"], true);
    assert_eq!(response["data"]["posts"][0]["id"], json!(id));
}

#[tokio::test]
async fn test_threaded_comments_page_through() {
    let schema = schema();
    let post_id = create_post(&schema, true).await;

    let root = create_comment(&schema, &post_id, None).await;
    let root_id = root["data"]["createComment"]["id"].as_str().unwrap().to_string();
    let reply = create_comment(&schema, &post_id, Some(&root_id)).await;
    assert_eq!(reply["data"]["createComment"]["parentId"], json!(root_id));
    create_comment(&schema, &post_id, None).await;

    let first = execute(&schema, COMMENTS_QUERY, json!({ "id": post_id, "first": 2 })).await;
    let connection = &first["data"]["post"]["comments"];
    assert_eq!(connection["edges"].as_array().unwrap().len(), 2);
    assert_eq!(connection["edges"][0]["cursor"], json!(root_id));
    assert_eq!(connection["pageInfo"]["hasNextPage"], true);

    let end_cursor = connection["pageInfo"]["endCursor"].clone();
    let second = execute(
        &schema,
        COMMENTS_QUERY,
        json!({ "id": post_id, "first": 2, "after": end_cursor }),
    )
    .await;
    let connection = &second["data"]["post"]["comments"];
    assert_eq!(connection["edges"].as_array().unwrap().len(), 1);
    assert_eq!(connection["pageInfo"]["hasNextPage"], false);
}

#[tokio::test]
async fn test_errors_carry_codes() {
    let schema = schema();
    let closed = create_post(&schema, false).await;

    let response = create_comment(&schema, &closed, None).await;
    assert_eq!(response["errors"][0]["extensions"]["code"], "COMMENTS_DISABLED");

    let response = execute(&schema, COMMENTS_QUERY, json!({ "id": closed })).await;
    assert_eq!(response["errors"][0]["extensions"]["code"], "MISSING_PAGE_SIZE");

    let response = execute(&schema, COMMENTS_QUERY, json!({ "id": closed, "first": 21 })).await;
    assert_eq!(response["errors"][0]["extensions"]["code"], "PAGE_SIZE_TOO_LARGE");

    let response = execute(
        &schema,
        r#"mutation { createPost(title: "", content: "x", commentsAllowed: true) { id } }"#,
        json!({}),
    )
    .await;
    assert_eq!(response["errors"][0]["extensions"]["code"], "EMPTY_FIELD");

    let response = execute(&schema, r#"{ post(id: "ghost") { id } }"#, json!({})).await;
    assert_eq!(response["errors"][0]["extensions"]["code"], "POST_NOT_FOUND");
}
