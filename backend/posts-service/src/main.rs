use actix_web::{web, App, HttpResponse, HttpServer};
use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};
use posts_service::config::{Config, StorageBackend};
use posts_service::locks::KeyedLocks;
use posts_service::schema::{build_schema, AppSchema};
use posts_service::services::{CommentService, PostService};
use posts_service::{db, metrics};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::prelude::*;

async fn graphql_handler(schema: web::Data<AppSchema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn playground_handler() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(playground_source(GraphQLPlaygroundConfig::new("/query")))
}

async fn health_handler(backend: web::Data<StorageBackend>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "posts-service",
        "storage": backend.as_str(),
    }))
}

fn init_tracing(production: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,posts_service=debug".into());

    if production {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Periodically drop lock entries for posts nobody is working on
fn spawn_lock_pruner(locks: Arc<KeyedLocks>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // the first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let pruned = locks.prune_idle();
            if pruned > 0 {
                debug!(pruned, remaining = locks.len(), "Pruned idle post locks");
            }
        }
    });
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()
        .map_err(|e| io::Error::other(format!("Failed to load configuration: {}", e)))?;

    init_tracing(config.is_production());
    info!(
        env = %config.app.env,
        storage = %config.storage,
        "Starting posts-service"
    );

    let store = db::build_store(&config).await.map_err(|e| {
        error!(error = %e, "Failed to initialize storage");
        io::Error::other(e.to_string())
    })?;

    let locks = Arc::new(KeyedLocks::new());
    if config.locks.prune_interval_secs > 0 {
        spawn_lock_pruner(
            locks.clone(),
            Duration::from_secs(config.locks.prune_interval_secs),
        );
    }

    let posts = Arc::new(PostService::new(store.clone()));
    let comments = Arc::new(CommentService::new(
        store.clone(),
        locks,
        config.pagination.max_page_size,
    ));
    let schema = build_schema(posts, comments);
    let backend = store.backend();

    let bind_addr = format!("{}:{}", config.app.host, config.app.port);
    info!("GraphQL playground available at http://{}/playground", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(schema.clone()))
            .app_data(web::Data::new(backend))
            .service(
                web::resource("/query")
                    .route(web::post().to(graphql_handler))
                    .route(web::get().to(graphql_handler)),
            )
            .route("/playground", web::get().to(playground_handler))
            .route("/api/v1/health", web::get().to(health_handler))
            .route("/metrics", web::get().to(metrics::serve_metrics))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
