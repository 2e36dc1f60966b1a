//! Prometheus metrics for posts-service.
//!
//! Counts store operations by backend and outcome and serves the `/metrics` endpoint.

use crate::error::AppError;
use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    /// Store operations segmented by backend, operation and outcome.
    pub static ref STORE_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "posts_store_operations_total",
        "Store operations segmented by backend, operation and outcome",
        &["backend", "operation", "outcome"]
    )
    .expect("failed to register posts_store_operations_total");
}

/// Record the outcome of one store call. Errors are labelled with their code.
pub fn observe<T>(backend: &str, operation: &str, result: &Result<T, AppError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(err) => err.code(),
    };
    STORE_OPERATIONS_TOTAL
        .with_label_values(&[backend, operation, outcome])
        .inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_labels_errors_by_code() {
        let failed: Result<(), AppError> = Err(AppError::PostNotFound("p".into()));
        let before = STORE_OPERATIONS_TOTAL
            .with_label_values(&["test-backend", "get_post", "POST_NOT_FOUND"])
            .get();

        observe("test-backend", "get_post", &failed);

        let after = STORE_OPERATIONS_TOTAL
            .with_label_values(&["test-backend", "get_post", "POST_NOT_FOUND"])
            .get();
        assert_eq!(after, before + 1);
    }
}
