/// Error types for posts-service
///
/// Storage and pagination errors are returned to the caller unchanged. Failures of
/// transactional units of work carry the name of the operation that ran them.
use resilience::{classify_message, Classify, FailureKind, RetryError};
use thiserror::Error;

/// Result type for posts-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0} must not be empty")]
    EmptyField(&'static str),

    #[error("Validation error: {field} exceeds {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("Validation error: page size is required")]
    MissingPageSize,

    #[error("Validation error: page size must not be negative, got {0}")]
    InvalidPageSize(i64),

    #[error("Validation error: page size {requested} exceeds the limit of {max}")]
    PageSizeTooLarge { requested: i64, max: usize },

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Comment not found: {0}")]
    CommentNotFound(String),

    #[error("Parent comment not found: {0}")]
    ParentNotFound(String),

    #[error("Comment {parent_id} does not belong to post {post_id}")]
    ParentPostMismatch { parent_id: String, post_id: String },

    #[error("Comments are disabled for post {0}")]
    CommentsDisabled(String),

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// Timeout, deadlock or serialization conflict reported by the backend
    #[error("{op}: conflict: {source}")]
    Conflict {
        op: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("{op}: failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        op: &'static str,
        attempts: u32,
        /// Failure of the last attempt
        #[source]
        source: Box<AppError>,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code, exposed to API clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::EmptyField(_) => "EMPTY_FIELD",
            AppError::FieldTooLong { .. } => "FIELD_TOO_LONG",
            AppError::MissingPageSize => "MISSING_PAGE_SIZE",
            AppError::InvalidPageSize(_) => "INVALID_PAGE_SIZE",
            AppError::PageSizeTooLarge { .. } => "PAGE_SIZE_TOO_LARGE",
            AppError::PostNotFound(_) => "POST_NOT_FOUND",
            AppError::CommentNotFound(_) => "COMMENT_NOT_FOUND",
            AppError::ParentNotFound(_) => "PARENT_NOT_FOUND",
            AppError::ParentPostMismatch { .. } => "PARENT_POST_MISMATCH",
            AppError::CommentsDisabled(_) => "COMMENTS_DISABLED",
            AppError::InvalidCursor(_) => "INVALID_CURSOR",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::RetriesExhausted { .. } => "RETRIES_EXHAUSTED",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    /// Bad input from the caller
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::EmptyField(_)
                | AppError::FieldTooLong { .. }
                | AppError::MissingPageSize
                | AppError::InvalidPageSize(_)
                | AppError::PageSizeTooLarge { .. }
        )
    }

    /// Flatten the outcome of a retried unit of work named `op`
    pub fn from_retry(op: &'static str, err: RetryError<AppError>) -> Self {
        match err {
            RetryError::Aborted(inner) => inner,
            RetryError::Conflict { error, .. } => AppError::Conflict {
                op,
                source: Box::new(error),
            },
            RetryError::Exhausted { attempts, error } => AppError::RetriesExhausted {
                op,
                attempts,
                source: Box::new(error),
            },
        }
    }
}

fn classify_sqlx(err: &sqlx::Error) -> FailureKind {
    if let Some(code) = err.as_database_error().and_then(|db| db.code()) {
        match &*code {
            // serialization_failure, deadlock_detected, lock_not_available, query_canceled
            "40001" | "40P01" | "55P03" | "57014" => return FailureKind::Conflict,
            // integrity, data and syntax classes fail the same way every time
            c if c.starts_with("23") || c.starts_with("22") || c.starts_with("42") => {
                return FailureKind::Permanent
            }
            _ => {}
        }
    }

    // sqlx words its own timeouts without "timeout"
    match err {
        sqlx::Error::PoolTimedOut => return FailureKind::Conflict,
        sqlx::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::TimedOut => {
            return FailureKind::Conflict
        }
        _ => {}
    }

    if matches!(
        err,
        sqlx::Error::RowNotFound
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. }
    ) {
        return FailureKind::Permanent;
    }

    classify_message(&err.to_string()).unwrap_or(FailureKind::Transient)
}

impl Classify for AppError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            AppError::Database(err) => classify_sqlx(err),
            AppError::Conflict { .. } => FailureKind::Conflict,
            _ => FailureKind::Permanent,
        }
    }
}
