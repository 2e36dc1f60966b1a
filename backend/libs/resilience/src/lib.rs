/// Resilience primitives shared by the storage backends
///
/// This library provides:
/// - **Retry**: bounded, linearly backed-off re-execution of a unit of work, with
///   failures classified as transient, conflicting or permanent
/// - **Timeout**: time limits for connectivity checks against external backends
///
/// # Example: retrying a fallible operation
///
/// ```rust,no_run
/// use resilience::{with_retry, Classify, FailureKind, RetryPolicy};
///
/// #[derive(Debug)]
/// struct Blip;
///
/// impl std::fmt::Display for Blip {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         f.write_str("connection reset")
///     }
/// }
///
/// impl Classify for Blip {
///     fn failure_kind(&self) -> FailureKind {
///         FailureKind::Transient
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let policy = RetryPolicy::default();
///     let result = with_retry(&policy, |_attempt| async { Ok::<_, Blip>(42) }).await;
///     assert_eq!(result.ok(), Some(42));
/// }
/// ```

pub mod retry;
pub mod timeout;

pub use retry::{
    classify_message, with_retry, Classify, ConflictPolicy, FailureKind, RetryError, RetryPolicy,
};
pub use timeout::{with_timeout, TimeoutError};
