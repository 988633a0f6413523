use std::fmt::Display;
use std::future::Future;

/// Await a side-effect whose failure must not fail the analysis.
///
/// Errors are logged with the operation name and company, then dropped.
pub(crate) async fn best_effort<T, E, F>(operation: &'static str, company: &str, fut: F) -> Option<T>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(operation, company, error = %e, "best-effort operation failed");
            None
        }
    }
}
