use thiserror::Error;

/// The only failures that reach callers of the analysis pipeline. Everything
/// else degrades to a fallback inside the pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("analysis failed: {0}")]
    AggregateFailure(String),
}
