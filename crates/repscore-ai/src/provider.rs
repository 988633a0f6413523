use async_trait::async_trait;

use crate::error::ProviderError;

/// A text-completion backend.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Send a single user prompt and return the raw text reply.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}
