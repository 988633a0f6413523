//! Generative-AI recommendations and review insight for repscore.
//!
//! Providers are tried in a fixed order (Anthropic, then OpenAI). When none
//! is configured or all fail, the engine answers from deterministic fallbacks
//! so callers never see a provider error.

pub mod anthropic;
pub mod engine;
pub mod error;
pub mod openai;
pub mod parse;
pub mod provider;

pub use anthropic::AnthropicProvider;
pub use engine::{
    RecommendationEngine, RecommendationInput, ReviewInsight, DEFAULT_REVIEW_INSIGHT,
    DEFAULT_REVIEW_RECOMMENDATIONS, DEFAULT_REVIEW_THEMES, MAX_RECOMMENDATIONS,
    STATIC_RECOMMENDATIONS,
};
pub use error::ProviderError;
pub use openai::OpenAiProvider;
pub use parse::{parse_response, strip_code_blocks, truncate_to_char_boundary, ParsedInsight};
pub use provider::GenerativeProvider;
