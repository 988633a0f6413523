//! Ranked recommendations and review insight over a provider chain.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use repscore_core::{AiConfig, ReviewRecord, SentimentDistribution};

use crate::anthropic::AnthropicProvider;
use crate::openai::OpenAiProvider;
use crate::parse::{parse_response, truncate_to_char_boundary, ParsedInsight};
use crate::provider::GenerativeProvider;

pub const MAX_RECOMMENDATIONS: usize = 10;

/// Answer of [`RecommendationEngine::recommend`] when no provider produced one.
pub const STATIC_RECOMMENDATIONS: [&str; 4] = [
    "Improve SEO score by optimizing website content",
    "Increase positive reviews by asking satisfied customers",
    "Respond to all reviews within 24-48 hours",
    "Monitor online reputation regularly",
];

pub const DEFAULT_REVIEW_INSIGHT: &str = "Review analysis completed. Consider improving customer \
     service and product quality based on feedback.";

pub const DEFAULT_REVIEW_RECOMMENDATIONS: [&str; 4] = [
    "Respond to all reviews promptly",
    "Address negative feedback constructively",
    "Highlight positive aspects mentioned by customers",
    "Improve areas frequently mentioned in negative reviews",
];

pub const DEFAULT_REVIEW_THEMES: [&str; 2] = ["service", "quality"];

// Review corpus sent to a provider is capped to keep prompts bounded.
const REVIEW_CORPUS_MAX_BYTES: usize = 12_000;

/// Metrics the recommendation prompt is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationInput {
    pub seo_score: u8,
    pub sentiment: SentimentDistribution,
    pub review_count: u32,
    pub average_rating: f64,
}

/// Narrative analysis of a set of reviews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewInsight {
    pub insights: Value,
    pub recommendations: Vec<String>,
    pub themes: Vec<String>,
}

impl ReviewInsight {
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            insights: Value::String(DEFAULT_REVIEW_INSIGHT.to_string()),
            recommendations: DEFAULT_REVIEW_RECOMMENDATIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            themes: DEFAULT_REVIEW_THEMES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    fn from_parsed(parsed: &ParsedInsight) -> Self {
        Self {
            insights: parsed.insights(),
            recommendations: parsed.recommendations(),
            themes: parsed.themes(),
        }
    }
}

#[derive(Clone, Default)]
pub struct RecommendationEngine {
    providers: Vec<Arc<dyn GenerativeProvider>>,
}

impl RecommendationEngine {
    /// Build an engine over an explicit provider chain, tried in order.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn GenerativeProvider>>) -> Self {
        Self { providers }
    }

    /// Build the Anthropic → OpenAI chain from whichever keys are configured.
    #[must_use]
    pub fn from_config(config: &AiConfig, http: &reqwest::Client) -> Self {
        let mut providers: Vec<Arc<dyn GenerativeProvider>> = Vec::new();
        if let Some(key) = config.anthropic_api_key.as_deref() {
            providers.push(Arc::new(AnthropicProvider::new(
                http.clone(),
                key,
                &config.anthropic_model,
            )));
        }
        if let Some(key) = config.openai_api_key.as_deref() {
            providers.push(Arc::new(OpenAiProvider::new(
                http.clone(),
                key,
                &config.openai_model,
            )));
        }
        Self::new(providers)
    }

    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Ranked recommendations, at most [`MAX_RECOMMENDATIONS`].
    ///
    /// Never fails: without a usable provider answer the
    /// [`STATIC_RECOMMENDATIONS`] are returned in order.
    pub async fn recommend(&self, input: &RecommendationInput) -> Vec<String> {
        let prompt = recommendation_prompt(input);
        for provider in &self.providers {
            match provider.complete(&prompt).await {
                Ok(reply) => {
                    let mut recommendations = parse_response(&reply).recommendations();
                    if recommendations.is_empty() {
                        tracing::warn!(
                            provider = provider.name(),
                            "provider reply contained no recommendations"
                        );
                        continue;
                    }
                    recommendations.truncate(MAX_RECOMMENDATIONS);
                    return recommendations;
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %e,
                        "recommendation request failed"
                    );
                }
            }
        }

        STATIC_RECOMMENDATIONS
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    }

    /// Narrative insight, recommendations, and themes for a review corpus.
    ///
    /// Falls back to [`ReviewInsight::fallback`] when no provider answers.
    pub async fn analyze_reviews(&self, reviews: &[ReviewRecord]) -> ReviewInsight {
        if self.providers.is_empty() || reviews.is_empty() {
            return ReviewInsight::fallback();
        }

        let prompt = review_prompt(reviews);
        for provider in &self.providers {
            match provider.complete(&prompt).await {
                Ok(reply) => return ReviewInsight::from_parsed(&parse_response(&reply)),
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        reviews = reviews.len(),
                        error = %e,
                        "review analysis request failed"
                    );
                }
            }
        }

        ReviewInsight::fallback()
    }
}

fn recommendation_prompt(input: &RecommendationInput) -> String {
    let sentiment = serde_json::to_string(&input.sentiment).unwrap_or_else(|_| "{}".to_string());
    let average_rating = if input.review_count == 0 {
        "N/A".to_string()
    } else {
        format!("{:.2}", input.average_rating)
    };
    format!(
        "Based on the following business analysis data, provide specific, actionable recommendations:\n\n\
         SEO Score: {}\n\
         Sentiment Analysis: {sentiment}\n\
         Review Count: {}\n\
         Average Rating: {average_rating}\n\n\
         Provide 5-10 specific recommendations to improve online reputation and SEO. \
         Respond in JSON with a \"recommendations\" array of strings.",
        input.seo_score, input.review_count,
    )
}

fn review_prompt(reviews: &[ReviewRecord]) -> String {
    let corpus = reviews
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let corpus = truncate_to_char_boundary(&corpus, REVIEW_CORPUS_MAX_BYTES);
    format!(
        "Analyze the following business reviews and provide:\n\
         1. Overall sentiment analysis\n\
         2. Key themes and topics mentioned\n\
         3. Specific areas of praise or concern\n\
         4. Actionable recommendations for the business\n\n\
         Reviews:\n{corpus}\n\n\
         Provide a comprehensive analysis in JSON format with insights and recommendations."
    )
}
