//! The comprehensive analysis run.
//!
//! One run resolves the company, answers from a fresh cached analysis when
//! there is one, and otherwise scores the website and collects reviews
//! concurrently before summarising, recommending, and persisting. Only input
//! validation and an unresolvable company identity fail the run; every other
//! collaborator failure degrades to that branch's fallback.
//!
//! Two concurrent runs for the same company may both compute and persist;
//! the last write wins.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use repscore_ai::{
    RecommendationEngine, RecommendationInput, ReviewInsight, STATIC_RECOMMENDATIONS,
};
use repscore_core::{
    AppConfig, CompanyInfo, MetricsSnapshot, Platform, ReputationAnalysis, ReviewDetails,
    ReviewRecord, ReviewsSection, SentimentCounts, SentimentDistribution, SentimentSummary,
    SeoReport, Store,
};
use repscore_sentiment::{local_summary, ReviewAggregator, ReviewCollection};
use repscore_seo::{default_report, HttpPageFetcher, SeoScorer};

use crate::charts::build_charts;
use crate::company::{refresh_profile, resolve_company};
use crate::effect::best_effort;
use crate::error::AnalysisError;
use crate::score::{reputation_score, sentiment_score};

const DEFAULT_FRESHNESS_SECS: u64 = 3_600;
const DEFAULT_BRANCH_TIMEOUT_SECS: u64 = 45;
const NO_REVIEWS_INSIGHT: &str = "No reviews were found for this company.";

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// A stored analysis younger than this is returned as-is.
    pub freshness: Duration,
    /// Upper bound for each upstream branch; expiry yields its fallback.
    pub branch_timeout: Duration,
    pub platforms: Vec<Platform>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            freshness: Duration::from_secs(DEFAULT_FRESHNESS_SECS),
            branch_timeout: Duration::from_secs(DEFAULT_BRANCH_TIMEOUT_SECS),
            platforms: vec![Platform::Google, Platform::Yelp, Platform::Reddit],
        }
    }
}

impl AnalysisSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            freshness: Duration::from_secs(config.cache_ttl_secs),
            branch_timeout: Duration::from_secs(config.branch_timeout_secs),
            platforms: config.review_platforms.clone(),
        }
    }
}

#[derive(Clone)]
pub struct Analyzer {
    store: Arc<dyn Store>,
    seo: SeoScorer,
    reviews: ReviewAggregator,
    engine: Arc<RecommendationEngine>,
    settings: AnalysisSettings,
}

impl Analyzer {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        seo: SeoScorer,
        reviews: ReviewAggregator,
        engine: Arc<RecommendationEngine>,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            store,
            seo,
            reviews,
            engine,
            settings,
        }
    }

    /// Wire the real collaborators from configuration over one shared HTTP
    /// client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig, store: Arc<dyn Store>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .connect_timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(config.http_user_agent.as_str())
            .build()?;

        let engine = Arc::new(RecommendationEngine::from_config(&config.ai, &http));
        let fetcher = HttpPageFetcher::new(
            http.clone(),
            config.http_max_retries,
            config.http_retry_backoff_base_ms,
        );
        let reviews = ReviewAggregator::from_config(&config.sources, &http, Arc::clone(&engine));

        tracing::info!(
            providers = ?engine.provider_names(),
            review_sources = ?reviews.configured_platforms(),
            "analysis pipeline configured"
        );

        Ok(Self::new(
            store,
            SeoScorer::new(Arc::new(fetcher)),
            reviews,
            engine,
            AnalysisSettings::from_app_config(config),
        ))
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Produce the reputation analysis for a company.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Validation`] for a blank company name and
    /// [`AnalysisError::AggregateFailure`] if the company identity cannot be
    /// established.
    pub async fn run_analysis(
        &self,
        company_name: &str,
        location: &str,
        website: &str,
    ) -> Result<ReputationAnalysis, AnalysisError> {
        let name = company_name.trim();
        if name.is_empty() {
            return Err(AnalysisError::Validation(
                "companyName is required".to_string(),
            ));
        }
        let location = location.trim();
        let website = website.trim();

        let mut profile = resolve_company(self.store.as_ref(), name, location, website).await?;

        if profile.persisted {
            if let Some(cached) = self.fresh_cached(profile.id, name).await {
                tracing::info!(company = name, timestamp = %cached.timestamp, "serving cached analysis");
                return Ok(cached);
            }
        }

        let platforms = &self.settings.platforms;
        let (seo, collection) = tokio::join!(
            self.score_website(name, website),
            self.collect_reviews(name, location, platforms),
        );

        let reviews = if profile.persisted && !collection.reviews.is_empty() {
            best_effort(
                "persist_reviews",
                name,
                self.reviews
                    .persist(self.store.as_ref(), profile.id, &collection.reviews),
            )
            .await
            .unwrap_or_else(|| collection.reviews.clone())
        } else {
            collection.reviews.clone()
        };

        let sentiment = self.summarize(name, &reviews).await;
        let sentiment_score = sentiment_score(&sentiment.sentiment_distribution);

        let recommendations = self
            .recommend(
                name,
                &RecommendationInput {
                    seo_score: seo.overall_score,
                    sentiment: sentiment.sentiment_distribution,
                    review_count: collection.total_reviews,
                    average_rating: sentiment.average_rating,
                },
            )
            .await;

        let now = Utc::now();
        refresh_profile(&mut profile, &reviews, now);

        let mut analysis = ReputationAnalysis {
            company_name: name.to_string(),
            location: location.to_string(),
            website: website.to_string(),
            timestamp: now,
            overall_score: reputation_score(
                seo.overall_score,
                sentiment_score,
                collection.total_reviews,
            ),
            metrics: MetricsSnapshot {
                total_reviews: collection.total_reviews,
                average_rating: sentiment.average_rating,
                seo_score: seo.overall_score,
                sentiment_score,
                response_rate: profile.metrics.response_rate,
            },
            charts: build_charts(&sentiment, &reviews, &seo),
            company_info: CompanyInfo::from(&profile),
            reviews: ReviewsSection {
                summary: sentiment,
                details: ReviewDetails {
                    total_reviews: collection.total_reviews,
                    reviews,
                    platforms: collection.platforms,
                },
            },
            recommendations,
            seo,
        };

        if profile.persisted {
            best_effort("save_company", name, self.store.save_company(&profile)).await;
            if let Some(recorded) = best_effort(
                "save_analysis",
                name,
                self.store.save_analysis(profile.id, &analysis),
            )
            .await
            {
                analysis.timestamp = recorded;
            }
        }

        tracing::info!(
            company = name,
            overall_score = analysis.overall_score,
            reviews = analysis.metrics.total_reviews,
            seo_score = analysis.metrics.seo_score,
            "analysis complete"
        );

        Ok(analysis)
    }

    async fn fresh_cached(
        &self,
        company_id: Uuid,
        name: &str,
    ) -> Option<ReputationAnalysis> {
        let cached = best_effort(
            "find_recent_analysis",
            name,
            self.store.find_recent_analysis(company_id),
        )
        .await
        .flatten()?;

        let age = Utc::now().signed_duration_since(cached.timestamp);
        // A timestamp in the future (clock skew) counts as fresh.
        let fresh = match age.to_std() {
            Ok(age) => age < self.settings.freshness,
            Err(_) => true,
        };
        fresh.then_some(cached)
    }

    async fn score_website(&self, name: &str, website: &str) -> SeoReport {
        match tokio::time::timeout(self.settings.branch_timeout, self.seo.score(name, website)).await
        {
            Ok(report) => report,
            Err(_) => {
                tracing::warn!(company = name, website, "SEO scoring timed out");
                default_report()
            }
        }
    }

    async fn collect_reviews(
        &self,
        name: &str,
        location: &str,
        platforms: &[Platform],
    ) -> ReviewCollection {
        match tokio::time::timeout(
            self.settings.branch_timeout,
            self.reviews.collect(name, location, platforms),
        )
        .await
        {
            Ok(collection) => collection,
            Err(_) => {
                tracing::warn!(company = name, "review collection timed out");
                ReviewCollection::empty(platforms)
            }
        }
    }

    async fn summarize(&self, name: &str, reviews: &[ReviewRecord]) -> SentimentSummary {
        if reviews.is_empty() {
            return no_reviews_summary();
        }
        let summary = match tokio::time::timeout(
            self.settings.branch_timeout,
            self.reviews.summarize_sentiment(reviews),
        )
        .await
        {
            Ok(summary) => summary,
            Err(_) => {
                tracing::warn!(company = name, "review insight timed out");
                local_summary(reviews, ReviewInsight::fallback())
            }
        };
        match summary {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(company = name, error = %e, "sentiment summary failed");
                no_reviews_summary()
            }
        }
    }

    async fn recommend(&self, name: &str, input: &RecommendationInput) -> Vec<String> {
        match tokio::time::timeout(self.settings.branch_timeout, self.engine.recommend(input)).await
        {
            Ok(recommendations) => recommendations,
            Err(_) => {
                tracing::warn!(company = name, "recommendation generation timed out");
                STATIC_RECOMMENDATIONS
                    .iter()
                    .map(|s| (*s).to_string())
                    .collect()
            }
        }
    }
}

/// Neutral summary for a run that found no reviews.
fn no_reviews_summary() -> SentimentSummary {
    SentimentSummary {
        total_reviews: 0,
        average_rating: 0.0,
        sentiment_distribution: SentimentDistribution {
            positive: 0.0,
            negative: 0.0,
            neutral: 100.0,
        },
        sentiment_counts: SentimentCounts::default(),
        ai_insights: Value::String(NO_REVIEWS_INSIGHT.to_string()),
        recommendations: Vec::new(),
    }
}
