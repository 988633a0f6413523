//! Review collection, persistence, and sentiment statistics.

use std::sync::Arc;

use futures::future::join_all;
use uuid::Uuid;

use repscore_ai::{RecommendationEngine, ReviewInsight};
use repscore_core::{
    round_to, Platform, ReviewRecord, ReviewSourceConfig, SentimentCounts, SentimentDistribution,
    SentimentLabel, SentimentSummary, Store,
};

use crate::error::SentimentError;
use crate::scorer::classify;
use crate::sources::{build_sources, ReviewSource};

/// Reviews gathered for one analysis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewCollection {
    pub reviews: Vec<ReviewRecord>,
    pub total_reviews: u32,
    /// Platforms that were queried, configured or not.
    pub platforms: Vec<Platform>,
}

impl ReviewCollection {
    #[must_use]
    pub fn empty(platforms: &[Platform]) -> Self {
        Self {
            reviews: Vec::new(),
            total_reviews: 0,
            platforms: platforms.to_vec(),
        }
    }
}

/// Stamp a review with its local sentiment classification.
pub fn classify_review(review: &mut ReviewRecord) {
    let c = classify(&review.text);
    review.sentiment = c.label;
    review.sentiment_score = c.score;
}

#[derive(Clone)]
pub struct ReviewAggregator {
    sources: Vec<Arc<dyn ReviewSource>>,
    engine: Arc<RecommendationEngine>,
}

impl ReviewAggregator {
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn ReviewSource>>, engine: Arc<RecommendationEngine>) -> Self {
        Self { sources, engine }
    }

    #[must_use]
    pub fn from_config(
        config: &ReviewSourceConfig,
        http: &reqwest::Client,
        engine: Arc<RecommendationEngine>,
    ) -> Self {
        Self::new(build_sources(config, http), engine)
    }

    /// Platforms with a registered source.
    #[must_use]
    pub fn configured_platforms(&self) -> Vec<Platform> {
        self.sources.iter().map(|s| s.platform()).collect()
    }

    fn source_for(&self, platform: Platform) -> Option<&Arc<dyn ReviewSource>> {
        self.sources.iter().find(|s| s.platform() == platform)
    }

    /// Fetch and classify reviews from every requested platform concurrently.
    ///
    /// A platform that fails or has no configured source contributes no
    /// reviews; the failure is logged and collection continues.
    pub async fn collect(
        &self,
        company: &str,
        location: &str,
        platforms: &[Platform],
    ) -> ReviewCollection {
        let fetches = platforms.iter().map(|&platform| async move {
            let Some(source) = self.source_for(platform) else {
                tracing::debug!(company, platform = %platform, "no review source configured");
                return Vec::new();
            };
            match source.fetch(company, location).await {
                Ok(mut reviews) => {
                    reviews.iter_mut().for_each(classify_review);
                    tracing::debug!(
                        company,
                        platform = %platform,
                        count = reviews.len(),
                        "collected reviews"
                    );
                    reviews
                }
                Err(e) => {
                    tracing::warn!(
                        company,
                        platform = %platform,
                        error = %e,
                        "review source failed"
                    );
                    Vec::new()
                }
            }
        });

        let reviews: Vec<ReviewRecord> = join_all(fetches).await.into_iter().flatten().collect();

        ReviewCollection {
            total_reviews: u32::try_from(reviews.len()).unwrap_or(u32::MAX),
            reviews,
            platforms: platforms.to_vec(),
        }
    }

    /// Store reviews for a company, reusing rows that already exist.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Storage`] on the first storage failure; the
    /// caller is expected to fall back to the unpersisted list.
    pub async fn persist(
        &self,
        store: &dyn Store,
        company_id: Uuid,
        reviews: &[ReviewRecord],
    ) -> Result<Vec<ReviewRecord>, SentimentError> {
        let mut stored = Vec::with_capacity(reviews.len());
        for review in reviews {
            let record = match store.find_review(company_id, review).await? {
                Some(existing) => existing,
                None => store.insert_review(company_id, review).await?,
            };
            stored.push(record);
        }
        Ok(stored)
    }

    /// Aggregate sentiment statistics plus an AI narrative.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::NoReviews`] if `reviews` is empty.
    pub async fn summarize_sentiment(
        &self,
        reviews: &[ReviewRecord],
    ) -> Result<SentimentSummary, SentimentError> {
        if reviews.is_empty() {
            return Err(SentimentError::NoReviews);
        }

        let insight = self.engine.analyze_reviews(reviews).await;
        local_summary(reviews, insight)
    }
}

/// Counts, percentages, and mean rating for `reviews`, paired with an
/// already-produced narrative. Needs no I/O.
///
/// # Errors
///
/// Returns [`SentimentError::NoReviews`] if `reviews` is empty.
pub fn local_summary(
    reviews: &[ReviewRecord],
    insight: ReviewInsight,
) -> Result<SentimentSummary, SentimentError> {
    if reviews.is_empty() {
        return Err(SentimentError::NoReviews);
    }

    let counts = count_labels(reviews);
    let total = counts.total();

    let total_rating: f64 = reviews.iter().map(|r| r.rating).sum();
    let average_rating = round_to(total_rating / f64::from(total), 2);

    Ok(SentimentSummary {
        total_reviews: total,
        average_rating,
        sentiment_distribution: distribution(counts),
        sentiment_counts: counts,
        ai_insights: insight.insights,
        recommendations: insight.recommendations,
    })
}

fn count_labels(reviews: &[ReviewRecord]) -> SentimentCounts {
    let mut counts = SentimentCounts::default();
    for review in reviews {
        match classify(&review.text).label {
            SentimentLabel::Positive => counts.positive += 1,
            SentimentLabel::Negative => counts.negative += 1,
            SentimentLabel::Neutral => counts.neutral += 1,
        }
    }
    counts
}

fn distribution(counts: SentimentCounts) -> SentimentDistribution {
    let total = f64::from(counts.total());
    let pct = |n: u32| round_to(f64::from(n) / total * 100.0, 1);
    SentimentDistribution {
        positive: pct(counts.positive),
        negative: pct(counts.negative),
        neutral: pct(counts.neutral),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use repscore_db::MemoryStore;

    use crate::error::SourceError;

    struct Fixed {
        platform: Platform,
        reviews: Vec<ReviewRecord>,
    }

    #[async_trait]
    impl ReviewSource for Fixed {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn fetch(&self, _: &str, _: &str) -> Result<Vec<ReviewRecord>, SourceError> {
            Ok(self.reviews.clone())
        }
    }

    struct Broken;

    #[async_trait]
    impl ReviewSource for Broken {
        fn platform(&self) -> Platform {
            Platform::Yelp
        }

        async fn fetch(&self, _: &str, _: &str) -> Result<Vec<ReviewRecord>, SourceError> {
            Err(SourceError::Status {
                platform: Platform::Yelp,
                status: 500,
            })
        }
    }

    fn review(rating: f64, text: &str, date: &str) -> ReviewRecord {
        ReviewRecord::new(
            format!("g-{text}"),
            Platform::Google,
            "A",
            rating,
            text,
            Some(date.to_string()),
        )
    }

    fn aggregator(sources: Vec<Arc<dyn ReviewSource>>) -> ReviewAggregator {
        ReviewAggregator::new(sources, Arc::new(RecommendationEngine::default()))
    }

    #[tokio::test]
    async fn two_review_scenario() {
        let reviews = vec![
            review(5.0, "great service", "2024-01-10"),
            review(1.0, "terrible, never again", "2024-01-15"),
        ];
        let summary = aggregator(vec![]).summarize_sentiment(&reviews).await.unwrap();

        assert_eq!(
            summary.sentiment_counts,
            SentimentCounts {
                positive: 1,
                negative: 1,
                neutral: 0
            }
        );
        assert!((summary.sentiment_distribution.positive - 50.0).abs() < 1e-9);
        assert!((summary.sentiment_distribution.negative - 50.0).abs() < 1e-9);
        assert!(summary.sentiment_distribution.neutral.abs() < 1e-9);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["averageRating"], "3.00");
    }

    #[tokio::test]
    async fn percentages_sum_to_one_hundred() {
        let reviews = vec![
            review(5.0, "great", "2024-01-01"),
            review(3.0, "okay", "2024-01-02"),
            review(1.0, "awful", "2024-01-03"),
        ];
        let summary = aggregator(vec![]).summarize_sentiment(&reviews).await.unwrap();
        let d = summary.sentiment_distribution;
        assert!((d.positive + d.negative + d.neutral - 100.0).abs() <= 0.1 + 1e-9);
        assert!((summary.average_rating - 3.0).abs() < 1e-9);
    }

    #[test]
    fn distribution_and_mean_hold_across_label_mixes() {
        for positive in 0..=30_u32 {
            for negative in 0..=30_u32 {
                for neutral in 0..=30_u32 {
                    let total = positive + negative + neutral;
                    if total == 0 {
                        continue;
                    }
                    let texts = std::iter::repeat_n("great", positive as usize)
                        .chain(std::iter::repeat_n("awful", negative as usize))
                        .chain(std::iter::repeat_n("okay", neutral as usize));
                    let reviews: Vec<ReviewRecord> = texts
                        .enumerate()
                        .map(|(i, text)| {
                            let rating = f64::from(u32::try_from(i % 5).unwrap() + 1);
                            review(rating, text, "2024-01-01")
                        })
                        .collect();

                    let summary = local_summary(&reviews, ReviewInsight::fallback()).unwrap();
                    let mix = (positive, negative, neutral);

                    assert_eq!(summary.sentiment_counts.total(), total, "{mix:?}");
                    assert_eq!(summary.sentiment_counts.positive, positive, "{mix:?}");
                    let d = summary.sentiment_distribution;
                    let sum = d.positive + d.negative + d.neutral;
                    assert!((sum - 100.0).abs() <= 0.1 + 1e-9, "{mix:?} sums to {sum}");

                    let mean = reviews.iter().map(|r| r.rating).sum::<f64>() / f64::from(total);
                    assert!(
                        (summary.average_rating - mean).abs() <= 0.005 + 1e-9,
                        "{mix:?}: {} vs {mean}",
                        summary.average_rating
                    );
                    assert!((1.0..=5.0).contains(&summary.average_rating), "{mix:?}");
                }
            }
        }
    }

    #[tokio::test]
    async fn empty_input_is_an_error() {
        let err = aggregator(vec![]).summarize_sentiment(&[]).await.unwrap_err();
        assert!(matches!(err, SentimentError::NoReviews));
    }

    #[tokio::test]
    async fn collect_skips_failing_and_unconfigured_platforms() {
        let google = Arc::new(Fixed {
            platform: Platform::Google,
            reviews: vec![review(5.0, "great coffee", "2024-02-01")],
        });
        let agg = aggregator(vec![
            google as Arc<dyn ReviewSource>,
            Arc::new(Broken) as Arc<dyn ReviewSource>,
        ]);

        let collection = agg
            .collect(
                "Acme",
                "",
                &[Platform::Google, Platform::Yelp, Platform::Reddit],
            )
            .await;

        assert_eq!(collection.total_reviews, 1);
        assert_eq!(collection.platforms.len(), 3);
        assert_eq!(collection.reviews[0].sentiment, SentimentLabel::Positive);
        assert_eq!(collection.reviews[0].sentiment_score, 3);
    }

    #[tokio::test]
    async fn persist_reuses_existing_rows() {
        let store = MemoryStore::new();
        let company = Uuid::new_v4();
        let reviews = vec![review(4.0, "nice", "2024-03-01")];
        let agg = aggregator(vec![]);

        let first = agg.persist(&store, company, &reviews).await.unwrap();
        let second = agg.persist(&store, company, &reviews).await.unwrap();
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(store.review_count().await, 1);
    }

    #[tokio::test]
    async fn persist_aborts_on_storage_failure() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let agg = aggregator(vec![]);
        let err = agg
            .persist(&store, Uuid::new_v4(), &[review(4.0, "nice", "2024-03-01")])
            .await
            .unwrap_err();
        assert!(matches!(err, SentimentError::Storage(_)));
    }
}
