//! End-to-end runs of the analysis pipeline over in-process collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use repscore_ai::{
    GenerativeProvider, ProviderError, RecommendationEngine, DEFAULT_REVIEW_INSIGHT,
    DEFAULT_REVIEW_RECOMMENDATIONS, STATIC_RECOMMENDATIONS,
};
use repscore_analysis::{AnalysisError, AnalysisSettings, Analyzer};
use repscore_core::{Platform, ReviewRecord, SentimentCounts, Store};
use repscore_db::{MemoryStore, StoreOp};
use repscore_sentiment::{ReviewAggregator, ReviewSource, SourceError};
use repscore_seo::{default_report, FetchError, FetchedPage, PageFetcher, SeoScorer};

const HOMEPAGE: &str = r#"<html><head><title>Blue Door Cafe</title>
<meta name="viewport" content="width=device-width"></head>
<body><h1>Blue Door Cafe</h1><p>Coffee and pastries since 2009.</p></body></html>"#;

struct FakeSite {
    calls: AtomicUsize,
    delay: Duration,
}

impl FakeSite {
    fn new() -> Arc<Self> {
        Self::slow(Duration::ZERO)
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(FetchedPage {
            html: HOMEPAGE.to_string(),
            status: 200,
        })
    }
}

struct FakeReviews {
    calls: AtomicUsize,
    reviews: Vec<ReviewRecord>,
}

impl FakeReviews {
    fn new(reviews: Vec<ReviewRecord>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reviews,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReviewSource for FakeReviews {
    fn platform(&self) -> Platform {
        Platform::Google
    }

    async fn fetch(&self, _company: &str, _location: &str) -> Result<Vec<ReviewRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reviews.clone())
    }
}

/// A provider that accepts the prompt and never answers.
struct SilentProvider;

#[async_trait]
impl GenerativeProvider for SilentProvider {
    fn name(&self) -> &'static str {
        "silent"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        std::future::pending().await
    }
}

fn two_reviews() -> Vec<ReviewRecord> {
    vec![
        ReviewRecord::new(
            "google-1",
            Platform::Google,
            "Ana",
            5.0,
            "great service",
            Some("2024-01-10".to_string()),
        ),
        ReviewRecord::new(
            "google-2",
            Platform::Google,
            "Ben",
            1.0,
            "terrible, never again",
            Some("2024-01-15".to_string()),
        ),
    ]
}

fn analyzer(
    store: &Arc<MemoryStore>,
    site: &Arc<FakeSite>,
    reviews: &Arc<FakeReviews>,
    settings: AnalysisSettings,
) -> Analyzer {
    analyzer_with_engine(store, site, reviews, RecommendationEngine::default(), settings)
}

fn analyzer_with_engine(
    store: &Arc<MemoryStore>,
    site: &Arc<FakeSite>,
    reviews: &Arc<FakeReviews>,
    engine: RecommendationEngine,
    settings: AnalysisSettings,
) -> Analyzer {
    let engine = Arc::new(engine);
    let aggregator = ReviewAggregator::new(
        vec![Arc::clone(reviews) as Arc<dyn ReviewSource>],
        Arc::clone(&engine),
    );
    Analyzer::new(
        Arc::clone(store) as Arc<dyn Store>,
        SeoScorer::new(Arc::clone(site) as Arc<dyn PageFetcher>),
        aggregator,
        engine,
        settings,
    )
}

#[tokio::test]
async fn second_run_within_window_is_a_byte_identical_cache_hit() {
    let store = Arc::new(MemoryStore::new());
    let site = FakeSite::new();
    let reviews = FakeReviews::new(two_reviews());
    let analyzer = analyzer(&store, &site, &reviews, AnalysisSettings::default());

    let first = analyzer
        .run_analysis("Blue Door Cafe", "Austin, TX", "https://bluedoor.test")
        .await
        .unwrap();
    let second = analyzer
        .run_analysis("blue door cafe", "Elsewhere", "")
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(site.calls(), 1);
    assert_eq!(reviews.calls(), 1);
    assert_eq!(store.saved_analysis_count(), 1);
}

#[tokio::test]
async fn stale_analysis_is_recomputed() {
    let store = Arc::new(MemoryStore::new());
    let site = FakeSite::new();
    let reviews = FakeReviews::new(two_reviews());
    let settings = AnalysisSettings {
        freshness: Duration::ZERO,
        ..AnalysisSettings::default()
    };
    let analyzer = analyzer(&store, &site, &reviews, settings);

    analyzer.run_analysis("Blue Door Cafe", "", "").await.unwrap();
    analyzer.run_analysis("Blue Door Cafe", "", "").await.unwrap();

    assert_eq!(reviews.calls(), 2);
    assert_eq!(store.saved_analysis_count(), 2);
    // identical reviews are stored once
    assert_eq!(store.review_count().await, 2);
}

#[tokio::test]
async fn storage_outage_still_returns_a_complete_analysis() {
    let store = Arc::new(MemoryStore::new());
    store.set_offline(true);
    let site = FakeSite::new();
    let reviews = FakeReviews::new(two_reviews());
    let analyzer = analyzer(&store, &site, &reviews, AnalysisSettings::default());

    let before = Utc::now();
    let analysis = analyzer
        .run_analysis("Blue Door Cafe", "", "https://bluedoor.test")
        .await
        .expect("storage failures must not fail the run");
    let after = Utc::now();

    assert!(analysis.timestamp >= before && analysis.timestamp <= after);
    assert_eq!(analysis.metrics.total_reviews, 2);
    assert_eq!(analysis.charts.rating_distribution.len(), 5);
    assert_eq!(store.saved_analysis_count(), 0);

    // no cache without a store
    analyzer
        .run_analysis("Blue Door Cafe", "", "https://bluedoor.test")
        .await
        .unwrap();
    assert_eq!(site.calls(), 2);
}

#[tokio::test]
async fn blank_company_name_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let site = FakeSite::new();
    let reviews = FakeReviews::new(two_reviews());
    let analyzer = analyzer(&store, &site, &reviews, AnalysisSettings::default());

    let err = analyzer.run_analysis("   ", "", "").await.unwrap_err();
    assert!(matches!(err, AnalysisError::Validation(_)));
    assert_eq!(site.calls() + reviews.calls(), 0);
}

#[tokio::test]
async fn two_review_run_scores_and_projects_charts() {
    let store = Arc::new(MemoryStore::new());
    let site = FakeSite::new();
    let reviews = FakeReviews::new(two_reviews());
    let analyzer = analyzer(&store, &site, &reviews, AnalysisSettings::default());

    let analysis = analyzer.run_analysis("Blue Door Cafe", "", "").await.unwrap();

    assert_eq!(
        analysis.reviews.summary.sentiment_counts,
        SentimentCounts {
            positive: 1,
            negative: 1,
            neutral: 0
        }
    );
    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["reviews"]["summary"]["averageRating"], "3.00");

    // seo default 50, sentiment 50 - 75 + 50 = 25, volume 2
    assert!((analysis.metrics.sentiment_score - 25.0).abs() < 1e-9);
    assert_eq!(analysis.metrics.seo_score, 50);
    assert_eq!(analysis.overall_score, 26);

    let ratings: Vec<f64> = analysis
        .charts
        .rating_distribution
        .iter()
        .map(|s| s.value)
        .collect();
    assert_eq!(ratings, [1.0, 0.0, 0.0, 0.0, 1.0]);

    let months: Vec<&str> = analysis
        .charts
        .timeline
        .iter()
        .map(|p| p.month.as_str())
        .collect();
    assert_eq!(months, ["2024-01"]);

    assert_eq!(
        analysis.recommendations,
        STATIC_RECOMMENDATIONS.map(str::to_string)
    );
}

#[tokio::test]
async fn run_without_reviews_is_neutral() {
    let store = Arc::new(MemoryStore::new());
    let site = FakeSite::new();
    let reviews = FakeReviews::new(Vec::new());
    let analyzer = analyzer(&store, &site, &reviews, AnalysisSettings::default());

    let analysis = analyzer.run_analysis("Quiet Co", "", "").await.unwrap();

    assert_eq!(analysis.reviews.summary.total_reviews, 0);
    assert!((analysis.reviews.summary.sentiment_distribution.neutral - 100.0).abs() < 1e-9);
    assert!((analysis.metrics.sentiment_score - 50.0).abs() < 1e-9);
    assert_eq!(analysis.overall_score, 35);
    assert!(analysis.charts.timeline.is_empty());
}

#[tokio::test]
async fn slow_branch_resolves_to_its_fallback() {
    let store = Arc::new(MemoryStore::new());
    let site = FakeSite::slow(Duration::from_secs(30));
    let reviews = FakeReviews::new(two_reviews());
    let settings = AnalysisSettings {
        branch_timeout: Duration::from_millis(100),
        ..AnalysisSettings::default()
    };
    let analyzer = analyzer(&store, &site, &reviews, settings);

    let analysis = analyzer
        .run_analysis("Blue Door Cafe", "", "https://bluedoor.test")
        .await
        .unwrap();

    assert_eq!(analysis.seo, default_report());
    assert_eq!(analysis.metrics.total_reviews, 2);
}

#[tokio::test]
async fn profile_is_refreshed_after_a_run() {
    let store = Arc::new(MemoryStore::new());
    let site = FakeSite::new();
    let reviews = FakeReviews::new(two_reviews());
    let analyzer = analyzer(&store, &site, &reviews, AnalysisSettings::default());

    analyzer
        .run_analysis("Blue Door Cafe", "Austin, TX", "https://bluedoor.test")
        .await
        .unwrap();

    let profile = store
        .find_company("BLUE DOOR CAFE")
        .await
        .unwrap()
        .expect("profile should exist");
    assert_eq!(profile.metrics.total_reviews, 2);
    assert!((profile.metrics.average_rating - 3.0).abs() < 1e-9);
    assert_eq!(profile.online_presence.review_platforms, ["Google"]);
    assert_eq!(profile.location, "Austin, TX");
    assert!(profile.last_analyzed_at.is_some());
}

#[tokio::test]
async fn unresponsive_provider_falls_back_to_local_summary() {
    let store = Arc::new(MemoryStore::new());
    let site = FakeSite::new();
    let reviews = FakeReviews::new(vec![two_reviews().remove(0)]);
    let engine =
        RecommendationEngine::new(vec![Arc::new(SilentProvider) as Arc<dyn GenerativeProvider>]);
    let settings = AnalysisSettings {
        branch_timeout: Duration::from_millis(100),
        ..AnalysisSettings::default()
    };
    let analyzer = analyzer_with_engine(&store, &site, &reviews, engine, settings);

    let analysis = tokio::time::timeout(
        Duration::from_secs(3),
        analyzer.run_analysis("Blue Door Cafe", "", "https://bluedoor.test"),
    )
    .await
    .expect("run must finish once the branch timeout expires")
    .unwrap();

    let summary = &analysis.reviews.summary;
    assert_eq!(summary.total_reviews, 1);
    assert_eq!(summary.sentiment_counts.positive, 1);
    assert_eq!(summary.ai_insights, DEFAULT_REVIEW_INSIGHT);
    assert_eq!(
        summary.recommendations,
        DEFAULT_REVIEW_RECOMMENDATIONS.map(str::to_string)
    );
    assert_eq!(
        analysis.recommendations,
        STATIC_RECOMMENDATIONS.map(str::to_string)
    );
    assert_eq!(store.saved_analysis_count(), 1);
}

#[tokio::test]
async fn response_carries_company_and_review_sections() {
    let store = Arc::new(MemoryStore::new());
    let site = FakeSite::new();
    let reviews = FakeReviews::new(two_reviews());
    let analyzer = analyzer(&store, &site, &reviews, AnalysisSettings::default());

    let analysis = analyzer
        .run_analysis("Blue Door Cafe", "Austin, TX", "https://bluedoor.test")
        .await
        .unwrap();
    let json = serde_json::to_value(&analysis).unwrap();

    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        [
            "charts",
            "companyInfo",
            "companyName",
            "location",
            "metrics",
            "overallScore",
            "recommendations",
            "reviews",
            "seo",
            "timestamp",
            "website"
        ]
    );

    let info = &json["companyInfo"];
    assert_eq!(info["companyName"], "Blue Door Cafe");
    assert_eq!(info["basicInfo"]["location"], "Austin, TX");
    assert_eq!(info["basicInfo"]["industry"], "General Business");
    assert_eq!(info["onlinePresence"]["hasWebsite"], true);
    assert_eq!(info["onlinePresence"]["reviewPlatforms"][0], "Google");
    assert_eq!(info["metrics"]["totalReviews"], 2);

    let details = &json["reviews"]["details"];
    assert_eq!(details["totalReviews"], 2);
    assert_eq!(details["reviews"].as_array().map(Vec::len), Some(2));
    assert_eq!(details["platforms"], serde_json::json!(["google", "yelp", "reddit"]));
    assert_eq!(json["reviews"]["summary"]["totalReviews"], 2);
}

#[tokio::test]
async fn review_persist_failure_continues_with_collected_reviews() {
    let store = Arc::new(MemoryStore::new());
    store.set_failing(StoreOp::InsertReview, true);
    let site = FakeSite::new();
    let reviews = FakeReviews::new(two_reviews());
    let analyzer = analyzer(&store, &site, &reviews, AnalysisSettings::default());

    let analysis = analyzer
        .run_analysis("Blue Door Cafe", "", "https://bluedoor.test")
        .await
        .expect("a failed review write must not fail the run");

    assert_eq!(analysis.metrics.total_reviews, 2);
    let ratings: Vec<f64> = analysis
        .charts
        .rating_distribution
        .iter()
        .map(|s| s.value)
        .collect();
    assert_eq!(ratings, [1.0, 0.0, 0.0, 0.0, 1.0]);
    // unpersisted reviews keep their source ids
    let ids: Vec<&str> = analysis
        .reviews
        .details
        .reviews
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, ["google-1", "google-2"]);
    assert_eq!(store.review_count().await, 0);
    assert_eq!(store.saved_analysis_count(), 1);
}

#[tokio::test]
async fn cache_lookup_failure_is_treated_as_a_miss() {
    let store = Arc::new(MemoryStore::new());
    store.set_failing(StoreOp::FindRecentAnalysis, true);
    let site = FakeSite::new();
    let reviews = FakeReviews::new(two_reviews());
    let analyzer = analyzer(&store, &site, &reviews, AnalysisSettings::default());

    analyzer.run_analysis("Blue Door Cafe", "", "").await.unwrap();
    let second = analyzer
        .run_analysis("Blue Door Cafe", "", "")
        .await
        .expect("a failed cache lookup must not fail the run");

    assert_eq!(reviews.calls(), 2);
    assert_eq!(store.saved_analysis_count(), 2);
    assert_eq!(second.metrics.total_reviews, 2);
}
