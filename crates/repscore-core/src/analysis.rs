//! The reputation analysis aggregate and its chart-ready projections.
//!
//! [`ReputationAnalysis`] serializes to the public response contract. It is
//! stored verbatim and replayed on cache hits, so every field must round-trip
//! through JSON without change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::company::CompanyInfo;
use crate::review::{Platform, ReviewRecord};
use crate::seo::SeoReport;

/// Round `value` to `places` decimal places, half away from zero.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

impl SentimentCounts {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.positive + self.negative + self.neutral
    }
}

/// Percentages with 1-decimal rounding; they sum to 100 within 0.1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentSummary {
    pub total_reviews: u32,
    /// Mean star rating, rendered as a fixed two-decimal string (`"3.00"`).
    #[serde(with = "fixed2")]
    pub average_rating: f64,
    pub sentiment_distribution: SentimentDistribution,
    pub sentiment_counts: SentimentCounts,
    pub ai_insights: Value,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_reviews: u32,
    pub average_rating: f64,
    pub seo_score: u8,
    pub sentiment_score: f64,
    pub response_rate: f64,
}

/// One labelled bar or slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: f64,
    pub fill: String,
}

impl ChartSlice {
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64, fill: &str) -> Self {
        Self {
            name: name.into(),
            value,
            fill: fill.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    pub sentiment_distribution: Vec<ChartSlice>,
    pub rating_distribution: Vec<ChartSlice>,
    pub seo_breakdown: Vec<ChartSlice>,
    pub timeline: Vec<TimelinePoint>,
}

/// Reviews the run worked from, as collected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetails {
    pub total_reviews: u32,
    pub reviews: Vec<ReviewRecord>,
    /// Platforms that were queried, whether or not they returned anything.
    pub platforms: Vec<Platform>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewsSection {
    pub summary: SentimentSummary,
    pub details: ReviewDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationAnalysis {
    pub company_name: String,
    pub location: String,
    pub website: String,
    pub timestamp: DateTime<Utc>,
    /// Composite reputation score in `[0, 100]`.
    pub overall_score: u8,
    pub company_info: CompanyInfo,
    pub reviews: ReviewsSection,
    pub seo: SeoReport,
    pub metrics: MetricsSnapshot,
    pub recommendations: Vec<String>,
    pub charts: Charts,
}

mod fixed2 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub(super) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:.2}"))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s.trim().parse::<f64>().map_err(de::Error::custom),
        }
    }
}
