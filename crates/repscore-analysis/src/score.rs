//! Composite score math.

use repscore_core::{round_to, SentimentDistribution};

/// Review count at which the volume term saturates.
pub const REVIEW_SATURATION: f64 = 100.0;

const SEO_WEIGHT: f64 = 0.30;
const SENTIMENT_WEIGHT: f64 = 0.40;
const VOLUME_WEIGHT: f64 = 0.30;
const NEGATIVE_PENALTY: f64 = 1.5;

/// `clamp(0, 100, positive% - 1.5 * negative% + 50)`, 2-decimal rounding.
#[must_use]
pub fn sentiment_score(distribution: &SentimentDistribution) -> f64 {
    let raw = distribution.positive - distribution.negative * NEGATIVE_PENALTY + 50.0;
    round_to(raw.clamp(0.0, 100.0), 2)
}

/// Weighted reputation score in `[0, 100]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn reputation_score(seo_score: u8, sentiment_score: f64, total_reviews: u32) -> u8 {
    let volume = (f64::from(total_reviews) / REVIEW_SATURATION * 100.0).min(100.0);
    let weighted = f64::from(seo_score.min(100)) * SEO_WEIGHT
        + sentiment_score.clamp(0.0, 100.0) * SENTIMENT_WEIGHT
        + volume * VOLUME_WEIGHT;
    weighted.round().clamp(0.0, 100.0) as u8
}
