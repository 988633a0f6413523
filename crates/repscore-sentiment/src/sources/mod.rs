//! Review source abstractions.

mod google;
mod reddit;
mod yelp;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};

use repscore_core::{Platform, ReviewRecord, ReviewSourceConfig};

use crate::error::SourceError;

pub use google::GooglePlacesSource;
pub use reddit::RedditSource;
pub use yelp::YelpSource;

/// A third-party platform that can list reviews for a business.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetch unclassified reviews for `company`, optionally narrowed by `location`.
    async fn fetch(&self, company: &str, location: &str) -> Result<Vec<ReviewRecord>, SourceError>;
}

/// Build one source per platform whose credentials are configured.
#[must_use]
pub fn build_sources(
    config: &ReviewSourceConfig,
    http: &reqwest::Client,
) -> Vec<Arc<dyn ReviewSource>> {
    let mut sources: Vec<Arc<dyn ReviewSource>> = Vec::new();

    if let Some(key) = config.google_places_api_key.as_deref() {
        sources.push(Arc::new(GooglePlacesSource::new(http.clone(), key)));
    }
    if let Some(key) = config.yelp_api_key.as_deref() {
        sources.push(Arc::new(YelpSource::new(http.clone(), key)));
    }
    if let (Some(id), Some(secret)) = (
        config.reddit_client_id.as_deref(),
        config.reddit_client_secret.as_deref(),
    ) {
        sources.push(Arc::new(RedditSource::new(
            http.clone(),
            id,
            secret,
            &config.reddit_user_agent,
        )));
    }

    sources
}

/// Render a unix timestamp the way review dates are stored (`2024-01-10T12:00:00.000Z`).
pub(crate) fn unix_to_iso(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
