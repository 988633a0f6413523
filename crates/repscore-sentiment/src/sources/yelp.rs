//! Yelp Fusion reviews (business search, then business reviews).

use async_trait::async_trait;
use serde::Deserialize;

use repscore_core::{Platform, ReviewRecord};

use super::ReviewSource;
use crate::error::SourceError;

const YELP_API_URL: &str = "https://api.yelp.com/v3";
const DEFAULT_LOCATION: &str = "United States";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<Business>,
}

#[derive(Debug, Deserialize)]
struct Business {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ReviewsResponse {
    #[serde(default)]
    reviews: Vec<YelpReview>,
}

#[derive(Debug, Deserialize)]
struct YelpReview {
    user: Option<YelpUser>,
    rating: f64,
    #[serde(default)]
    text: String,
    time_created: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YelpUser {
    name: Option<String>,
}

pub struct YelpSource {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YelpSource {
    #[must_use]
    pub fn new(http: reqwest::Client, api_key: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            base_url: YELP_API_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                platform: Platform::Yelp,
                status: response.status().as_u16(),
            });
        }

        response.json().await.map_err(|e| SourceError::Parse {
            platform: Platform::Yelp,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ReviewSource for YelpSource {
    fn platform(&self) -> Platform {
        Platform::Yelp
    }

    async fn fetch(&self, company: &str, location: &str) -> Result<Vec<ReviewRecord>, SourceError> {
        let location = if location.trim().is_empty() {
            DEFAULT_LOCATION
        } else {
            location.trim()
        };

        let search: SearchResponse = self
            .get_json(
                "/businesses/search",
                &[("term", company), ("location", location), ("limit", "1")],
            )
            .await?;

        let Some(business) = search.businesses.into_iter().next() else {
            tracing::debug!(company, location, "no Yelp business matched");
            return Ok(Vec::new());
        };

        let listing: ReviewsResponse = self
            .get_json(&format!("/businesses/{}/reviews", business.id), &[])
            .await?;

        let reviews = listing
            .reviews
            .into_iter()
            .enumerate()
            .map(|(index, review)| {
                let mut record = ReviewRecord::new(
                    format!("yelp-{}-{index}", business.id),
                    Platform::Yelp,
                    review
                        .user
                        .and_then(|u| u.name)
                        .unwrap_or_else(|| "Anonymous".to_string()),
                    review.rating,
                    review.text,
                    review.time_created,
                );
                record.url = review.url;
                record
            })
            .collect();

        Ok(reviews)
    }
}
