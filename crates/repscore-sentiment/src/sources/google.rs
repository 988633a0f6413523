//! Google Places reviews (text search, then place details).

use async_trait::async_trait;
use serde::Deserialize;

use repscore_core::{Platform, ReviewRecord};

use super::{unix_to_iso, ReviewSource};
use crate::error::SourceError;

const GOOGLE_PLACES_API_URL: &str = "https://maps.googleapis.com/maps/api/place";
const DETAILS_FIELDS: &str = "name,rating,user_ratings_total,reviews";

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    reviews: Vec<PlaceReview>,
}

#[derive(Debug, Deserialize)]
struct PlaceReview {
    author_name: Option<String>,
    rating: Option<f64>,
    text: Option<String>,
    time: Option<i64>,
}

pub struct GooglePlacesSource {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GooglePlacesSource {
    #[must_use]
    pub fn new(http: reqwest::Client, api_key: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            base_url: GOOGLE_PLACES_API_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let response = self
            .http
            .get(format!("{}/{endpoint}", self.base_url))
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                platform: Platform::Google,
                status: response.status().as_u16(),
            });
        }

        response.json().await.map_err(|e| SourceError::Parse {
            platform: Platform::Google,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ReviewSource for GooglePlacesSource {
    fn platform(&self) -> Platform {
        Platform::Google
    }

    async fn fetch(&self, company: &str, location: &str) -> Result<Vec<ReviewRecord>, SourceError> {
        let query = format!("{company} {location}");
        let search: TextSearchResponse = self
            .get_json("textsearch/json", &[("query", query.trim())])
            .await?;

        let Some(place) = search.results.into_iter().next() else {
            tracing::debug!(company, "no Google place matched");
            return Ok(Vec::new());
        };

        let details: DetailsResponse = self
            .get_json(
                "details/json",
                &[("place_id", place.place_id.as_str()), ("fields", DETAILS_FIELDS)],
            )
            .await?;

        let reviews = details
            .result
            .map(|d| d.reviews)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter_map(|(index, review)| {
                let rating = review.rating?;
                Some(ReviewRecord::new(
                    format!("google-{}-{index}", place.place_id),
                    Platform::Google,
                    review.author_name.unwrap_or_else(|| "Anonymous".to_string()),
                    rating,
                    review.text.unwrap_or_default(),
                    review.time.and_then(unix_to_iso),
                ))
            })
            .collect();

        Ok(reviews)
    }
}
