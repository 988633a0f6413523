//! Reddit mentions as reviews (client-credentials OAuth).
//!
//! Posts and their top comments are treated as reviews. Reddit has no star
//! rating, so one is derived from the upvote ratio.

use async_trait::async_trait;
use serde::Deserialize;

use repscore_core::{Platform, ReviewRecord};

use super::{unix_to_iso, ReviewSource};
use crate::error::SourceError;

const REDDIT_AUTH_URL: &str = "https://www.reddit.com";
const REDDIT_API_URL: &str = "https://oauth.reddit.com";
const SEARCH_LIMIT: &str = "25";
const TOP_COMMENTS: usize = 5;
const MAX_TEXT_CHARS: usize = 1000;
const DEFAULT_UPVOTE_RATIO: f64 = 0.5;

/// Reddit OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Reddit listing wrapper.
#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    #[serde(default = "Vec::new")]
    children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
struct Thing<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct PostData {
    #[serde(default)]
    id: String,
    title: Option<String>,
    selftext: Option<String>,
    author: Option<String>,
    permalink: Option<String>,
    upvote_ratio: Option<f64>,
    created_utc: Option<f64>,
    #[serde(default)]
    num_comments: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CommentData {
    id: String,
    body: Option<String>,
    author: Option<String>,
    upvote_ratio: Option<f64>,
    created_utc: Option<f64>,
}

pub struct RedditSource {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    user_agent: String,
    auth_url: String,
    api_url: String,
}

impl RedditSource {
    #[must_use]
    pub fn new(http: reqwest::Client, client_id: &str, client_secret: &str, user_agent: &str) -> Self {
        Self {
            http,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            user_agent: user_agent.to_string(),
            auth_url: REDDIT_AUTH_URL.to_string(),
            api_url: REDDIT_API_URL.to_string(),
        }
    }

    /// Point both the token endpoint and the API at `url`.
    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        let url = url.trim_end_matches('/').to_string();
        self.auth_url.clone_from(&url);
        self.api_url = url;
        self
    }

    async fn fetch_token(&self) -> Result<String, SourceError> {
        let response = self
            .http
            .post(format!("{}/api/v1/access_token", self.auth_url))
            .header("User-Agent", &self.user_agent)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Auth {
                platform: Platform::Reddit,
                reason: format!("token exchange failed with status {}", response.status()),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| SourceError::Auth {
            platform: Platform::Reddit,
            reason: format!("token parse error: {e}"),
        })?;

        Ok(token.access_token)
    }

    async fn search_posts(&self, token: &str, company: &str) -> Result<Vec<PostData>, SourceError> {
        let response = self
            .http
            .get(format!("{}/search", self.api_url))
            .bearer_auth(token)
            .header("User-Agent", &self.user_agent)
            .query(&[
                ("q", company),
                ("type", "link"),
                ("sort", "relevance"),
                ("limit", SEARCH_LIMIT),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                platform: Platform::Reddit,
                status: response.status().as_u16(),
            });
        }

        let listing: Listing<PostData> = response.json().await.map_err(|e| SourceError::Parse {
            platform: Platform::Reddit,
            reason: e.to_string(),
        })?;

        Ok(listing.data.children.into_iter().map(|t| t.data).collect())
    }

    async fn top_comments(&self, token: &str, permalink: &str) -> Result<Vec<CommentData>, SourceError> {
        let response = self
            .http
            .get(format!("{}{permalink}.json", self.api_url))
            .bearer_auth(token)
            .header("User-Agent", &self.user_agent)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                platform: Platform::Reddit,
                status: response.status().as_u16(),
            });
        }

        // [post listing, comment listing]
        let listings: Vec<Listing<CommentData>> =
            response.json().await.map_err(|e| SourceError::Parse {
                platform: Platform::Reddit,
                reason: e.to_string(),
            })?;

        Ok(listings
            .into_iter()
            .nth(1)
            .map(|l| l.data.children.into_iter().take(TOP_COMMENTS).map(|t| t.data).collect())
            .unwrap_or_default())
    }
}

/// Map an upvote ratio in `[0, 1]` onto a 1-5 star rating.
fn rating_from_upvote_ratio(ratio: Option<f64>) -> f64 {
    (ratio.unwrap_or(DEFAULT_UPVOTE_RATIO) * 4.0 + 1.0).round()
}

fn truncate_text(text: &str) -> String {
    text.chars().take(MAX_TEXT_CHARS).collect()
}

#[allow(clippy::cast_possible_truncation)]
fn reddit_date(created_utc: Option<f64>) -> Option<String> {
    created_utc.and_then(|secs| unix_to_iso(secs.trunc() as i64))
}

fn post_to_review(post: &PostData) -> Option<ReviewRecord> {
    let text = post
        .selftext
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| post.title.as_deref().filter(|t| !t.trim().is_empty()))?;

    let mut record = ReviewRecord::new(
        format!("reddit-{}", post.id),
        Platform::Reddit,
        post.author.clone().unwrap_or_else(|| "Anonymous".to_string()),
        rating_from_upvote_ratio(post.upvote_ratio),
        truncate_text(text),
        reddit_date(post.created_utc),
    );
    record.url = post
        .permalink
        .as_ref()
        .map(|p| format!("https://reddit.com{p}"));
    Some(record)
}

fn comment_to_review(comment: CommentData, url: Option<&String>) -> Option<ReviewRecord> {
    let body = comment.body.filter(|b| !b.trim().is_empty() && !b.starts_with("[deleted]"))?;

    let mut record = ReviewRecord::new(
        format!("reddit-comment-{}", comment.id),
        Platform::Reddit,
        comment.author.unwrap_or_else(|| "Anonymous".to_string()),
        rating_from_upvote_ratio(comment.upvote_ratio),
        truncate_text(&body),
        reddit_date(comment.created_utc),
    );
    record.url = url.cloned();
    Some(record)
}

#[async_trait]
impl ReviewSource for RedditSource {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    async fn fetch(&self, company: &str, _location: &str) -> Result<Vec<ReviewRecord>, SourceError> {
        let token = self.fetch_token().await?;
        let posts = self.search_posts(&token, company).await?;

        let mut reviews = Vec::new();
        for post in &posts {
            let review = post_to_review(post);
            let url = review.as_ref().and_then(|r| r.url.clone());
            reviews.extend(review);

            let Some(permalink) = post.permalink.as_deref() else {
                continue;
            };
            if post.num_comments == 0 {
                continue;
            }
            match self.top_comments(&token, permalink).await {
                Ok(comments) => reviews.extend(
                    comments
                        .into_iter()
                        .filter_map(|c| comment_to_review(c, url.as_ref())),
                ),
                Err(e) => {
                    tracing::warn!(
                        company,
                        permalink,
                        error = %e,
                        "Reddit comment fetch failed"
                    );
                }
            }
        }

        Ok(reviews)
    }
}
