use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Google,
    Yelp,
    Reddit,
    Tripadvisor,
    Facebook,
    Trustpilot,
    Other,
}

impl Platform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Google => "google",
            Platform::Yelp => "yelp",
            Platform::Reddit => "reddit",
            Platform::Tripadvisor => "tripadvisor",
            Platform::Facebook => "facebook",
            Platform::Trustpilot => "trustpilot",
            Platform::Other => "other",
        }
    }

    /// Capitalised name used in the company's online-presence platform list.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Google => "Google",
            Platform::Yelp => "Yelp",
            Platform::Reddit => "Reddit",
            Platform::Tripadvisor => "Tripadvisor",
            Platform::Facebook => "Facebook",
            Platform::Trustpilot => "Trustpilot",
            Platform::Other => "Other",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(Platform::Google),
            "yelp" => Ok(Platform::Yelp),
            "reddit" => Ok(Platform::Reddit),
            "tripadvisor" => Ok(Platform::Tripadvisor),
            "facebook" => Ok(Platform::Facebook),
            "trustpilot" => Ok(Platform::Trustpilot),
            "other" => Ok(Platform::Other),
            _ => Err(CoreError::UnknownPlatform(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl SentimentLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            other => Err(format!("unknown sentiment label: {other}")),
        }
    }
}

/// A single review as supplied by a review source or read back from storage.
///
/// `date` is kept exactly as the source supplied it; it participates in the
/// de-duplication identity `{company, platform, text, date}` and is parsed
/// only when projecting the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: String,
    pub platform: Platform,
    pub author: String,
    /// Star rating in `[1.0, 5.0]`.
    pub rating: f64,
    pub text: String,
    pub date: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub sentiment: SentimentLabel,
    pub sentiment_score: i32,
    pub verified: bool,
    pub url: Option<String>,
}

impl ReviewRecord {
    /// Build an unclassified review; sentiment is filled in by the aggregator.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        platform: Platform,
        author: impl Into<String>,
        rating: f64,
        text: impl Into<String>,
        date: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            platform,
            author: author.into(),
            rating: rating.clamp(1.0, 5.0),
            text: text.into(),
            date,
            created_at: None,
            sentiment: SentimentLabel::Neutral,
            sentiment_score: 0,
            verified: false,
            url: None,
        }
    }
}
