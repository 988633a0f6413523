use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

const DEFAULT_LOCATION: &str = "Not specified";
const DEFAULT_INDUSTRY: &str = "General Business";
const DEFAULT_ESTABLISHED: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlinePresence {
    pub has_website: bool,
    pub social_media_count: u32,
    pub review_platforms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyMetrics {
    pub total_reviews: u32,
    pub average_rating: f64,
    pub response_rate: f64,
}

/// A business under analysis. Lifecycle is owned by the store; the analysis
/// pipeline reads it once, mutates a local copy, and writes it back once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub website: String,
    pub industry: String,
    pub established: String,
    pub online_presence: OnlinePresence,
    pub metrics: CompanyMetrics,
    pub last_analyzed_at: Option<DateTime<Utc>>,
    /// `false` for a provisional profile built while storage was unavailable.
    #[serde(skip)]
    pub persisted: bool,
}

impl CompanyProfile {
    /// Build a fresh profile for a first-time analysis.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyCompanyName`] if `name` is blank.
    pub fn new(name: &str, location: &str, website: &str) -> Result<Self, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::EmptyCompanyName);
        }
        let location = location.trim();
        let website = website.trim();

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            location: if location.is_empty() {
                DEFAULT_LOCATION.to_string()
            } else {
                location.to_string()
            },
            website: website.to_string(),
            industry: DEFAULT_INDUSTRY.to_string(),
            established: DEFAULT_ESTABLISHED.to_string(),
            online_presence: OnlinePresence {
                has_website: !website.is_empty(),
                ..OnlinePresence::default()
            },
            metrics: CompanyMetrics::default(),
            last_analyzed_at: None,
            persisted: false,
        })
    }

    /// Fill in website/location when the stored profile lacks them.
    ///
    /// Returns `true` if anything changed.
    pub fn absorb_inputs(&mut self, location: &str, website: &str) -> bool {
        let mut changed = false;
        let website = website.trim();
        if !website.is_empty() && self.website.is_empty() {
            self.website = website.to_string();
            self.online_presence.has_website = true;
            changed = true;
        }
        let location = location.trim();
        if !location.is_empty() && (self.location.is_empty() || self.location == DEFAULT_LOCATION)
        {
            self.location = location.to_string();
            changed = true;
        }
        changed
    }
}

/// Identifying details echoed back in an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub name: String,
    pub location: String,
    pub industry: String,
    pub established: String,
}

/// The company section of an analysis response, taken from the profile as it
/// stood after the run refreshed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub company_name: String,
    pub location: String,
    pub basic_info: BasicInfo,
    pub online_presence: OnlinePresence,
    pub metrics: CompanyMetrics,
}

impl From<&CompanyProfile> for CompanyInfo {
    fn from(profile: &CompanyProfile) -> Self {
        Self {
            company_name: profile.name.clone(),
            location: profile.location.clone(),
            basic_info: BasicInfo {
                name: profile.name.clone(),
                location: profile.location.clone(),
                industry: profile.industry.clone(),
                established: profile.established.clone(),
            },
            online_presence: profile.online_presence.clone(),
            metrics: profile.metrics.clone(),
        }
    }
}
