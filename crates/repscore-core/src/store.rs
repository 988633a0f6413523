//! Persistence seam consumed by the analysis pipeline.
//!
//! Every call site treats [`StorageError`] as recoverable: storage is an
//! optimisation for caching and history, never a correctness dependency.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::analysis::ReputationAnalysis;
use crate::company::CompanyProfile;
use crate::review::ReviewRecord;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage query failed: {0}")]
    Query(String),

    #[error("stored record is malformed: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Case-insensitive exact match on the trimmed company name.
    ///
    /// When several profiles match, the most recently analysed one wins.
    async fn find_company(&self, name: &str) -> Result<Option<CompanyProfile>, StorageError>;

    /// Insert a new profile and return it as stored.
    async fn create_company(&self, profile: &CompanyProfile)
        -> Result<CompanyProfile, StorageError>;

    async fn save_company(&self, profile: &CompanyProfile) -> Result<(), StorageError>;

    /// The most recent analysis stored for a company, if any.
    async fn find_recent_analysis(
        &self,
        company_id: Uuid,
    ) -> Result<Option<ReputationAnalysis>, StorageError>;

    /// Persist an analysis as the company's current one and return the
    /// timestamp the store recorded for it.
    async fn save_analysis(
        &self,
        company_id: Uuid,
        analysis: &ReputationAnalysis,
    ) -> Result<DateTime<Utc>, StorageError>;

    /// Look up a review by `{company, platform, text, date}`.
    async fn find_review(
        &self,
        company_id: Uuid,
        review: &ReviewRecord,
    ) -> Result<Option<ReviewRecord>, StorageError>;

    async fn insert_review(
        &self,
        company_id: Uuid,
        review: &ReviewRecord,
    ) -> Result<ReviewRecord, StorageError>;

    async fn health_check(&self) -> Result<(), StorageError>;
}
