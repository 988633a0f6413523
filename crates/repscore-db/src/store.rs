//! Postgres-backed [`Store`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use repscore_core::{CompanyProfile, ReputationAnalysis, ReviewRecord, StorageError, Store};

use crate::{analyses, companies, reviews};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_company(&self, name: &str) -> Result<Option<CompanyProfile>, StorageError> {
        let row = companies::find_company_by_name(&self.pool, name).await?;
        Ok(row.map(companies::CompanyRow::into_profile).transpose()?)
    }

    async fn create_company(
        &self,
        profile: &CompanyProfile,
    ) -> Result<CompanyProfile, StorageError> {
        let row = companies::insert_company(&self.pool, profile).await?;
        Ok(row.into_profile()?)
    }

    async fn save_company(&self, profile: &CompanyProfile) -> Result<(), StorageError> {
        companies::update_company(&self.pool, profile).await?;
        Ok(())
    }

    async fn find_recent_analysis(
        &self,
        company_id: Uuid,
    ) -> Result<Option<ReputationAnalysis>, StorageError> {
        let row = analyses::get_latest_analysis(&self.pool, company_id).await?;
        Ok(row.map(analyses::AnalysisRow::into_analysis).transpose()?)
    }

    async fn save_analysis(
        &self,
        company_id: Uuid,
        analysis: &ReputationAnalysis,
    ) -> Result<DateTime<Utc>, StorageError> {
        Ok(analyses::insert_analysis(&self.pool, company_id, analysis, analysis.timestamp).await?)
    }

    async fn find_review(
        &self,
        company_id: Uuid,
        review: &ReviewRecord,
    ) -> Result<Option<ReviewRecord>, StorageError> {
        let fingerprint = reviews::review_fingerprint(company_id, review);
        let row = reviews::find_review_by_fingerprint(&self.pool, &fingerprint).await?;
        Ok(row.map(reviews::ReviewRow::into_record).transpose()?)
    }

    async fn insert_review(
        &self,
        company_id: Uuid,
        review: &ReviewRecord,
    ) -> Result<ReviewRecord, StorageError> {
        let row = reviews::insert_review(&self.pool, company_id, review).await?;
        Ok(row.into_record()?)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
