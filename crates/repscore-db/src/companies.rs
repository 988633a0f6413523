//! Database operations for the `companies` table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use repscore_core::{CompanyMetrics, CompanyProfile, OnlinePresence};

use crate::DbError;

/// A row from the `companies` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub website: String,
    pub industry: String,
    pub established: String,
    pub online_presence: Value,
    pub metrics: Value,
    pub last_analyzed_at: Option<DateTime<Utc>>,
}

impl CompanyRow {
    /// Convert into the domain profile.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Json`] if the JSONB columns do not match the domain shape.
    pub fn into_profile(self) -> Result<CompanyProfile, DbError> {
        let online_presence: OnlinePresence = serde_json::from_value(self.online_presence)?;
        let metrics: CompanyMetrics = serde_json::from_value(self.metrics)?;
        Ok(CompanyProfile {
            id: self.id,
            name: self.name,
            location: self.location,
            website: self.website,
            industry: self.industry,
            established: self.established,
            online_presence,
            metrics,
            last_analyzed_at: self.last_analyzed_at,
            persisted: true,
        })
    }
}

const COMPANY_COLUMNS: &str = "id, name, location, website, industry, established, \
                               online_presence, metrics, last_analyzed_at";

/// Find a company by case-insensitive exact name.
///
/// Ties are broken by the most recent analysis (never-analysed rows last),
/// then by creation order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_company_by_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<CompanyRow>, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "SELECT {COMPANY_COLUMNS} \
         FROM companies \
         WHERE LOWER(name) = LOWER($1) \
         ORDER BY last_analyzed_at DESC NULLS LAST, created_at ASC \
         LIMIT 1"
    ))
    .bind(name.trim())
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Insert a new company and return the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_company(
    pool: &PgPool,
    profile: &CompanyProfile,
) -> Result<CompanyRow, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "INSERT INTO companies \
             (id, name, location, website, industry, established, \
              online_presence, metrics, last_analyzed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {COMPANY_COLUMNS}"
    ))
    .bind(profile.id)
    .bind(&profile.name)
    .bind(&profile.location)
    .bind(&profile.website)
    .bind(&profile.industry)
    .bind(&profile.established)
    .bind(serde_json::to_value(&profile.online_presence)?)
    .bind(serde_json::to_value(&profile.metrics)?)
    .bind(profile.last_analyzed_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Overwrite the mutable fields of an existing company.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has the profile's id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_company(pool: &PgPool, profile: &CompanyProfile) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE companies SET \
             location = $2, website = $3, industry = $4, established = $5, \
             online_presence = $6, metrics = $7, last_analyzed_at = $8, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(profile.id)
    .bind(&profile.location)
    .bind(&profile.website)
    .bind(&profile.industry)
    .bind(&profile.established)
    .bind(serde_json::to_value(&profile.online_presence)?)
    .bind(serde_json::to_value(&profile.metrics)?)
    .bind(profile.last_analyzed_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
