//! Database operations for the `analyses` table.
//!
//! Each analysis is stored as its full JSON payload. The row's `created_at`
//! is authoritative for the analysis timestamp, so a replayed payload always
//! matches what was returned when it was first saved.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use repscore_core::ReputationAnalysis;

use crate::DbError;

/// A row from the `analyses` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisRow {
    pub id: i64,
    pub company_id: Uuid,
    pub overall_score: i16,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRow {
    /// Decode the stored payload, stamping it with the row's `created_at`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Json`] if the payload no longer matches the
    /// analysis shape.
    pub fn into_analysis(self) -> Result<ReputationAnalysis, DbError> {
        let mut analysis: ReputationAnalysis = serde_json::from_value(self.payload)?;
        analysis.timestamp = self.created_at;
        Ok(analysis)
    }
}

/// Store an analysis for a company and return the recorded timestamp.
///
/// The returned value is what Postgres actually stored (microsecond
/// precision), which may differ from `created_at` in its sub-microsecond
/// part.
///
/// # Errors
///
/// Returns [`DbError::Json`] if the analysis cannot be serialized, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_analysis(
    pool: &PgPool,
    company_id: Uuid,
    analysis: &ReputationAnalysis,
    created_at: DateTime<Utc>,
) -> Result<DateTime<Utc>, DbError> {
    let payload = serde_json::to_value(analysis)?;

    let stored: DateTime<Utc> = sqlx::query_scalar(
        "INSERT INTO analyses (company_id, overall_score, payload, created_at) \
         VALUES ($1, $2, $3, $4) \
         RETURNING created_at",
    )
    .bind(company_id)
    .bind(i16::from(analysis.overall_score))
    .bind(payload)
    .bind(created_at)
    .fetch_one(pool)
    .await?;

    Ok(stored)
}

/// Fetch the most recent analysis row for a company.
///
/// Results are ordered by `created_at DESC` then `id DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_latest_analysis(
    pool: &PgPool,
    company_id: Uuid,
) -> Result<Option<AnalysisRow>, DbError> {
    let row = sqlx::query_as::<_, AnalysisRow>(
        "SELECT id, company_id, overall_score, payload, created_at \
         FROM analyses \
         WHERE company_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1",
    )
    .bind(company_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
