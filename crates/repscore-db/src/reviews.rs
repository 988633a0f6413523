//! Database operations for the `reviews` table.
//!
//! A review's identity is `{company, platform, text, date}`. The identity is
//! hashed into the `fingerprint` column, which carries a unique index, so a
//! concurrent duplicate insert collapses into the existing row.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use repscore_core::{Platform, ReviewRecord, SentimentLabel};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub fingerprint: String,
    pub platform: String,
    pub author: String,
    pub rating: f64,
    pub text: String,
    pub review_date: Option<String>,
    pub sentiment: String,
    pub sentiment_score: i32,
    pub verified: bool,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReviewRow {
    /// Convert into the domain record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Malformed`] if the platform or sentiment column
    /// holds a value the domain does not recognise.
    pub fn into_record(self) -> Result<ReviewRecord, DbError> {
        let platform: Platform = self
            .platform
            .parse()
            .map_err(|e: repscore_core::CoreError| DbError::Malformed(e.to_string()))?;
        let sentiment: SentimentLabel = self.sentiment.parse().map_err(DbError::Malformed)?;

        Ok(ReviewRecord {
            id: self.id.to_string(),
            platform,
            author: self.author,
            rating: self.rating,
            text: self.text,
            date: self.review_date,
            created_at: Some(self.created_at),
            sentiment,
            sentiment_score: self.sentiment_score,
            verified: self.verified,
            url: self.url,
        })
    }
}

/// Stable hex digest of a review's identity within a company.
///
/// Fields are NUL-separated; a missing date hashes differently from an
/// empty one.
#[must_use]
pub fn review_fingerprint(company_id: Uuid, review: &ReviewRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(company_id.as_bytes());
    hasher.update([0]);
    hasher.update(review.platform.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(review.text.as_bytes());
    hasher.update([0]);
    match &review.date {
        Some(date) => {
            hasher.update([1]);
            hasher.update(date.as_bytes());
        }
        None => hasher.update([2]),
    }
    format!("{:x}", hasher.finalize())
}

const REVIEW_COLUMNS: &str = "id, company_id, fingerprint, platform, author, rating, text, \
                              review_date, sentiment, sentiment_score, verified, url, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Fetch a stored review by fingerprint.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_review_by_fingerprint(
    pool: &PgPool,
    fingerprint: &str,
) -> Result<Option<ReviewRow>, DbError> {
    let row = sqlx::query_as::<_, ReviewRow>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE fingerprint = $1"
    ))
    .bind(fingerprint)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Insert a review for a company, returning the stored row.
///
/// If a review with the same identity already exists, the existing row is
/// returned unchanged.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, or [`DbError::NotFound`]
/// if the conflicting row vanished before it could be re-read.
pub async fn insert_review(
    pool: &PgPool,
    company_id: Uuid,
    review: &ReviewRecord,
) -> Result<ReviewRow, DbError> {
    let fingerprint = review_fingerprint(company_id, review);

    let inserted = sqlx::query_as::<_, ReviewRow>(&format!(
        "INSERT INTO reviews \
             (id, company_id, fingerprint, platform, author, rating, text, \
              review_date, sentiment, sentiment_score, verified, url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         ON CONFLICT (fingerprint) DO NOTHING \
         RETURNING {REVIEW_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(company_id)
    .bind(&fingerprint)
    .bind(review.platform.as_str())
    .bind(&review.author)
    .bind(review.rating)
    .bind(&review.text)
    .bind(review.date.as_deref())
    .bind(review.sentiment.as_str())
    .bind(review.sentiment_score)
    .bind(review.verified)
    .bind(review.url.as_deref())
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some(row) => Ok(row),
        None => find_review_by_fingerprint(pool, &fingerprint)
            .await?
            .ok_or(DbError::NotFound),
    }
}
