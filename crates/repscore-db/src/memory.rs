//! Process-local [`Store`] used when no database is configured, and as a
//! controllable store in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use repscore_core::{CompanyProfile, ReputationAnalysis, ReviewRecord, StorageError, Store};

use crate::reviews::review_fingerprint;

#[derive(Debug, Default)]
struct Tables {
    companies: Vec<CompanyProfile>,
    analyses: HashMap<Uuid, Vec<ReputationAnalysis>>,
    reviews: HashMap<String, ReviewRecord>,
}

/// A single [`Store`] operation, for targeted failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    FindCompany,
    CreateCompany,
    SaveCompany,
    FindRecentAnalysis,
    SaveAnalysis,
    FindReview,
    InsertReview,
    HealthCheck,
}

impl StoreOp {
    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
    failing: AtomicU16,
    saved_analyses: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every operation fails with [`StorageError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make one operation fail with [`StorageError::Unavailable`] while the
    /// rest keep working.
    pub fn set_failing(&self, op: StoreOp, failing: bool) {
        if failing {
            self.failing.fetch_or(op.bit(), Ordering::SeqCst);
        } else {
            self.failing.fetch_and(!op.bit(), Ordering::SeqCst);
        }
    }

    /// Number of analyses saved since construction.
    #[must_use]
    pub fn saved_analysis_count(&self) -> usize {
        self.saved_analyses.load(Ordering::SeqCst)
    }

    /// Number of distinct reviews held.
    pub async fn review_count(&self) -> usize {
        self.tables.read().await.reviews.len()
    }

    fn ensure_online(&self, op: StoreOp) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("memory store is offline".to_string()))
        } else if self.failing.load(Ordering::SeqCst) & op.bit() != 0 {
            Err(StorageError::Unavailable(format!("memory store {op:?} is failing")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_company(&self, name: &str) -> Result<Option<CompanyProfile>, StorageError> {
        self.ensure_online(StoreOp::FindCompany)?;
        let needle = name.trim().to_lowercase();
        let tables = self.tables.read().await;

        // Stable max: first-created wins among equal timestamps; `None` sorts lowest.
        let mut best: Option<&CompanyProfile> = None;
        for company in tables
            .companies
            .iter()
            .filter(|c| c.name.to_lowercase() == needle)
        {
            if best.is_none_or(|b| company.last_analyzed_at > b.last_analyzed_at) {
                best = Some(company);
            }
        }
        Ok(best.cloned())
    }

    async fn create_company(
        &self,
        profile: &CompanyProfile,
    ) -> Result<CompanyProfile, StorageError> {
        self.ensure_online(StoreOp::CreateCompany)?;
        let mut stored = profile.clone();
        stored.persisted = true;
        self.tables.write().await.companies.push(stored.clone());
        Ok(stored)
    }

    async fn save_company(&self, profile: &CompanyProfile) -> Result<(), StorageError> {
        self.ensure_online(StoreOp::SaveCompany)?;
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.companies.iter_mut().find(|c| c.id == profile.id) else {
            return Err(StorageError::Query(format!(
                "company {} does not exist",
                profile.id
            )));
        };
        *existing = CompanyProfile {
            persisted: true,
            ..profile.clone()
        };
        Ok(())
    }

    async fn find_recent_analysis(
        &self,
        company_id: Uuid,
    ) -> Result<Option<ReputationAnalysis>, StorageError> {
        self.ensure_online(StoreOp::FindRecentAnalysis)?;
        let tables = self.tables.read().await;
        Ok(tables
            .analyses
            .get(&company_id)
            .and_then(|history| history.last())
            .cloned())
    }

    async fn save_analysis(
        &self,
        company_id: Uuid,
        analysis: &ReputationAnalysis,
    ) -> Result<DateTime<Utc>, StorageError> {
        self.ensure_online(StoreOp::SaveAnalysis)?;
        let recorded = analysis.timestamp;
        self.tables
            .write()
            .await
            .analyses
            .entry(company_id)
            .or_default()
            .push(analysis.clone());
        self.saved_analyses.fetch_add(1, Ordering::SeqCst);
        Ok(recorded)
    }

    async fn find_review(
        &self,
        company_id: Uuid,
        review: &ReviewRecord,
    ) -> Result<Option<ReviewRecord>, StorageError> {
        self.ensure_online(StoreOp::FindReview)?;
        let key = review_fingerprint(company_id, review);
        Ok(self.tables.read().await.reviews.get(&key).cloned())
    }

    async fn insert_review(
        &self,
        company_id: Uuid,
        review: &ReviewRecord,
    ) -> Result<ReviewRecord, StorageError> {
        self.ensure_online(StoreOp::InsertReview)?;
        let key = review_fingerprint(company_id, review);
        let mut tables = self.tables.write().await;
        let stored = tables.reviews.entry(key).or_insert_with(|| ReviewRecord {
            id: Uuid::new_v4().to_string(),
            created_at: Some(Utc::now()),
            ..review.clone()
        });
        Ok(stored.clone())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.ensure_online(StoreOp::HealthCheck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use repscore_core::Platform;

    fn profile(name: &str) -> CompanyProfile {
        CompanyProfile::new(name, "", "").expect("valid name")
    }

    #[tokio::test]
    async fn find_company_is_case_insensitive_exact() {
        let store = MemoryStore::new();
        store.create_company(&profile("Acme Bakery")).await.unwrap();

        let found = store.find_company("  acme BAKERY ").await.unwrap();
        assert!(found.is_some_and(|c| c.persisted));
        assert!(store.find_company("Acme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_company_prefers_most_recently_analysed() {
        let store = MemoryStore::new();
        let mut older = profile("Acme");
        older.last_analyzed_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let mut newer = profile("ACME");
        newer.last_analyzed_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let never = profile("acme");

        store.create_company(&older).await.unwrap();
        store.create_company(&never).await.unwrap();
        store.create_company(&newer).await.unwrap();

        let found = store.find_company("acme").await.unwrap().unwrap();
        assert_eq!(found.id, newer.id);
    }

    #[tokio::test]
    async fn save_company_requires_existing_row() {
        let store = MemoryStore::new();
        let err = store.save_company(&profile("Ghost")).await.unwrap_err();
        assert!(matches!(err, StorageError::Query(_)));
    }

    #[tokio::test]
    async fn insert_review_deduplicates_by_identity() {
        let store = MemoryStore::new();
        let company = Uuid::new_v4();
        let review = ReviewRecord::new(
            "g-1",
            Platform::Google,
            "Ana",
            5.0,
            "Lovely",
            Some("2024-02-01".into()),
        );

        let first = store.insert_review(company, &review).await.unwrap();
        let second = store.insert_review(company, &review).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.review_count().await, 1);

        let found = store.find_review(company, &review).await.unwrap();
        assert_eq!(found.map(|r| r.id), Some(first.id));
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.health_check().await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(store.find_company("Acme").await.is_err());

        store.set_offline(false);
        assert!(store.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn failing_operation_leaves_the_rest_working() {
        let store = MemoryStore::new();
        store.set_failing(StoreOp::InsertReview, true);
        let review = ReviewRecord::new("g-1", Platform::Google, "Ana", 5.0, "Lovely", None);
        let company = Uuid::new_v4();

        assert!(matches!(
            store.insert_review(company, &review).await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(store.find_review(company, &review).await.unwrap().is_none());
        assert!(store.create_company(&profile("Acme")).await.is_ok());

        store.set_failing(StoreOp::InsertReview, false);
        assert!(store.insert_review(company, &review).await.is_ok());
    }
}
