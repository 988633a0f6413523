//! Company identity resolution and the per-run profile refresh.

use chrono::{DateTime, Utc};

use repscore_core::{round_to, CompanyProfile, Platform, ReviewRecord, Store};

use crate::error::AnalysisError;

/// Find or create the profile for `name`.
///
/// A storage failure yields a provisional profile (`persisted == false`)
/// built from the inputs, so the analysis can continue without a store.
///
/// # Errors
///
/// Returns [`AnalysisError::AggregateFailure`] if not even a provisional
/// profile can be built from the inputs.
pub async fn resolve_company(
    store: &dyn Store,
    name: &str,
    location: &str,
    website: &str,
) -> Result<CompanyProfile, AnalysisError> {
    let provisional = || {
        CompanyProfile::new(name, location, website)
            .map_err(|e| AnalysisError::AggregateFailure(format!("company identity: {e}")))
    };

    match store.find_company(name).await {
        Ok(Some(mut profile)) => {
            if profile.absorb_inputs(location, website) {
                tracing::debug!(company = %profile.name, "filled missing company details from request");
            }
            Ok(profile)
        }
        Ok(None) => {
            let fresh = provisional()?;
            match store.create_company(&fresh).await {
                Ok(created) => {
                    tracing::info!(company = %created.name, id = %created.id, "created company profile");
                    Ok(created)
                }
                Err(e) => {
                    tracing::warn!(company = name, error = %e, "company create failed, using provisional profile");
                    Ok(fresh)
                }
            }
        }
        Err(e) => {
            tracing::warn!(company = name, error = %e, "company lookup failed, using provisional profile");
            provisional()
        }
    }
}

/// Update the rolling metrics and platform list from this run's reviews.
pub fn refresh_profile(profile: &mut CompanyProfile, reviews: &[ReviewRecord], now: DateTime<Utc>) {
    let total = u32::try_from(reviews.len()).unwrap_or(u32::MAX);
    profile.metrics.total_reviews = total;
    profile.metrics.average_rating = if total == 0 {
        0.0
    } else {
        round_to(
            reviews.iter().map(|r| r.rating).sum::<f64>() / f64::from(total),
            1,
        )
    };

    let mut platforms: Vec<Platform> = Vec::new();
    for review in reviews {
        if !platforms.contains(&review.platform) {
            platforms.push(review.platform);
        }
    }
    profile.online_presence.review_platforms = platforms
        .into_iter()
        .map(|p| p.display_name().to_string())
        .collect();

    profile.last_analyzed_at = Some(now);
}

#[cfg(test)]
mod tests {
    use super::*;

    use repscore_db::MemoryStore;

    #[tokio::test]
    async fn creates_then_finds_case_insensitively() {
        let store = MemoryStore::new();
        let created = resolve_company(&store, "Acme Bakery", "Austin", "")
            .await
            .unwrap();
        assert!(created.persisted);

        let found = resolve_company(&store, "ACME BAKERY", "", "https://acme.test")
            .await
            .unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.website, "https://acme.test");
        assert!(found.online_presence.has_website);
    }

    #[tokio::test]
    async fn storage_failure_yields_provisional_profile() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let profile = resolve_company(&store, "Acme", "", "").await.unwrap();
        assert!(!profile.persisted);
        assert_eq!(profile.name, "Acme");
    }

    #[tokio::test]
    async fn blank_name_cannot_be_resolved() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = resolve_company(&store, "  ", "", "").await.unwrap_err();
        assert!(matches!(err, AnalysisError::AggregateFailure(_)));
    }

    #[test]
    fn refresh_updates_metrics_and_platforms() {
        let mut profile = CompanyProfile::new("Acme", "", "").unwrap();
        let reviews = vec![
            ReviewRecord::new("1", Platform::Yelp, "a", 5.0, "x", None),
            ReviewRecord::new("2", Platform::Google, "b", 4.0, "y", None),
            ReviewRecord::new("3", Platform::Yelp, "c", 4.0, "z", None),
        ];
        let now = Utc::now();
        refresh_profile(&mut profile, &reviews, now);

        assert_eq!(profile.metrics.total_reviews, 3);
        assert!((profile.metrics.average_rating - 4.3).abs() < 1e-9);
        assert_eq!(profile.online_presence.review_platforms, ["Yelp", "Google"]);
        assert_eq!(profile.last_analyzed_at, Some(now));
    }
}
