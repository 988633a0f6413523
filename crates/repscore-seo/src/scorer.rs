//! The SEO scorer: fetch, score, composite, grade.

use std::sync::Arc;

use repscore_core::{
    Backlinks, ContentSeo, Grade, Headings, ImageStats, OnPageSeo, SeoBreakdown, SeoReport, SocialSignals,
    TagCheck, TechnicalSeo,
};

use crate::fetch::PageFetcher;
use crate::recommendations::seo_recommendations;
use crate::scoring::score_breakdown;
use crate::signals::PageSignals;

/// Authority used in the composite when the real value is unknown (0).
const NEUTRAL_AUTHORITY: f64 = 50.0;
const DEFAULT_SUB_SCORE: u8 = 50;

#[derive(Clone)]
pub struct SeoScorer {
    fetcher: Arc<dyn PageFetcher>,
}

impl SeoScorer {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Score `website` for `company`. Never fails: a missing or malformed
    /// website, or any fetch error, yields [`default_report`].
    pub async fn score(&self, company: &str, website: &str) -> SeoReport {
        let website = website.trim();
        if !has_http_scheme(website) {
            tracing::debug!(company, website, "no fetchable website, using default SEO report");
            return default_report();
        }

        let page = match self.fetcher.fetch(website).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(company, website, error = %e, "website fetch failed");
                return default_report();
            }
        };

        let signals = PageSignals::extract(&page.html);
        let breakdown = score_breakdown(company, website, &signals);
        let composite = composite_score(&breakdown);

        tracing::debug!(company, website, composite, "scored website");

        SeoReport {
            overall_score: round_score(composite),
            grade: Grade::from_score(composite),
            recommendations: seo_recommendations(&breakdown),
            breakdown,
        }
    }
}

fn has_http_scheme(website: &str) -> bool {
    let lower = website.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

/// Weighted composite of the five dimensions, unrounded.
#[must_use]
pub fn composite_score(b: &SeoBreakdown) -> f64 {
    let authority = match b.backlinks.domain_authority {
        0 => NEUTRAL_AUTHORITY,
        da => f64::from(da),
    };
    let social_total = f64::from(b.social.facebook_shares)
        + f64::from(b.social.twitter_mentions)
        + f64::from(b.social.linkedin_shares);
    let social = (social_total / 10.0).min(100.0);

    f64::from(b.on_page.score) * 0.30
        + f64::from(b.technical.score) * 0.25
        + f64::from(b.content.score) * 0.25
        + authority * 0.15
        + social * 0.05
}

/// Report used when the site cannot be analysed: neutral 50s, grade D.
#[must_use]
pub fn default_report() -> SeoReport {
    let breakdown = SeoBreakdown {
        on_page: OnPageSeo {
            score: DEFAULT_SUB_SCORE,
            title_tag: TagCheck::default(),
            meta_description: TagCheck::default(),
            headings: Headings {
                h1_count: 0,
                h2_count: 0,
                structure: "Poor".to_string(),
            },
            images: ImageStats::default(),
            internal_links: 0,
        },
        technical: TechnicalSeo {
            score: DEFAULT_SUB_SCORE,
            mobile_friendly: false,
            page_speed: DEFAULT_SUB_SCORE,
            ssl_certificate: false,
            sitemap: false,
            robots_txt: false,
        },
        content: ContentSeo {
            score: DEFAULT_SUB_SCORE,
            keyword_density: 0.0,
            content_length: 0,
            readability: "Unknown".to_string(),
        },
        backlinks: Backlinks {
            count: 0,
            quality: "Unknown".to_string(),
            domain_authority: DEFAULT_SUB_SCORE,
        },
        social: SocialSignals::default(),
    };

    SeoReport {
        overall_score: DEFAULT_SUB_SCORE,
        grade: Grade::D,
        recommendations: seo_recommendations(&breakdown),
        breakdown,
    }
}
