//! Website SEO scoring: page fetching, signal extraction, sub-scores, and
//! the weighted composite with its recommendation list.

pub mod error;
pub mod fetch;
pub mod recommendations;
pub(crate) mod retry;
pub mod scorer;
pub mod scoring;
pub mod signals;

pub use error::FetchError;
pub use fetch::{FetchedPage, HttpPageFetcher, PageFetcher};
pub use recommendations::{seo_recommendations, SEO_LOOKS_GOOD};
pub use scorer::{composite_score, default_report, SeoScorer};
pub use scoring::score_breakdown;
pub use signals::PageSignals;
