//! The comprehensive analysis pipeline: company resolution, cached results,
//! concurrent SEO and review collection, scoring, and chart projections.

pub mod charts;
pub mod company;
mod effect;
pub mod error;
pub mod orchestrator;
pub mod score;

pub use charts::{build_charts, rating_chart, seo_chart, sentiment_chart, timeline_chart};
pub use company::{refresh_profile, resolve_company};
pub use error::AnalysisError;
pub use orchestrator::{AnalysisSettings, Analyzer};
pub use score::{reputation_score, sentiment_score, REVIEW_SATURATION};
