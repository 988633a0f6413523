//! Shared domain types, output contract, storage seam, and configuration for repscore.

pub mod analysis;
pub mod app_config;
pub mod company;
pub mod config;
pub mod review;
pub mod seo;
pub mod store;

pub use analysis::{
    round_to, ChartSlice, Charts, MetricsSnapshot, ReputationAnalysis, ReviewDetails,
    ReviewsSection, SentimentCounts, SentimentDistribution, SentimentSummary, TimelinePoint,
};
pub use app_config::{AiConfig, AppConfig, Environment, ReviewSourceConfig};
pub use company::{BasicInfo, CompanyInfo, CompanyMetrics, CompanyProfile, OnlinePresence};
pub use config::{load_app_config, load_app_config_from_env};
pub use review::{Platform, ReviewRecord, SentimentLabel};
pub use seo::{
    Backlinks, ContentSeo, Grade, Headings, ImageStats, OnPageSeo, SeoBreakdown, SeoReport,
    SocialSignals, TagCheck, TechnicalSeo,
};
pub use store::{StorageError, Store};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("company name must not be empty")]
    EmptyCompanyName,
    #[error("unknown review platform: {0}")]
    UnknownPlatform(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
