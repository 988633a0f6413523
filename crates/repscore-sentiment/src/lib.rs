//! Review collection and sentiment analysis for repscore.
//!
//! Reviews are pulled from Google Places, Yelp, and Reddit, classified with
//! an AFINN-style lexicon, optionally persisted through the [`Store`] seam,
//! and aggregated into a [`SentimentSummary`].
//!
//! [`Store`]: repscore_core::Store
//! [`SentimentSummary`]: repscore_core::SentimentSummary

pub mod aggregator;
pub mod error;
pub mod scorer;
pub mod sources;

pub use aggregator::{classify_review, local_summary, ReviewAggregator, ReviewCollection};
pub use error::{SentimentError, SourceError};
pub use scorer::{classify, label_for, Classification};
pub use sources::{build_sources, GooglePlacesSource, RedditSource, ReviewSource, YelpSource};
