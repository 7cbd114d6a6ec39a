//! Shared types used across the feed pipeline.
//!
//! [`FeedPost`] is serialized into the storage cache and read back on the
//! next page load, so its field names are part of the stored format and
//! must stay stable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One normalized entry of the remote feed, ready to render.
///
/// Built once by [`crate::rss::parse_feed`]; never edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPost {
    /// Entry title, verbatim (empty if absent).
    pub title: String,
    /// Entry permalink, verbatim (empty if absent).
    pub link: String,
    /// Long human date ("January 5, 2024"), or the raw value if unparseable.
    pub date: String,
    /// Plain-text summary, truncated with `...`.
    pub excerpt: String,
}

/// Data-source failure: the feed could not be obtained or understood.
///
/// Any of these makes the loader show the fallback message.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("feed request returned HTTP {0}")]
    Status(u16),
    #[error("feed parse error: {0}")]
    Parse(String),
}
