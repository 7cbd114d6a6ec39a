//! The feed loading pipeline.
//!
//! ```text
//! cache hit ──────────────────────────────────────────────► render posts
//! cache miss ─► fetch via proxy ─► parse ─► write cache ──► render posts
//!                      └────────────┴── failure ──────────► render fallback
//! ```
//!
//! [`FeedLoader::load`] runs once per page. The fetch is its only await
//! point; everything else is synchronous. A failed fetch or parse never
//! touches the cache, so the next load tries the network again.

use crate::cache::{FeedCache, KeyValueStore};
use crate::config::FeedConfig;
use crate::fetch::{FeedSource, proxied_url};
use crate::render::{FeedContainer, HomeLink, render_fallback, render_posts};
use crate::rss::parse_feed;
use crate::types::{FeedError, FeedPost};
use chrono::{DateTime, Utc};
use std::fmt;

/// What a load ended up showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Rendered this many posts from a fresh cache entry.
    Cached(usize),
    /// Fetched and rendered `posts`; `cached` is false when the store
    /// rejected the write.
    Fetched { posts: usize, cached: bool },
    /// Rendered the fallback message.
    Failed,
}

fn posts_label(n: usize) -> &'static str {
    if n == 1 { "post" } else { "posts" }
}

impl fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LoadOutcome::Cached(n) => write!(f, "{n} {} (cached)", posts_label(n)),
            LoadOutcome::Fetched { posts, .. } => {
                write!(f, "{posts} {} (fetched)", posts_label(posts))
            }
            LoadOutcome::Failed => write!(f, "unavailable (fallback shown)"),
        }
    }
}

/// Feed loader bound to a store and a network source.
pub struct FeedLoader<S, F> {
    config: FeedConfig,
    cache: FeedCache,
    store: S,
    source: F,
}

impl<S: KeyValueStore, F: FeedSource> FeedLoader<S, F> {
    pub fn new(config: FeedConfig, store: S, source: F) -> Self {
        let cache = FeedCache::new(config.cache_key.clone(), config.cache_window());
        Self {
            config,
            cache,
            store,
            source,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    /// Load at the current time.
    pub async fn load(&mut self, container: &mut impl FeedContainer) -> LoadOutcome {
        self.load_at(Utc::now(), container).await
    }

    /// Load as if the clock read `now`.
    pub async fn load_at(
        &mut self,
        now: DateTime<Utc>,
        container: &mut impl FeedContainer,
    ) -> LoadOutcome {
        let home = HomeLink {
            url: &self.config.home_url,
            label: &self.config.home_label,
        };

        if let Some(posts) = self.cache.read(&self.store, now) {
            tracing::debug!(posts = posts.len(), "rendering cached feed");
            container.replace_html(&render_posts(&posts, home).into_string());
            return LoadOutcome::Cached(posts.len());
        }

        match self.fetch_posts().await {
            Ok(posts) => {
                let cached = self.cache.write(&mut self.store, &posts, now);
                tracing::info!(posts = posts.len(), cached, "feed fetched");
                container.replace_html(&render_posts(&posts, home).into_string());
                LoadOutcome::Fetched {
                    posts: posts.len(),
                    cached,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "RSS fetch error");
                container.replace_html(&render_fallback(home).into_string());
                LoadOutcome::Failed
            }
        }
    }

    async fn fetch_posts(&self) -> Result<Vec<FeedPost>, FeedError> {
        let url = proxied_url(&self.config.proxy_url, &self.config.feed_url);
        let body = self.source.fetch(&url).await?;
        parse_feed(&body, self.config.excerpt_chars)
    }
}
