//! Network access for the feed.
//!
//! The feed host sends no CORS headers, so the page reaches it through a
//! proxy that takes the target address as a query parameter:
//!
//! ```text
//! https://api.allorigins.win/raw?url=https%3A%2F%2Fbenparens.substack.com%2Ffeed
//! ```
//!
//! [`FeedSource`] is the seam the loader depends on; [`HttpSource`] is the
//! real implementation. There is no retry and no timeout beyond what the
//! HTTP client itself applies.

use crate::types::FeedError;
use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client;

/// Characters `encodeURIComponent` leaves alone besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Address of `target` behind `proxy`.
pub fn proxied_url(proxy: &str, target: &str) -> String {
    format!("{proxy}{}", utf8_percent_encode(target, URI_COMPONENT))
}

/// Something that can return the body of a feed URL.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FeedError>;
}

/// Plain HTTP GET with `reqwest`. Any non-2xx status is an error.
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<String, FeedError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        Ok(resp.text().await?)
    }
}
