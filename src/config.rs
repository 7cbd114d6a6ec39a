//! Widget configuration module.
//!
//! Handles loading and validating `config.toml`. Every value has a
//! stock default matching what the published site uses, so a missing file is
//! not an error: the browser-side behaviors never read a config file, only
//! the host binary and tests do.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [feed]
//! feed_url = "https://benparens.substack.com/feed"
//! proxy_url = "https://api.allorigins.win/raw?url="
//! home_url = "https://benparens.substack.com"
//! home_label = "my Substack"
//! cache_key = "substack_posts"
//! cache_minutes = 30
//! excerpt_chars = 200
//!
//! [gallery]
//! duplicate_match = "last"  # or "first"
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetsConfig {
    /// Remote feed, proxy, and cache settings.
    pub feed: FeedConfig,
    /// Lightbox behavior settings.
    pub gallery: GalleryConfig,
}

impl WidgetsConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let feed = &self.feed;
        if feed.cache_minutes == 0 {
            return Err(ConfigError::Validation(
                "feed.cache_minutes must be greater than 0".into(),
            ));
        }
        if feed.excerpt_chars == 0 {
            return Err(ConfigError::Validation(
                "feed.excerpt_chars must be greater than 0".into(),
            ));
        }
        for (name, value) in [
            ("feed.feed_url", &feed.feed_url),
            ("feed.proxy_url", &feed.proxy_url),
            ("feed.home_url", &feed.home_url),
            ("feed.cache_key", &feed.cache_key),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

/// Feed loader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Address of the RSS document.
    pub feed_url: String,
    /// Cross-origin proxy prefix. The feed URL is appended percent-encoded.
    pub proxy_url: String,
    /// Canonical home page, linked from the empty and fallback messages.
    pub home_url: String,
    /// Link text for `home_url`.
    pub home_label: String,
    /// Storage key holding the serialized cache entry.
    pub cache_key: String,
    /// How long a cache entry stays valid, in minutes.
    pub cache_minutes: u64,
    /// Maximum excerpt length in characters before the ellipsis marker.
    pub excerpt_chars: usize,
}

impl FeedConfig {
    /// `cache_minutes` as a duration, saturating for absurdly large values.
    pub fn cache_window(&self) -> Duration {
        Duration::from_secs(self.cache_minutes.saturating_mul(60))
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            feed_url: "https://benparens.substack.com/feed".to_string(),
            proxy_url: "https://api.allorigins.win/raw?url=".to_string(),
            home_url: "https://benparens.substack.com".to_string(),
            home_label: "my Substack".to_string(),
            cache_key: "substack_posts".to_string(),
            cache_minutes: 30,
            excerpt_chars: 200,
        }
    }
}

/// Lightbox settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Which thumbnail wins when several share the displayed source.
    pub duplicate_match: DuplicateMatch,
}

/// Tie-break for locating the displayed image in the thumbnail sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateMatch {
    /// Earliest thumbnail with a matching source.
    First,
    /// Latest thumbnail with a matching source (the published site's behavior).
    #[default]
    Last,
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Parse `config.toml` contents and validate them.
///
/// Missing sections and keys take their stock defaults.
pub fn parse_config(content: &str) -> Result<WidgetsConfig, ConfigError> {
    let config: WidgetsConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// A missing file yields the stock defaults.
pub fn load_config(root: &Path) -> Result<WidgetsConfig, ConfigError> {
    let config_path = root.join("config.toml");
    if !config_path.exists() {
        return Ok(WidgetsConfig::default());
    }
    parse_config(&fs::read_to_string(&config_path)?)
}

/// Returns a fully-commented stock `config.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# pagekit configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Feed loader
# ---------------------------------------------------------------------------
[feed]
# RSS document to display.
feed_url = "https://benparens.substack.com/feed"

# Cross-origin proxy. The feed URL is appended, percent-encoded.
proxy_url = "https://api.allorigins.win/raw?url="

# Where the "no posts" and "unable to load" messages point visitors.
home_url = "https://benparens.substack.com"
home_label = "my Substack"

# Storage key and lifetime of the cached post list.
cache_key = "substack_posts"
cache_minutes = 30

# Excerpts longer than this many characters are cut and get "...".
excerpt_chars = 200

# ---------------------------------------------------------------------------
# Lightbox
# ---------------------------------------------------------------------------
[gallery]
# When several thumbnails share one full-size source, arrow-key navigation
# continues from the "last" (default) or "first" of them.
duplicate_match = "last"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_published_site() {
        let config = WidgetsConfig::default();
        assert_eq!(config.feed.cache_key, "substack_posts");
        assert_eq!(config.feed.cache_minutes, 30);
        assert_eq!(config.feed.excerpt_chars, 200);
        assert_eq!(config.feed.cache_window(), Duration::from_secs(1800));
        assert_eq!(config.gallery.duplicate_match, DuplicateMatch::Last);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[feed]
cache_minutes = 5
"#;
        let config: WidgetsConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.feed.cache_minutes, 5);
        // Defaults preserved
        assert_eq!(config.feed.excerpt_chars, 200);
        assert_eq!(config.gallery.duplicate_match, DuplicateMatch::Last);
    }

    #[test]
    fn parse_duplicate_match_first() {
        let config: WidgetsConfig = toml::from_str("[gallery]\nduplicate_match = \"first\"").unwrap();
        assert_eq!(config.gallery.duplicate_match, DuplicateMatch::First);
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: WidgetsConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = WidgetsConfig::default();
        assert_eq!(config.feed.feed_url, defaults.feed.feed_url);
        assert_eq!(config.feed.proxy_url, defaults.feed.proxy_url);
        assert_eq!(config.feed.home_label, defaults.feed.home_label);
        assert_eq!(config.gallery.duplicate_match, defaults.gallery.duplicate_match);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.feed.cache_minutes, 30);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[feed]
feed_url = "https://example.com/rss"
home_label = "the blog"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.feed.feed_url, "https://example.com/rss");
        assert_eq!(config.feed.home_label, "the blog");
        assert_eq!(config.feed.cache_key, "substack_posts");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[feed\nbroken").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[feed]\ncache_mins = 5\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<WidgetsConfig, _> = toml::from_str("[comments]\nenabled = true");
        assert!(result.is_err());
    }

    // =========================================================================
    // parse_config
    // =========================================================================

    #[test]
    fn parse_config_empty_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.feed.cache_key, "substack_posts");
        assert_eq!(config.gallery.duplicate_match, DuplicateMatch::Last);
    }

    #[test]
    fn parse_config_validates() {
        assert!(matches!(
            parse_config("[feed]\nproxy_url = \"\"\n"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn huge_cache_minutes_saturates_window() {
        let config = parse_config("[feed]\ncache_minutes = 9223372036854775807\n").unwrap();
        assert_eq!(config.feed.cache_window(), Duration::from_secs(u64::MAX));
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(WidgetsConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_zero_cache_window() {
        let mut config = WidgetsConfig::default();
        config.feed.cache_minutes = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_zero_excerpt() {
        let mut config = WidgetsConfig::default();
        config.feed.excerpt_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_feed_url() {
        let mut config = WidgetsConfig::default();
        config.feed.feed_url = "  ".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("feed.feed_url"));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[feed]\nexcerpt_chars = 0\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
