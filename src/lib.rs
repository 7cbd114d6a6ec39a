//! # pagekit
//!
//! The two interactive pieces of a personal static site:
//!
//! - a **lightbox** over the photo gallery, with arrow-key navigation that
//!   wraps around the thumbnail row;
//! - a **feed panel** that shows recent posts from a remote RSS feed, cached
//!   for half an hour and degrading to a plain link when the feed is down.
//!
//! The two share nothing. Each is built once at page load.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`gallery`] | Lightbox controller: open/close state, keyboard navigation |
//! | [`loader`] | Feed pipeline: cache → fetch → parse → cache → render |
//! | [`rss`] | RSS item extraction, date formatting, HTML-stripped excerpts |
//! | [`cache`] | Key-value store abstraction and the time-bounded post cache |
//! | [`fetch`] | Proxied HTTP source for the feed |
//! | [`render`] | HTML escaping and the card / message fragments |
//! | [`types`] | `FeedPost` and the data-source error type |
//! | [`config`] | `config.toml` loading and validation for the host binary |
//! | [`output`] | CLI summary formatting |
//!
//! # Design Decisions
//!
//! ## Browser Facilities as Traits
//!
//! Everything the browser provides is a trait: the overlay
//! ([`gallery::LightboxView`]), the feed container
//! ([`render::FeedContainer`]), `localStorage` ([`cache::KeyValueStore`]) and
//! `fetch` ([`fetch::FeedSource`]). The behavior on top is plain Rust and is
//! tested without a browser, including the clock: [`loader::FeedLoader::load_at`]
//! takes the current time as an argument.
//!
//! ## Explicit State, Checked Once
//!
//! The lightbox state is a field of the controller, not a set of captured
//! variables, and a page missing the overlay yields
//! [`gallery::Init::Absent`] at construction instead of guards in every
//! handler.
//!
//! ## One Escaping Function
//!
//! Feed text is untrusted. All of it reaches HTML through
//! [`render::escape_html`], which is small enough to audit at a glance.
//!
//! ## Failures Stay Local
//!
//! The cache can only speed a load up: a corrupt entry or a rejected write
//! is logged and treated as no cache. A failed fetch or parse shows a static
//! message linking to the feed's home page and leaves the cache alone.

pub mod cache;
pub mod config;
pub mod fetch;
pub mod gallery;
pub mod loader;
pub mod output;
pub mod render;
pub mod rss;
pub mod types;
