//! HTML fragments for the feed container.
//!
//! Fragments are built with [maud](https://maud.lambda.xyz/), but every
//! interpolated value goes through [`Text`], whose [`Render`] impl calls
//! [`escape_html`]. Feed content is third-party text and the escaping rule
//! lives in one small function that is tested on its own.

use crate::types::FeedPost;
use maud::{Markup, Render, html};

/// Escape the five markup-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Untrusted text, escaped with [`escape_html`] when rendered.
#[derive(Debug, Clone, Copy)]
pub struct Text<'a>(pub &'a str);

impl Render for Text<'_> {
    fn render_to(&self, buffer: &mut String) {
        buffer.push_str(&escape_html(self.0));
    }
}

/// Where the empty and fallback messages send visitors.
#[derive(Debug, Clone, Copy)]
pub struct HomeLink<'a> {
    pub url: &'a str,
    pub label: &'a str,
}

fn home_anchor(home: HomeLink<'_>) -> Markup {
    html! {
        a href=(Text(home.url)) target="_blank" rel="noopener" { (Text(home.label)) }
    }
}

/// One card per post, or the "no posts yet" message for an empty list.
pub fn render_posts(posts: &[FeedPost], home: HomeLink<'_>) -> Markup {
    if posts.is_empty() {
        return html! {
            p class="feed-message" {
                "No posts yet. Check out " (home_anchor(home)) "."
            }
        };
    }
    html! {
        @for post in posts {
            a href=(Text(&post.link)) target="_blank" rel="noopener" class="article-card" {
                h3 { (Text(&post.title)) }
                p class="date" { (Text(&post.date)) }
                p class="excerpt" { (Text(&post.excerpt)) }
            }
        }
    }
}

/// Shown when the feed could not be fetched or parsed.
pub fn render_fallback(home: HomeLink<'_>) -> Markup {
    html! {
        p class="feed-message" {
            "Unable to load posts. Visit " (home_anchor(home)) " directly."
        }
    }
}

/// The element whose contents the loader replaces.
pub trait FeedContainer {
    fn replace_html(&mut self, html: &str);
}

impl FeedContainer for String {
    fn replace_html(&mut self, html: &str) {
        self.clear();
        self.push_str(html);
    }
}
