//! RSS parsing and post normalization.
//!
//! Turns a raw RSS document into [`FeedPost`]s:
//!
//! - every `<item>` in document order, at any depth;
//! - from each item the first `title`, `link`, `pubDate` and `description`
//!   descendants (matched by local name, so `atom:link` counts as `link`);
//!   their text is taken verbatim with CDATA kept and XML entities decoded
//!   (only the five predefined ones and character references, anything else
//!   is a parse error);
//! - `pubDate` becomes a long US-English date, see [`format_date`];
//! - `description` is HTML, reduced to a plain-text [`make_excerpt`].
//!
//! A malformed document is a [`FeedError::Parse`]. A well-formed document
//! with no items is a valid, empty feed.

use crate::types::{FeedError, FeedPost};
use chrono::DateTime;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Appended to excerpts that were cut.
pub const ELLIPSIS: &str = "...";

/// Parse an RSS document into posts, excerpts capped at `excerpt_chars`.
pub fn parse_feed(xml: &str, excerpt_chars: usize) -> Result<Vec<FeedPost>, FeedError> {
    let items = parse_items(xml)?;
    Ok(items
        .into_iter()
        .map(|item| item.into_post(excerpt_chars))
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    PubDate,
    Description,
}

impl Field {
    fn from_name(local_name: &[u8]) -> Option<Self> {
        match local_name {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"pubDate" => Some(Field::PubDate),
            b"description" => Some(Field::Description),
            _ => None,
        }
    }
}

/// Text of one `<item>`, before normalization.
#[derive(Debug, Default)]
struct RawItem {
    title: Option<String>,
    link: Option<String>,
    pub_date: Option<String>,
    description: Option<String>,
}

impl RawItem {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::PubDate => &mut self.pub_date,
            Field::Description => &mut self.description,
        }
    }

    /// First occurrence wins.
    fn set(&mut self, field: Field, text: String) {
        let slot = self.slot(field);
        if slot.is_none() {
            *slot = Some(text);
        }
    }

    fn has(&mut self, field: Field) -> bool {
        self.slot(field).is_some()
    }

    fn into_post(self, excerpt_chars: usize) -> FeedPost {
        FeedPost {
            title: self.title.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
            date: format_date(self.pub_date.as_deref().unwrap_or_default()),
            excerpt: make_excerpt(self.description.as_deref().unwrap_or_default(), excerpt_chars),
        }
    }
}

fn parse_items(xml: &str) -> Result<Vec<RawItem>, FeedError> {
    let mut reader = Reader::from_str(xml);
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut saw_element = false;
    // (depth of the open <item>, its fields so far)
    let mut current: Option<(usize, RawItem)> = None;
    // (depth of the open field element, which field, accumulated text)
    let mut capture: Option<(usize, Field, String)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| FeedError::Parse(e.to_string()))?;
        match event {
            Event::Start(e) => {
                depth += 1;
                saw_element = true;
                if capture.is_some() {
                    continue;
                }
                let name = e.local_name();
                if let Some((_, item)) = current.as_mut() {
                    if let Some(field) = Field::from_name(name.as_ref())
                        && !item.has(field)
                    {
                        capture = Some((depth, field, String::new()));
                    }
                } else if name.as_ref() == b"item" {
                    current = Some((depth, RawItem::default()));
                }
            }
            Event::Empty(e) => {
                saw_element = true;
                if capture.is_some() {
                    continue;
                }
                let name = e.local_name();
                if let Some((_, item)) = current.as_mut() {
                    if let Some(field) = Field::from_name(name.as_ref()) {
                        item.set(field, String::new());
                    }
                } else if name.as_ref() == b"item" {
                    items.push(RawItem::default());
                }
            }
            Event::Text(t) => {
                if let Some((_, _, text)) = capture.as_mut() {
                    let unescaped = t.unescape().map_err(|e| FeedError::Parse(e.to_string()))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(c) => {
                if let Some((_, _, text)) = capture.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                if matches!(&capture, Some((d, _, _)) if *d == depth) {
                    if let (Some((_, field, text)), Some((_, item))) =
                        (capture.take(), current.as_mut())
                    {
                        item.set(field, text);
                    }
                } else if matches!(&current, Some((d, _)) if *d == depth)
                    && let Some((_, item)) = current.take()
                {
                    items.push(item);
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_element {
        return Err(FeedError::Parse("document contains no elements".into()));
    }
    if depth != 0 {
        return Err(FeedError::Parse(format!(
            "document ended with {depth} unclosed element(s)"
        )));
    }
    Ok(items)
}

/// Format a feed date as e.g. "January 5, 2024".
///
/// Accepts RFC 2822 (RSS `pubDate`) and RFC 3339. The calendar date is the
/// one in the timestamp's own offset. Anything else is returned unchanged.
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    DateTime::parse_from_rfc2822(trimmed)
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed))
        .map(|dt| dt.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Plain-text excerpt of an HTML description.
///
/// Markup is stripped and the result trimmed. Longer than `max_chars`
/// characters means: keep the first `max_chars`, trim the cut end, append
/// [`ELLIPSIS`].
pub fn make_excerpt(description: &str, max_chars: usize) -> String {
    let plain = strip_markup(description);
    let plain = plain.trim();
    match plain.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", plain[..cut].trim_end()),
        None => plain.to_string(),
    }
}

/// Reduce an HTML fragment to its text content.
///
/// Tags and comments are dropped, `<script>`/`<style>` bodies with them.
/// A `<` that cannot start a tag (`a < b`) is kept as text. Entities are
/// decoded after stripping, so `&lt;b&gt;` survives as the text `<b>`.
pub fn strip_markup(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let tail = &rest[open..];

        if tail.starts_with("<!--") {
            rest = tail.find("-->").map_or("", |end| &tail[end + 3..]);
            continue;
        }
        let starts_tag = tail[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
        if !starts_tag {
            text.push('<');
            rest = &tail[1..];
            continue;
        }
        let Some(close) = tail.find('>') else {
            rest = "";
            break;
        };
        let inner = &tail[1..close];
        rest = &tail[close + 1..];

        if !inner.starts_with('/') {
            let name = tag_name(inner);
            if name == "script" || name == "style" {
                rest = skip_past_end_tag(rest, &name);
            }
        }
    }
    text.push_str(rest);
    decode_entities(&text)
}

fn tag_name(inner: &str) -> String {
    inner
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn skip_past_end_tag<'a>(rest: &'a str, name: &str) -> &'a str {
    let needle = format!("</{name}");
    // ASCII lowercasing keeps byte offsets intact.
    let Some(start) = rest.to_ascii_lowercase().find(&needle) else {
        return "";
    };
    let after = &rest[start..];
    after.find('>').map_or("", |end| &after[end + 1..])
}

/// Decode HTML character references. Unknown or malformed ones are left as-is.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|ch| (ch, end)));
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse().ok()?,
        };
        return char::from_u32(code);
    }
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "copy" => '\u{a9}',
        _ => return None,
    };
    Some(ch)
}
