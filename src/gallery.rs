//! Gallery lightbox controller.
//!
//! A page carries a fixed, ordered row of thumbnails and one overlay element
//! holding a single `<img>`. Clicking a thumbnail opens the overlay on that
//! thumbnail's full-size image; arrow keys step through the row with
//! wraparound; Escape, the close control, or a click on the overlay
//! background closes it.
//!
//! # Design
//!
//! All mutable state lives in one [`LightboxState`] owned by a [`Lightbox`]
//! built once at page load. The page surface is abstracted behind
//! [`LightboxView`], so the controller never touches the DOM directly and
//! every transition can be asserted in tests against a recording view.
//!
//! Missing overlay elements are handled exactly once, in [`Lightbox::init`]:
//! it returns [`Init::Absent`] and the host simply binds no listeners.
//!
//! ## Locating the displayed image
//!
//! Navigation is relative to whichever thumbnail's resolved source equals
//! the displayed source. There is no stored index, so the overlay cannot
//! drift out of sync with the row. When several thumbnails share a source
//! the [`DuplicateMatch`] policy picks one; the default (`Last`) matches the
//! published site.

use crate::config::DuplicateMatch;

/// Raw view of one thumbnail element as read from the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Thumbnail {
    /// Explicit full-resolution override (`data-src`).
    pub data_src: Option<String>,
    /// The thumbnail's inner image, if any.
    pub image: Option<ThumbnailImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailImage {
    pub src: String,
    pub alt: String,
}

impl Thumbnail {
    /// Thumbnail whose inner image is also the full-size image.
    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            data_src: None,
            image: Some(ThumbnailImage {
                src: src.into(),
                alt: alt.into(),
            }),
        }
    }

    /// Attach a full-resolution override.
    pub fn with_data_src(mut self, src: impl Into<String>) -> Self {
        self.data_src = Some(src.into());
        self
    }
}

/// A thumbnail resolved to what the lightbox displays for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryItem {
    /// Override if non-empty, else the inner image source, else empty.
    pub full_src: String,
    pub alt_text: String,
}

impl GalleryItem {
    pub fn resolve(thumb: &Thumbnail) -> Self {
        let image_src = thumb.image.as_ref().map(|img| img.src.as_str());
        let full_src = thumb
            .data_src
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(image_src)
            .unwrap_or_default()
            .to_string();
        let alt_text = thumb
            .image
            .as_ref()
            .map(|img| img.alt.clone())
            .unwrap_or_default();
        Self { full_src, alt_text }
    }
}

/// Open/closed flag plus what the overlay currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightboxState {
    pub is_open: bool,
    pub current_src: String,
    pub current_alt: String,
}

/// The overlay surface the controller drives.
pub trait LightboxView {
    fn show_image(&mut self, src: &str, alt: &str);
    /// Blank the image so a stale picture never flashes on the next open.
    fn clear_image(&mut self);
    /// Toggle the overlay's visible state class.
    fn set_active(&mut self, active: bool);
    /// Lock or restore page scrolling behind the overlay.
    fn set_scroll_locked(&mut self, locked: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Keys the lightbox reacts to. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Escape" => Key::Escape,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            _ => Key::Other,
        }
    }
}

/// Element a click on the overlay landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Background,
    Image,
}

/// User input routed to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ItemClicked(usize),
    CloseClicked,
    OverlayClicked(ClickTarget),
    KeyDown(Key),
}

/// Result of wiring the controller to the page.
#[derive(Debug)]
pub enum Init<V> {
    Ready(Lightbox<V>),
    /// Overlay or its image element is missing; nothing to bind.
    Absent,
}

/// The lightbox controller.
#[derive(Debug)]
pub struct Lightbox<V> {
    view: V,
    items: Vec<GalleryItem>,
    state: LightboxState,
    policy: DuplicateMatch,
}

impl<V: LightboxView> Lightbox<V> {
    /// Build the controller once at page load.
    pub fn init(view: Option<V>, thumbnails: &[Thumbnail], policy: DuplicateMatch) -> Init<V> {
        let Some(view) = view else {
            tracing::debug!("lightbox overlay absent, gallery not bound");
            return Init::Absent;
        };
        let items: Vec<GalleryItem> = thumbnails.iter().map(GalleryItem::resolve).collect();
        tracing::debug!(items = items.len(), "lightbox ready");
        Init::Ready(Self {
            view,
            items,
            state: LightboxState::default(),
            policy,
        })
    }

    pub fn state(&self) -> &LightboxState {
        &self.state
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn open(&mut self, src: &str, alt: &str) {
        self.state.is_open = true;
        self.state.current_src = src.to_string();
        self.state.current_alt = alt.to_string();
        self.view.show_image(src, alt);
        self.view.set_active(true);
        self.view.set_scroll_locked(true);
    }

    pub fn close(&mut self) {
        self.state.is_open = false;
        self.state.current_src.clear();
        self.state.current_alt.clear();
        self.view.set_active(false);
        self.view.set_scroll_locked(false);
        self.view.clear_image();
    }

    /// Step to the neighbouring thumbnail, wrapping at both ends.
    pub fn navigate(&mut self, direction: Direction) {
        if !self.state.is_open || self.items.is_empty() {
            return;
        }
        let Some(index) = self.position_of(&self.state.current_src) else {
            return;
        };
        let len = self.items.len();
        let target = match direction {
            Direction::Next => (index + 1) % len,
            Direction::Previous => (index + len - 1) % len,
        };
        let item = &self.items[target];
        if item.full_src.is_empty() {
            return;
        }
        self.state.current_src = item.full_src.clone();
        self.state.current_alt = item.alt_text.clone();
        self.view.show_image(&item.full_src, &item.alt_text);
    }

    pub fn handle(&mut self, event: Event) {
        match event {
            Event::ItemClicked(index) => {
                let Some(item) = self.items.get(index) else {
                    return;
                };
                if item.full_src.is_empty() {
                    return;
                }
                let (src, alt) = (item.full_src.clone(), item.alt_text.clone());
                self.open(&src, &alt);
            }
            Event::CloseClicked => self.close(),
            Event::OverlayClicked(ClickTarget::Background) => self.close(),
            Event::OverlayClicked(ClickTarget::Image) => {}
            Event::KeyDown(key) => {
                if !self.state.is_open {
                    return;
                }
                match key {
                    Key::Escape => self.close(),
                    Key::ArrowRight => self.navigate(Direction::Next),
                    Key::ArrowLeft => self.navigate(Direction::Previous),
                    Key::Other => {}
                }
            }
        }
    }

    fn position_of(&self, src: &str) -> Option<usize> {
        let mut matches = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.full_src == src)
            .map(|(i, _)| i);
        match self.policy {
            DuplicateMatch::First => matches.next(),
            DuplicateMatch::Last => matches.last(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records what the page would look like.
    #[derive(Debug, Default)]
    struct FakeOverlay {
        src: String,
        alt: String,
        active: bool,
        scroll_locked: bool,
        shows: usize,
    }

    impl LightboxView for FakeOverlay {
        fn show_image(&mut self, src: &str, alt: &str) {
            self.src = src.to_string();
            self.alt = alt.to_string();
            self.shows += 1;
        }
        fn clear_image(&mut self) {
            self.src.clear();
            self.alt.clear();
        }
        fn set_active(&mut self, active: bool) {
            self.active = active;
        }
        fn set_scroll_locked(&mut self, locked: bool) {
            self.scroll_locked = locked;
        }
    }

    fn thumbs(srcs: &[&str]) -> Vec<Thumbnail> {
        srcs.iter()
            .map(|s| Thumbnail::image(*s, format!("alt {s}")))
            .collect()
    }

    fn lightbox(srcs: &[&str]) -> Lightbox<FakeOverlay> {
        lightbox_with(srcs, DuplicateMatch::Last)
    }

    fn lightbox_with(srcs: &[&str], policy: DuplicateMatch) -> Lightbox<FakeOverlay> {
        match Lightbox::init(Some(FakeOverlay::default()), &thumbs(srcs), policy) {
            Init::Ready(lb) => lb,
            Init::Absent => panic!("overlay was provided"),
        }
    }

    fn press(lb: &mut Lightbox<FakeOverlay>, key: &str) {
        lb.handle(Event::KeyDown(Key::from_dom_key(key)));
    }

    // =========================================================================
    // Item resolution
    // =========================================================================

    #[test]
    fn resolve_prefers_data_src() {
        let item = GalleryItem::resolve(&Thumbnail::image("thumb.jpg", "Dawn").with_data_src("full.jpg"));
        assert_eq!(item.full_src, "full.jpg");
        assert_eq!(item.alt_text, "Dawn");
    }

    #[test]
    fn resolve_empty_data_src_falls_back_to_image() {
        let item = GalleryItem::resolve(&Thumbnail::image("thumb.jpg", "").with_data_src(""));
        assert_eq!(item.full_src, "thumb.jpg");
    }

    #[test]
    fn resolve_without_image() {
        let item = GalleryItem::resolve(&Thumbnail {
            data_src: Some("full.jpg".into()),
            image: None,
        });
        assert_eq!(item.full_src, "full.jpg");
        assert_eq!(item.alt_text, "");

        let empty = GalleryItem::resolve(&Thumbnail::default());
        assert_eq!(empty, GalleryItem::default());
    }

    // =========================================================================
    // Init
    // =========================================================================

    #[test]
    fn init_without_overlay_is_absent() {
        let init = Lightbox::<FakeOverlay>::init(None, &thumbs(&["a"]), DuplicateMatch::Last);
        assert!(matches!(init, Init::Absent));
    }

    #[test]
    fn init_keeps_positions_of_sourceless_thumbnails() {
        let mut t = thumbs(&["a", "b"]);
        t.insert(1, Thumbnail::default());
        let lb = match Lightbox::init(Some(FakeOverlay::default()), &t, DuplicateMatch::Last) {
            Init::Ready(lb) => lb,
            Init::Absent => unreachable!(),
        };
        assert_eq!(lb.items().len(), 3);
        assert_eq!(lb.items()[1].full_src, "");
    }

    // =========================================================================
    // Open / close
    // =========================================================================

    #[test]
    fn click_opens_with_item_source() {
        let mut lb = lightbox(&["a.jpg", "b.jpg"]);
        lb.handle(Event::ItemClicked(1));
        assert!(lb.state().is_open);
        assert_eq!(lb.state().current_src, "b.jpg");
        assert_eq!(lb.view().src, "b.jpg");
        assert_eq!(lb.view().alt, "alt b.jpg");
        assert!(lb.view().active);
        assert!(lb.view().scroll_locked);
    }

    #[test]
    fn click_on_sourceless_item_does_nothing() {
        let mut t = thumbs(&["a.jpg"]);
        t.push(Thumbnail::default());
        let mut lb = match Lightbox::init(Some(FakeOverlay::default()), &t, DuplicateMatch::Last) {
            Init::Ready(lb) => lb,
            Init::Absent => unreachable!(),
        };
        lb.handle(Event::ItemClicked(1));
        lb.handle(Event::ItemClicked(7));
        assert!(!lb.state().is_open);
        assert_eq!(lb.view().shows, 0);
    }

    #[test]
    fn close_clears_source_from_any_state() {
        let mut lb = lightbox(&["a.jpg", "b.jpg"]);
        lb.close();
        assert_eq!(lb.view().src, "");

        lb.handle(Event::ItemClicked(0));
        press(&mut lb, "ArrowRight");
        lb.close();
        assert!(!lb.state().is_open);
        assert_eq!(lb.state().current_src, "");
        assert_eq!(lb.view().src, "");
        assert!(!lb.view().active);
        assert!(!lb.view().scroll_locked);
    }

    #[test]
    fn close_is_idempotent() {
        let mut lb = lightbox(&["a.jpg"]);
        lb.handle(Event::ItemClicked(0));
        lb.handle(Event::CloseClicked);
        lb.handle(Event::CloseClicked);
        assert_eq!(lb.state(), &LightboxState::default());
    }

    #[test]
    fn background_click_closes_image_click_does_not() {
        let mut lb = lightbox(&["a.jpg"]);
        lb.handle(Event::ItemClicked(0));
        lb.handle(Event::OverlayClicked(ClickTarget::Image));
        assert!(lb.state().is_open);
        lb.handle(Event::OverlayClicked(ClickTarget::Background));
        assert!(!lb.state().is_open);
    }

    #[test]
    fn escape_closes_when_open() {
        let mut lb = lightbox(&["a.jpg"]);
        lb.handle(Event::ItemClicked(0));
        press(&mut lb, "Escape");
        assert!(!lb.state().is_open);
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    #[test]
    fn arrows_wrap_around_three_items() {
        let mut lb = lightbox(&["A", "B", "C"]);
        lb.handle(Event::ItemClicked(1));

        press(&mut lb, "ArrowRight");
        assert_eq!(lb.view().src, "C");
        press(&mut lb, "ArrowRight");
        assert_eq!(lb.view().src, "A");
        press(&mut lb, "ArrowLeft");
        assert_eq!(lb.view().src, "C");
        assert_eq!(lb.view().alt, "alt C");
        assert_eq!(lb.state().current_src, "C");
    }

    #[test]
    fn next_n_times_returns_to_start() {
        for n in 1..=6 {
            let srcs: Vec<String> = (0..n).map(|i| format!("img{i}.jpg")).collect();
            let refs: Vec<&str> = srcs.iter().map(String::as_str).collect();
            for start in 0..n {
                let mut lb = lightbox(&refs);
                lb.handle(Event::ItemClicked(start));
                for _ in 0..n {
                    lb.navigate(Direction::Next);
                }
                assert_eq!(lb.state().current_src, srcs[start], "n={n} start={start}");
                for _ in 0..n {
                    lb.navigate(Direction::Previous);
                }
                assert_eq!(lb.state().current_src, srcs[start], "n={n} start={start}");
            }
        }
    }

    #[test]
    fn keys_ignored_while_closed() {
        let mut lb = lightbox(&["A", "B"]);
        for key in ["ArrowRight", "ArrowLeft", "Escape", "Enter"] {
            press(&mut lb, key);
        }
        lb.navigate(Direction::Next);
        assert_eq!(lb.state(), &LightboxState::default());
        assert_eq!(lb.view().shows, 0);
        assert!(!lb.view().active);
    }

    #[test]
    fn other_keys_ignored_while_open() {
        let mut lb = lightbox(&["A", "B"]);
        lb.handle(Event::ItemClicked(0));
        press(&mut lb, "ArrowUp");
        assert_eq!(lb.view().src, "A");
        assert!(lb.state().is_open);
    }

    #[test]
    fn navigate_without_match_is_noop() {
        let mut lb = lightbox(&["A", "B"]);
        lb.open("elsewhere.jpg", "");
        press(&mut lb, "ArrowRight");
        assert_eq!(lb.view().src, "elsewhere.jpg");
    }

    #[test]
    fn navigate_with_no_items_is_noop() {
        let mut lb = lightbox(&[]);
        lb.open("x.jpg", "");
        lb.navigate(Direction::Next);
        assert_eq!(lb.state().current_src, "x.jpg");
    }

    #[test]
    fn navigate_onto_sourceless_item_stays_put() {
        let mut t = thumbs(&["A"]);
        t.push(Thumbnail::default());
        let mut lb = match Lightbox::init(Some(FakeOverlay::default()), &t, DuplicateMatch::Last) {
            Init::Ready(lb) => lb,
            Init::Absent => unreachable!(),
        };
        lb.handle(Event::ItemClicked(0));
        press(&mut lb, "ArrowRight");
        assert_eq!(lb.state().current_src, "A");
    }

    #[test]
    fn duplicate_sources_use_last_match_by_default() {
        // A at 0 and 2; Next continues from the last A (index 2) to C.
        let mut lb = lightbox(&["A", "B", "A", "C"]);
        lb.handle(Event::ItemClicked(0));
        press(&mut lb, "ArrowRight");
        assert_eq!(lb.state().current_src, "C");
    }

    #[test]
    fn duplicate_sources_first_match_policy() {
        let mut lb = lightbox_with(&["A", "B", "A", "C"], DuplicateMatch::First);
        lb.handle(Event::ItemClicked(2));
        press(&mut lb, "ArrowRight");
        assert_eq!(lb.state().current_src, "B");
    }

    #[test]
    fn single_item_navigates_to_itself() {
        let mut lb = lightbox(&["only.jpg"]);
        lb.handle(Event::ItemClicked(0));
        press(&mut lb, "ArrowLeft");
        assert_eq!(lb.view().src, "only.jpg");
        assert_eq!(lb.view().shows, 2);
    }
}
