//! Slide carousel controller.
//!
//! One parameterized component drives both sliders on the site: patient
//! testimonials and the practice tour. The slide type only decides how a
//! slide is read from and written to markup ([`Slide`]); everything else
//! (index state, navigation, input adapters, autoplay, rendering) is shared.
//!
//! ## Markup Contract
//!
//! ```text
//! #<root-id>                      role=region, aria-roledescription=carousel
//! ├── .carousel-track
//! │   ├── .carousel-slide         one per slide, type-specific content
//! │   └── ...
//! ├── button.carousel-prev
//! ├── button.carousel-next
//! ├── .carousel-dots              regenerated from the slide collection
//! ├── button.carousel-toggle      optional play/pause control
//! └── .carousel-live              live region (created if absent)
//! ```
//!
//! ## Navigation Policy
//!
//! Navigation always wraps: `next` from the last slide goes to the first and
//! `previous` from the first goes to the last, whichever input triggered
//! it. Because no slide is ever a dead end, the forward/back buttons are
//! never disabled, except when the collection has a single slide and
//! there is nowhere to go.
//!
//! ## Transitions
//!
//! Every navigation starts a transition. While it runs, further navigation
//! is dropped (not queued). The transition ends on the first of:
//! a `TransitionEnd` event from inside the track, or the fixed
//! `transition_ms` fallback delay.
//!
//! ## Autoplay
//!
//! Autoplay is the user's intent ([`Carousel::play`] / [`Carousel::pause`])
//! combined with a set of [`Hold`]s: pointer hover, hidden page, touch in
//! progress. The single interval slot runs iff autoplay is wanted and no hold
//! is active. Releasing the last hold restarts a full interval.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::config::CarouselConfig;
use crate::content::{Testimonial, TourSlide};
use crate::dom::{Document, ElementBuilder, NodeId};
use crate::events::{Event, Key, Propagation};
use crate::mount::{MountError, require_class, require_id};
use crate::timer::{Clock, Interval, Timeout};

/// Root id of the testimonials slider.
pub const TESTIMONIALS_ROOT: &str = "testimonials-slider";
/// Root id of the practice tour slider.
pub const TOUR_ROOT: &str = "tour-slider";

/// Content that can live in a carousel.
pub trait Slide: Sized {
    /// Read a slide back from its element. `None` skips the element.
    fn from_node(doc: &Document, node: NodeId) -> Option<Self>;

    /// Create the slide element under `track`. The returned element must
    /// carry the `carousel-slide` class.
    fn build(&self, doc: &mut Document, track: NodeId) -> NodeId;

    /// Short text read out by the live region.
    fn summary(&self) -> String;
}

impl Slide for Testimonial {
    fn from_node(doc: &Document, node: NodeId) -> Option<Self> {
        let author = doc.first_by_class(node, "testimonial-author")?;
        let text = doc.first_by_class(node, "testimonial-text")?;
        let rating = doc
            .data(node, "rating")
            .and_then(|r| r.parse().ok())
            .unwrap_or(5);
        Some(Testimonial {
            author: doc.text(author).trim().to_string(),
            text: doc.text(text).trim().to_string(),
            rating,
            treatment: doc.data(node, "treatment").map(str::to_string),
        })
    }

    fn build(&self, doc: &mut Document, track: NodeId) -> NodeId {
        let mut slide = ElementBuilder::new(doc, track, "div")
            .class("carousel-slide")
            .class("testimonial-slide")
            .data("rating", self.rating.to_string());
        if let Some(treatment) = &self.treatment {
            slide = slide.data("treatment", treatment.clone());
        }
        let slide = slide.finish();
        ElementBuilder::new(doc, slide, "span")
            .class("testimonial-rating")
            .attr("aria-label", format!("{} out of 5 stars", self.rating))
            .text(stars(self.rating))
            .finish();
        ElementBuilder::new(doc, slide, "blockquote")
            .class("testimonial-text")
            .text(self.text.clone())
            .finish();
        ElementBuilder::new(doc, slide, "cite")
            .class("testimonial-author")
            .text(self.author.clone())
            .finish();
        slide
    }

    fn summary(&self) -> String {
        format!("{}, {} out of 5 stars", self.author, self.rating)
    }
}

impl Slide for TourSlide {
    fn from_node(doc: &Document, node: NodeId) -> Option<Self> {
        let img = doc
            .descendants(node)
            .into_iter()
            .find(|n| doc.tag(*n) == "img")?;
        let label = match doc.data(node, "label") {
            Some(label) => label.to_string(),
            None => doc
                .first_by_class(node, "tour-label")
                .map(|n| doc.text(n).trim().to_string())?,
        };
        Some(TourSlide {
            label,
            image: doc.attr(img, "src").unwrap_or_default().to_string(),
            alt: doc.attr(img, "alt").unwrap_or_default().to_string(),
        })
    }

    fn build(&self, doc: &mut Document, track: NodeId) -> NodeId {
        let slide = ElementBuilder::new(doc, track, "figure")
            .class("carousel-slide")
            .class("tour-slide")
            .data("label", self.label.clone())
            .finish();
        ElementBuilder::new(doc, slide, "img")
            .attr("src", self.image.clone())
            .attr("alt", self.alt.clone())
            .attr("loading", "lazy")
            .finish();
        ElementBuilder::new(doc, slide, "figcaption")
            .class("tour-label")
            .text(self.label.clone())
            .finish();
        slide
    }

    fn summary(&self) -> String {
        self.label.clone()
    }
}

/// Render a 1-5 rating as filled and empty stars.
pub fn stars(rating: u8) -> String {
    let filled = rating.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Reasons autoplay is temporarily held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Hold {
    Hover,
    Hidden,
    Touch,
}

#[derive(Debug)]
struct SlideEntry<S> {
    node: NodeId,
    content: S,
}

#[derive(Debug, Clone, Copy)]
struct Anchors {
    root: NodeId,
    track: NodeId,
    prev: NodeId,
    next: NodeId,
    dots: NodeId,
    live: NodeId,
    toggle: Option<NodeId>,
}

/// A mounted carousel.
#[derive(Debug)]
pub struct Carousel<S> {
    anchors: Anchors,
    slides: Vec<SlideEntry<S>>,
    dot_nodes: Vec<NodeId>,
    current: usize,
    transition: Timeout,
    transition_ms: u64,
    autoplay: Interval,
    autoplay_wanted: bool,
    holds: BTreeSet<Hold>,
    pause_on_hover: bool,
    swipe_threshold_px: f64,
    touch_start_x: Option<f64>,
    clock: Clock,
}

pub type TestimonialCarousel = Carousel<Testimonial>;
pub type TourCarousel = Carousel<TourSlide>;

impl<S: Slide> Carousel<S> {
    /// Bind to the carousel rooted at `#root_id`.
    ///
    /// Fails when any required anchor is missing or no slide could be read.
    /// The slide marked `active` in the markup (if any) becomes current.
    pub fn mount(
        doc: &mut Document,
        root_id: &str,
        config: &CarouselConfig,
        clock: Clock,
    ) -> Result<Self, MountError> {
        let root = require_id(doc, root_id)?;
        let track = require_class(doc, root, "carousel-track")?;
        let prev = require_class(doc, root, "carousel-prev")?;
        let next = require_class(doc, root, "carousel-next")?;
        let dots = require_class(doc, root, "carousel-dots")?;
        let toggle = doc.first_by_class(root, "carousel-toggle");
        let live = match doc.first_by_class(root, "carousel-live") {
            Some(live) => live,
            None => ElementBuilder::new(doc, root, "div")
                .class("carousel-live")
                .class("sr-only")
                .finish(),
        };

        let mut slides = Vec::new();
        let mut current = 0;
        for node in doc.query_class(track, "carousel-slide") {
            match S::from_node(doc, node) {
                Some(content) => {
                    if doc.has_class(node, "active") {
                        current = slides.len();
                    }
                    slides.push(SlideEntry { node, content });
                }
                None => {
                    debug!(root_id, "hiding unreadable slide");
                    doc.remove_class(node, "active");
                    doc.set_flag(node, "aria-hidden", true);
                }
            }
        }
        if slides.is_empty() {
            return Err(MountError::Empty(format!("#{root_id}")));
        }

        doc.set_attr(root, "role", "region");
        doc.set_attr(root, "aria-roledescription", "carousel");
        doc.set_attr(root, "tabindex", "0");
        doc.set_attr(dots, "role", "tablist");
        doc.set_attr(live, "aria-live", "polite");
        doc.set_attr(live, "aria-atomic", "true");

        let mut carousel = Self {
            anchors: Anchors {
                root,
                track,
                prev,
                next,
                dots,
                live,
                toggle,
            },
            slides,
            dot_nodes: Vec::new(),
            current,
            transition: Timeout::default(),
            transition_ms: config.transition_ms,
            autoplay: Interval::new(config.interval_ms),
            autoplay_wanted: config.autoplay,
            holds: BTreeSet::new(),
            pause_on_hover: config.pause_on_hover,
            swipe_threshold_px: config.swipe_threshold_px,
            touch_start_x: None,
            clock,
        };
        carousel.rebuild_dots(doc);
        carousel.render(doc, None);
        let now = carousel.clock.now_ms();
        carousel.sync_autoplay(doc, now);
        Ok(carousel)
    }

    // ------------------------------------------------------------------
    // Navigation API
    // ------------------------------------------------------------------

    /// Advance one slide, wrapping after the last. Returns whether the
    /// carousel moved.
    pub fn next(&mut self, doc: &mut Document) -> bool {
        let now = self.clock.now_ms();
        self.step_forward(doc, now)
    }

    /// Go back one slide, wrapping before the first.
    pub fn previous(&mut self, doc: &mut Document) -> bool {
        if !self.can_navigate() {
            return false;
        }
        let n = self.slides.len();
        let target = (self.current + n - 1) % n;
        let now = self.clock.now_ms();
        self.show(doc, target, now);
        true
    }

    /// Jump to `index`. Out-of-range, current, or mid-transition requests
    /// are ignored.
    pub fn go_to(&mut self, doc: &mut Document, index: usize) -> bool {
        if index >= self.slides.len() || index == self.current {
            debug!(index, current = self.current, "go_to ignored");
            return false;
        }
        if !self.can_navigate() {
            return false;
        }
        let now = self.clock.now_ms();
        self.show(doc, index, now);
        true
    }

    fn step_forward(&mut self, doc: &mut Document, at: u64) -> bool {
        if !self.can_navigate() {
            return false;
        }
        let target = (self.current + 1) % self.slides.len();
        self.show(doc, target, at);
        true
    }

    fn can_navigate(&self) -> bool {
        if self.transition.is_pending() {
            debug!("navigation dropped: transition in progress");
            return false;
        }
        self.slides.len() > 1
    }

    fn show(&mut self, doc: &mut Document, index: usize, at: u64) {
        self.current = index;
        self.render(doc, Some(at));
    }

    // ------------------------------------------------------------------
    // Playback API
    // ------------------------------------------------------------------

    /// Turn autoplay on. Calling it while already playing changes nothing.
    pub fn play(&mut self, doc: &mut Document) {
        self.autoplay_wanted = true;
        let now = self.clock.now_ms();
        self.sync_autoplay(doc, now);
    }

    /// Turn autoplay off. Calling it while paused changes nothing.
    pub fn pause(&mut self, doc: &mut Document) {
        self.autoplay_wanted = false;
        let now = self.clock.now_ms();
        self.sync_autoplay(doc, now);
    }

    /// Change the autoplay delay. A running timer restarts with the new
    /// delay right away.
    pub fn set_autoplay_interval(&mut self, ms: u64) {
        let now = self.clock.now_ms();
        self.autoplay.set_period(ms, now);
    }

    pub fn autoplay_interval(&self) -> u64 {
        self.autoplay.period()
    }

    /// `true` while an autoplay timer is live.
    pub fn is_playing(&self) -> bool {
        self.autoplay.is_running()
    }

    /// `true` when autoplay is wanted, even if a hold keeps it from ticking.
    pub fn autoplay_enabled(&self) -> bool {
        self.autoplay_wanted
    }

    pub fn hold(&mut self, doc: &mut Document, reason: Hold) {
        self.holds.insert(reason);
        let now = self.clock.now_ms();
        self.sync_autoplay(doc, now);
    }

    pub fn release(&mut self, doc: &mut Document, reason: Hold) {
        self.holds.remove(&reason);
        let now = self.clock.now_ms();
        self.sync_autoplay(doc, now);
    }

    fn sync_autoplay(&mut self, doc: &mut Document, at: u64) {
        let should_run = self.autoplay_wanted && self.holds.is_empty() && self.slides.len() > 1;
        if should_run {
            self.autoplay.start(at);
        } else {
            self.autoplay.stop();
        }
        if let Some(toggle) = self.anchors.toggle {
            doc.set_flag(toggle, "aria-pressed", self.autoplay_wanted);
            doc.set_attr(
                toggle,
                "aria-label",
                if self.autoplay_wanted {
                    "Pause automatic slide show"
                } else {
                    "Start automatic slide show"
                },
            );
        }
    }

    // ------------------------------------------------------------------
    // Collection API
    // ------------------------------------------------------------------

    /// Append a slide. It starts inactive; returns its index.
    pub fn add_slide(&mut self, doc: &mut Document, content: S) -> usize {
        let node = content.build(doc, self.anchors.track);
        self.slides.push(SlideEntry { node, content });
        self.rebuild_dots(doc);
        self.render(doc, None);
        let now = self.clock.now_ms();
        self.sync_autoplay(doc, now);
        self.slides.len() - 1
    }

    /// Remove the slide at `index` and return its content.
    ///
    /// The last remaining slide cannot be removed. If the current slide is
    /// removed, the one that takes its place becomes current (or the new last
    /// slide, when the removed one was last).
    pub fn remove_slide(&mut self, doc: &mut Document, index: usize) -> Option<S> {
        if index >= self.slides.len() || self.slides.len() == 1 {
            return None;
        }
        let entry = self.slides.remove(index);
        doc.remove(entry.node);
        if index < self.current {
            self.current -= 1;
        }
        self.current = self.current.min(self.slides.len() - 1);
        self.rebuild_dots(doc);
        self.render(doc, None);
        let now = self.clock.now_ms();
        self.sync_autoplay(doc, now);
        Some(entry.content)
    }

    // ------------------------------------------------------------------
    // Data access
    // ------------------------------------------------------------------

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_slide(&self) -> &S {
        &self.slides[self.current].content
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slides(&self) -> impl Iterator<Item = &S> {
        self.slides.iter().map(|e| &e.content)
    }

    /// Slides matching `predicate`, in display order.
    pub fn filter_slides(&self, predicate: impl Fn(&S) -> bool) -> Vec<&S> {
        self.slides().filter(|s| predicate(s)).collect()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_pending()
    }

    pub fn root(&self) -> NodeId {
        self.anchors.root
    }

    pub fn slide_node(&self, index: usize) -> Option<NodeId> {
        self.slides.get(index).map(|e| e.node)
    }

    // ------------------------------------------------------------------
    // Render sync
    // ------------------------------------------------------------------

    fn rebuild_dots(&mut self, doc: &mut Document) {
        let container = self.anchors.dots;
        doc.clear_children(container);
        self.dot_nodes = (0..self.slides.len())
            .map(|i| {
                ElementBuilder::new(doc, container, "button")
                    .class("carousel-dot")
                    .attr("type", "button")
                    .attr("role", "tab")
                    .data("index", i.to_string())
                    .attr("aria-label", format!("Go to slide {}", i + 1))
                    .finish()
            })
            .collect();
    }

    /// Apply the index state to the document. `animate_at` starts a
    /// transition at that instant.
    fn render(&mut self, doc: &mut Document, animate_at: Option<u64>) {
        let n = self.slides.len();
        for (i, entry) in self.slides.iter().enumerate() {
            let active = i == self.current;
            doc.toggle_class(entry.node, "active", active);
            doc.set_flag(entry.node, "aria-hidden", !active);
            doc.set_attr(entry.node, "role", "group");
            doc.set_attr(entry.node, "aria-roledescription", "slide");
            doc.set_attr(entry.node, "aria-label", format!("{} of {}", i + 1, n));
        }
        for (i, dot) in self.dot_nodes.iter().enumerate() {
            let active = i == self.current;
            doc.toggle_class(*dot, "active", active);
            doc.set_flag(*dot, "aria-selected", active);
        }

        let stuck = n <= 1;
        for control in [self.anchors.prev, self.anchors.next] {
            doc.set_flag(control, "aria-disabled", stuck);
            if stuck {
                doc.set_attr(control, "disabled", "");
            } else {
                doc.remove_attr(control, "disabled");
            }
        }

        let message = format!(
            "Slide {} of {}: {}",
            self.current + 1,
            n,
            self.current_slide().summary()
        );
        doc.set_text(self.anchors.live, message);

        if let Some(at) = animate_at {
            if self.transition_ms > 0 {
                doc.add_class(self.anchors.root, "transitioning");
                self.transition.start(at, self.transition_ms);
            }
        }
    }

    fn end_transition(&mut self, doc: &mut Document) {
        self.transition.cancel();
        doc.remove_class(self.anchors.root, "transitioning");
    }

    // ------------------------------------------------------------------
    // Input adapters
    // ------------------------------------------------------------------

    pub fn handle_event(&mut self, doc: &mut Document, event: &Event) -> Propagation {
        let root = self.anchors.root;
        match event {
            Event::Click { target } if doc.contains(root, *target) => {
                self.handle_click(doc, *target)
            }
            Event::KeyDown { key, .. } => {
                let focus_inside = doc.focused().is_some_and(|f| doc.contains(root, f));
                if !focus_inside {
                    return Propagation::Ignored;
                }
                match key {
                    Key::ArrowLeft => {
                        self.previous(doc);
                        Propagation::PreventDefault
                    }
                    Key::ArrowRight => {
                        self.next(doc);
                        Propagation::PreventDefault
                    }
                    Key::Home => {
                        self.go_to(doc, 0);
                        Propagation::PreventDefault
                    }
                    Key::End => {
                        let last = self.slides.len() - 1;
                        self.go_to(doc, last);
                        Propagation::PreventDefault
                    }
                    _ => Propagation::Ignored,
                }
            }
            Event::TouchStart { target, x, .. } if doc.contains(root, *target) => {
                self.touch_start_x = Some(*x);
                self.hold(doc, Hold::Touch);
                Propagation::Handled
            }
            Event::TouchEnd { x, .. } => {
                let Some(start) = self.touch_start_x.take() else {
                    return Propagation::Ignored;
                };
                let dx = x - start;
                if dx.abs() > self.swipe_threshold_px {
                    if dx < 0.0 {
                        self.next(doc);
                    } else {
                        self.previous(doc);
                    }
                }
                self.release(doc, Hold::Touch);
                Propagation::Handled
            }
            Event::PointerEnter { target } if *target == root && self.pause_on_hover => {
                doc.add_class(root, "hovered");
                self.hold(doc, Hold::Hover);
                Propagation::Handled
            }
            Event::PointerLeave { target } if *target == root => {
                doc.remove_class(root, "hovered");
                self.release(doc, Hold::Hover);
                Propagation::Handled
            }
            Event::VisibilityChange { hidden } => {
                if *hidden {
                    self.hold(doc, Hold::Hidden);
                } else {
                    self.release(doc, Hold::Hidden);
                }
                Propagation::Handled
            }
            Event::TransitionEnd { target }
                if self.transition.is_pending() && doc.contains(self.anchors.track, *target) =>
            {
                self.end_transition(doc);
                Propagation::Handled
            }
            _ => Propagation::Ignored,
        }
    }

    fn handle_click(&mut self, doc: &mut Document, target: NodeId) -> Propagation {
        if doc.contains(self.anchors.prev, target) {
            self.previous(doc);
            return Propagation::Handled;
        }
        if doc.contains(self.anchors.next, target) {
            self.next(doc);
            return Propagation::Handled;
        }
        if let Some(toggle) = self.anchors.toggle {
            if doc.contains(toggle, target) {
                if self.autoplay_wanted {
                    self.pause(doc);
                } else {
                    self.play(doc);
                }
                return Propagation::Handled;
            }
        }
        let dot_index = doc
            .closest_class(target, "carousel-dot")
            .and_then(|dot| doc.data(dot, "index"))
            .and_then(|i| i.parse::<usize>().ok());
        match dot_index {
            Some(index) => {
                self.go_to(doc, index);
                Propagation::Handled
            }
            None => Propagation::Ignored,
        }
    }

    /// Fire due timers in time order: transition fallbacks and autoplay ticks.
    /// A late tick advances at most one slide; missed autoplay periods are
    /// dropped.
    pub fn tick(&mut self, doc: &mut Document) {
        let now = self.clock.now_ms();
        loop {
            let transition_due = self.transition.due().filter(|d| *d <= now);
            let autoplay_due = self.autoplay.due().filter(|d| *d <= now);
            match (transition_due, autoplay_due) {
                (Some(t), Some(a)) if t <= a => self.end_transition(doc),
                (Some(_), None) => self.end_transition(doc),
                (_, Some(_)) => {
                    if let Some(due) = self.autoplay.fire(now) {
                        debug!(due, late_ms = now - due, "autoplay tick");
                        self.step_forward(doc, now);
                    }
                }
                (None, None) => break,
            }
        }
    }

    /// Tear the controller down: timers are cancelled and transient state
    /// classes removed.
    pub fn destroy(mut self, doc: &mut Document) {
        self.autoplay.stop();
        self.end_transition(doc);
        doc.remove_class(self.anchors.root, "hovered");
    }
}

impl<S: Slide + Serialize> Carousel<S> {
    /// Slide data as pretty JSON, in display order.
    pub fn export_json(&self) -> serde_json::Result<String> {
        let data: Vec<&S> = self.slides().collect();
        serde_json::to_string_pretty(&data)
    }
}

impl Carousel<Testimonial> {
    /// Testimonials rated at least `min_rating` stars.
    pub fn filter_by_rating(&self, min_rating: u8) -> Vec<&Testimonial> {
        self.filter_slides(|t| t.rating >= min_rating)
    }

    /// Testimonials mentioning `treatment`.
    pub fn filter_by_treatment(&self, treatment: &str) -> Vec<&Testimonial> {
        self.filter_slides(|t| t.treatment.as_deref() == Some(treatment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn mounted(count: usize) -> (Document, TestimonialCarousel, Clock) {
        mounted_with(count, CarouselConfig::default())
    }

    fn mounted_with(
        count: usize,
        config: CarouselConfig,
    ) -> (Document, TestimonialCarousel, Clock) {
        let mut doc = Document::new();
        testimonial_slider(&mut doc, &sample_testimonials(count));
        let clock = Clock::manual();
        let carousel =
            Carousel::mount(&mut doc, TESTIMONIALS_ROOT, &config, clock.clone()).unwrap();
        (doc, carousel, clock)
    }

    fn no_autoplay() -> CarouselConfig {
        CarouselConfig {
            autoplay: false,
            ..CarouselConfig::default()
        }
    }

    /// Let the running transition finish.
    fn settle(doc: &mut Document, carousel: &mut TestimonialCarousel, clock: &Clock) {
        clock.advance(300);
        carousel.tick(doc);
    }

    #[test]
    fn mount_reads_slides_and_renders_first() {
        let (doc, carousel, _) = mounted(3);
        assert_eq!(carousel.slide_count(), 3);
        assert_eq!(carousel.current_index(), 0);
        assert_single_active(&doc, carousel.root(), "carousel-slide", 0);
        assert_single_active(&doc, carousel.root(), "carousel-dot", 0);
        assert_eq!(live_text(&doc, carousel.root()), "Slide 1 of 3: Patient 1, 5 out of 5 stars");
    }

    #[test]
    fn mount_fails_without_anchor() {
        let mut doc = Document::new();
        let result = TestimonialCarousel::mount(
            &mut doc,
            TESTIMONIALS_ROOT,
            &CarouselConfig::default(),
            Clock::manual(),
        );
        assert_eq!(
            result.err(),
            Some(MountError::MissingAnchor("#testimonials-slider".into()))
        );
    }

    #[test]
    fn mount_fails_with_no_slides() {
        let mut doc = Document::new();
        testimonial_slider(&mut doc, &[]);
        let result = TestimonialCarousel::mount(
            &mut doc,
            TESTIMONIALS_ROOT,
            &CarouselConfig::default(),
            Clock::manual(),
        );
        assert!(matches!(result, Err(MountError::Empty(_))));
    }

    #[test]
    fn next_n_times_returns_to_start() {
        let (mut doc, mut carousel, clock) = mounted_with(4, no_autoplay());
        carousel.go_to(&mut doc, 2);
        settle(&mut doc, &mut carousel, &clock);
        for _ in 0..4 {
            assert!(carousel.next(&mut doc));
            settle(&mut doc, &mut carousel, &clock);
        }
        assert_eq!(carousel.current_index(), 2);
    }

    #[test]
    fn previous_wraps_to_last() {
        let (mut doc, mut carousel, _) = mounted_with(3, no_autoplay());
        assert!(carousel.previous(&mut doc));
        assert_eq!(carousel.current_index(), 2);
        assert_single_active(&doc, carousel.root(), "carousel-slide", 2);
    }

    #[test]
    fn navigation_dropped_during_transition() {
        let (mut doc, mut carousel, clock) = mounted_with(3, no_autoplay());
        assert!(carousel.next(&mut doc));
        assert!(!carousel.next(&mut doc));
        assert!(!carousel.previous(&mut doc));
        assert!(!carousel.go_to(&mut doc, 2));
        assert_eq!(carousel.current_index(), 1);

        clock.advance(299);
        carousel.tick(&mut doc);
        assert!(carousel.is_transitioning());
        clock.advance(1);
        carousel.tick(&mut doc);
        assert!(!carousel.is_transitioning());
        assert!(carousel.next(&mut doc));
        assert_eq!(carousel.current_index(), 2);
    }

    #[test]
    fn transition_end_event_finishes_early() {
        let (mut doc, mut carousel, _) = mounted_with(3, no_autoplay());
        carousel.next(&mut doc);
        assert!(doc.has_class(carousel.root(), "transitioning"));
        let slide = carousel.slide_node(1).unwrap();

        let outcome = carousel.handle_event(&mut doc, &Event::TransitionEnd { target: slide });
        assert_eq!(outcome, Propagation::Handled);
        assert!(!carousel.is_transitioning());
        assert!(!doc.has_class(carousel.root(), "transitioning"));
        assert!(carousel.next(&mut doc));
    }

    #[test]
    fn go_to_rejects_current_and_out_of_range() {
        let (mut doc, mut carousel, _) = mounted_with(3, no_autoplay());
        assert!(!carousel.go_to(&mut doc, 0));
        assert!(!carousel.go_to(&mut doc, 3));
        assert!(!carousel.go_to(&mut doc, 99));
        assert_eq!(carousel.current_index(), 0);
        assert!(!carousel.is_transitioning());
    }

    #[test]
    fn buttons_never_disabled_when_wrapping() {
        let (mut doc, mut carousel, _) = mounted_with(3, no_autoplay());
        carousel.previous(&mut doc);
        let prev = doc.first_by_class(carousel.root(), "carousel-prev").unwrap();
        let next = doc.first_by_class(carousel.root(), "carousel-next").unwrap();
        assert_eq!(doc.attr(prev, "aria-disabled"), Some("false"));
        assert_eq!(doc.attr(next, "aria-disabled"), Some("false"));
        assert_eq!(doc.attr(next, "disabled"), None);
    }

    #[test]
    fn single_slide_disables_controls() {
        let (doc, carousel, _) = mounted(1);
        let next = doc.first_by_class(carousel.root(), "carousel-next").unwrap();
        assert_eq!(doc.attr(next, "aria-disabled"), Some("true"));
        assert!(doc.attr(next, "disabled").is_some());
        assert!(!carousel.is_playing());
    }

    #[test]
    fn autoplay_advances_once_per_interval() {
        let (mut doc, mut carousel, clock) = mounted(4);
        assert!(carousel.is_playing());

        clock.advance(5000);
        carousel.tick(&mut doc);
        assert_eq!(carousel.current_index(), 1);

        clock.advance(5000);
        carousel.tick(&mut doc);
        assert_eq!(carousel.current_index(), 2);
    }

    #[test]
    fn late_tick_advances_a_single_slide() {
        let (mut doc, mut carousel, clock) = mounted(10);
        clock.advance(20_000);
        carousel.tick(&mut doc);
        assert_eq!(carousel.current_index(), 1);
        assert_eq!(live_text(&doc, carousel.root()), "Slide 2 of 10: Patient 2, 5 out of 5 stars");

        // The next tick is a full interval after the late one.
        clock.advance(4999);
        carousel.tick(&mut doc);
        assert_eq!(carousel.current_index(), 1);
        clock.advance(1);
        carousel.tick(&mut doc);
        assert_eq!(carousel.current_index(), 2);
    }

    #[test]
    fn pause_then_play_keeps_a_single_timer() {
        let (mut doc, mut carousel, clock) = mounted(4);
        carousel.pause(&mut doc);
        carousel.pause(&mut doc);
        assert!(!carousel.is_playing());
        carousel.play(&mut doc);
        carousel.play(&mut doc);
        assert!(carousel.is_playing());

        clock.advance(5000);
        carousel.tick(&mut doc);
        assert_eq!(carousel.current_index(), 1);
    }

    #[test]
    fn paused_carousel_does_not_advance() {
        let (mut doc, mut carousel, clock) = mounted(3);
        carousel.pause(&mut doc);
        clock.advance(20_000);
        carousel.tick(&mut doc);
        assert_eq!(carousel.current_index(), 0);
    }

    #[test]
    fn set_autoplay_interval_applies_immediately() {
        let (mut doc, mut carousel, clock) = mounted(3);
        clock.advance(4000);
        carousel.set_autoplay_interval(2000);

        clock.advance(1999);
        carousel.tick(&mut doc);
        assert_eq!(carousel.current_index(), 0);

        clock.advance(1);
        carousel.tick(&mut doc);
        assert_eq!(carousel.current_index(), 1);
        assert_eq!(carousel.autoplay_interval(), 2000);
    }

    #[test]
    fn hover_holds_and_leave_resumes() {
        let (mut doc, mut carousel, clock) = mounted(3);
        let root = carousel.root();
        carousel.handle_event(&mut doc, &Event::PointerEnter { target: root });
        assert!(!carousel.is_playing());
        assert!(carousel.autoplay_enabled());

        clock.advance(10_000);
        carousel.tick(&mut doc);
        assert_eq!(carousel.current_index(), 0);

        carousel.handle_event(&mut doc, &Event::PointerLeave { target: root });
        assert!(carousel.is_playing());
        clock.advance(5000);
        carousel.tick(&mut doc);
        assert_eq!(carousel.current_index(), 1);
    }

    #[test]
    fn hidden_page_holds_autoplay() {
        let (mut doc, mut carousel, _) = mounted(3);
        carousel.handle_event(&mut doc, &Event::VisibilityChange { hidden: true });
        assert!(!carousel.is_playing());
        carousel.handle_event(&mut doc, &Event::VisibilityChange { hidden: false });
        assert!(carousel.is_playing());
    }

    #[test]
    fn resume_does_not_override_explicit_pause() {
        let (mut doc, mut carousel, _) = mounted(3);
        let root = carousel.root();
        carousel.handle_event(&mut doc, &Event::PointerEnter { target: root });
        carousel.pause(&mut doc);
        carousel.handle_event(&mut doc, &Event::PointerLeave { target: root });
        assert!(!carousel.is_playing());
    }

    #[test]
    fn swipe_left_advances_and_resumes_autoplay() {
        let (mut doc, mut carousel, _) = mounted(3);
        let slide = carousel.slide_node(0).unwrap();

        let start = Event::TouchStart {
            target: slide,
            x: 300.0,
            y: 10.0,
        };
        carousel.handle_event(&mut doc, &start);
        assert!(!carousel.is_playing());
        let end = Event::TouchEnd {
            target: slide,
            x: 200.0,
            y: 12.0,
        };
        carousel.handle_event(&mut doc, &end);

        assert_eq!(carousel.current_index(), 1);
        assert!(carousel.is_playing());
    }

    #[test]
    fn swipe_right_goes_back() {
        let (mut doc, mut carousel, _) = mounted_with(3, no_autoplay());
        let slide = carousel.slide_node(0).unwrap();
        let start = Event::TouchStart {
            target: slide,
            x: 100.0,
            y: 0.0,
        };
        carousel.handle_event(&mut doc, &start);
        let end = Event::TouchEnd {
            target: slide,
            x: 200.0,
            y: 0.0,
        };
        carousel.handle_event(&mut doc, &end);
        assert_eq!(carousel.current_index(), 2);
    }

    #[test]
    fn short_swipe_is_ignored() {
        let (mut doc, mut carousel, _) = mounted_with(3, no_autoplay());
        let slide = carousel.slide_node(0).unwrap();
        let start = Event::TouchStart {
            target: slide,
            x: 100.0,
            y: 0.0,
        };
        carousel.handle_event(&mut doc, &start);
        let end = Event::TouchEnd {
            target: slide,
            x: 150.0,
            y: 0.0,
        };
        carousel.handle_event(&mut doc, &end);
        assert_eq!(carousel.current_index(), 0);
    }

    #[test]
    fn arrow_keys_need_focus_inside() {
        let (mut doc, mut carousel, _) = mounted_with(3, no_autoplay());
        let root = carousel.root();
        let key = Event::KeyDown {
            target: root,
            key: Key::ArrowRight,
        };
        assert_eq!(carousel.handle_event(&mut doc, &key), Propagation::Ignored);
        assert_eq!(carousel.current_index(), 0);

        doc.focus(root);
        assert_eq!(
            carousel.handle_event(&mut doc, &key),
            Propagation::PreventDefault
        );
        assert_eq!(carousel.current_index(), 1);
    }

    #[test]
    fn home_and_end_jump_to_ends() {
        let (mut doc, mut carousel, clock) = mounted_with(5, no_autoplay());
        doc.focus(carousel.root());
        let end = Event::KeyDown {
            target: carousel.root(),
            key: Key::End,
        };
        assert_eq!(carousel.handle_event(&mut doc, &end), Propagation::PreventDefault);
        assert_eq!(carousel.current_index(), 4);

        settle(&mut doc, &mut carousel, &clock);
        let home = Event::KeyDown {
            target: carousel.root(),
            key: Key::Home,
        };
        carousel.handle_event(&mut doc, &home);
        assert_eq!(carousel.current_index(), 0);
        assert_single_active(&doc, carousel.root(), "carousel-slide", 0);
    }

    #[test]
    fn clicks_on_controls_and_dots() {
        let (mut doc, mut carousel, clock) = mounted_with(4, no_autoplay());
        let root = carousel.root();
        let next = doc.first_by_class(root, "carousel-next").unwrap();
        carousel.handle_event(&mut doc, &Event::Click { target: next });
        assert_eq!(carousel.current_index(), 1);
        settle(&mut doc, &mut carousel, &clock);

        let dot = doc.query_class(root, "carousel-dot")[3];
        carousel.handle_event(&mut doc, &Event::Click { target: dot });
        assert_eq!(carousel.current_index(), 3);
        assert_eq!(doc.attr(dot, "aria-selected"), Some("true"));
        settle(&mut doc, &mut carousel, &clock);

        let prev = doc.first_by_class(root, "carousel-prev").unwrap();
        carousel.handle_event(&mut doc, &Event::Click { target: prev });
        assert_eq!(carousel.current_index(), 2);
    }

    #[test]
    fn toggle_button_switches_autoplay() {
        let (mut doc, mut carousel, _) = mounted(3);
        let toggle = doc.first_by_class(carousel.root(), "carousel-toggle").unwrap();
        assert_eq!(doc.attr(toggle, "aria-pressed"), Some("true"));

        carousel.handle_event(&mut doc, &Event::Click { target: toggle });
        assert!(!carousel.autoplay_enabled());
        assert_eq!(doc.attr(toggle, "aria-pressed"), Some("false"));
        assert_eq!(doc.attr(toggle, "aria-label"), Some("Start automatic slide show"));
    }

    #[test]
    fn add_slide_appends_inactive_and_rebuilds_dots() {
        let (mut doc, mut carousel, _) = mounted(2);
        let index = carousel.add_slide(
            &mut doc,
            Testimonial {
                author: "New Patient".into(),
                text: "Wonderful".into(),
                rating: 4,
                treatment: None,
            },
        );
        assert_eq!(index, 2);
        assert_eq!(carousel.slide_count(), 3);
        let node = carousel.slide_node(2).unwrap();
        assert!(!doc.has_class(node, "active"));
        assert_eq!(doc.attr(node, "aria-hidden"), Some("true"));
        assert_eq!(doc.query_class(carousel.root(), "carousel-dot").len(), 3);
        assert!(live_text(&doc, carousel.root()).starts_with("Slide 1 of 3"));
    }

    #[test]
    fn removing_current_last_slide_clamps() {
        let (mut doc, mut carousel, _) = mounted_with(4, no_autoplay());
        carousel.previous(&mut doc);
        assert_eq!(carousel.current_index(), 3);

        let removed = carousel.remove_slide(&mut doc, 3).unwrap();
        assert_eq!(removed.author, "Patient 4");
        assert_eq!(carousel.current_index(), 2);
        assert_eq!(carousel.slide_count(), 3);
        assert_single_active(&doc, carousel.root(), "carousel-slide", 2);
        assert_eq!(doc.query_class(carousel.root(), "carousel-dot").len(), 3);
    }

    #[test]
    fn removing_earlier_slide_keeps_current_content() {
        let (mut doc, mut carousel, clock) = mounted_with(4, no_autoplay());
        carousel.go_to(&mut doc, 2);
        settle(&mut doc, &mut carousel, &clock);
        carousel.remove_slide(&mut doc, 0);
        assert_eq!(carousel.current_index(), 1);
        assert_eq!(carousel.current_slide().author, "Patient 3");
    }

    #[test]
    fn cannot_remove_only_slide() {
        let (mut doc, mut carousel, _) = mounted(1);
        assert!(carousel.remove_slide(&mut doc, 0).is_none());
        assert!(carousel.remove_slide(&mut doc, 5).is_none());
        assert_eq!(carousel.slide_count(), 1);
    }

    #[test]
    fn shrinking_to_one_slide_stops_autoplay() {
        let (mut doc, mut carousel, _) = mounted(2);
        assert!(carousel.is_playing());
        carousel.remove_slide(&mut doc, 1);
        assert!(!carousel.is_playing());
        assert!(carousel.autoplay_enabled());
    }

    #[test]
    fn filter_and_export_testimonials() {
        let (mut doc, mut carousel, _) = mounted(2);
        carousel.add_slide(
            &mut doc,
            Testimonial {
                author: "Critic".into(),
                text: "Fine".into(),
                rating: 3,
                treatment: Some("invisalign".into()),
            },
        );
        assert_eq!(carousel.filter_by_rating(4).len(), 2);
        assert_eq!(carousel.filter_by_treatment("invisalign").len(), 1);

        let json = carousel.export_json().unwrap();
        let parsed: Vec<Testimonial> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2].author, "Critic");
    }

    #[test]
    fn active_markup_slide_becomes_current() {
        let mut doc = Document::new();
        testimonial_slider(&mut doc, &sample_testimonials(3));
        let root = doc.get_element_by_id(TESTIMONIALS_ROOT).unwrap();
        let second = doc.query_class(root, "carousel-slide")[1];
        doc.add_class(second, "active");

        let carousel =
            TestimonialCarousel::mount(&mut doc, TESTIMONIALS_ROOT, &no_autoplay(), Clock::manual())
                .unwrap();
        assert_eq!(carousel.current_index(), 1);
    }

    #[test]
    fn unreadable_active_slide_is_hidden() {
        let mut doc = Document::new();
        let root = testimonial_slider(&mut doc, &sample_testimonials(3));
        let track = doc.first_by_class(root, "carousel-track").unwrap();
        let stray = ElementBuilder::new(&mut doc, track, "div")
            .class("carousel-slide")
            .class("active")
            .text("No author here")
            .finish();

        let carousel =
            TestimonialCarousel::mount(&mut doc, TESTIMONIALS_ROOT, &no_autoplay(), Clock::manual())
                .unwrap();
        assert_eq!(carousel.slide_count(), 3);
        assert!(!doc.has_class(stray, "active"));
        assert_eq!(doc.attr(stray, "aria-hidden"), Some("true"));
        let active = doc
            .query_class(root, "carousel-slide")
            .into_iter()
            .filter(|n| doc.has_class(*n, "active"))
            .count();
        assert_eq!(active, 1);
    }

    #[test]
    fn tour_slides_round_trip_through_markup() {
        let mut doc = Document::new();
        tour_slider(&mut doc, &sample_tour(3));
        let carousel =
            TourCarousel::mount(&mut doc, TOUR_ROOT, &no_autoplay(), Clock::manual()).unwrap();
        assert_eq!(carousel.slide_count(), 3);
        assert_eq!(carousel.current_slide().label, "Room 1");
        assert_eq!(carousel.current_slide().image, "/tour/1.avif");
        assert_eq!(live_text(&doc, carousel.root()), "Slide 1 of 3: Room 1");
    }

    #[test]
    fn destroy_clears_transient_state() {
        let (mut doc, mut carousel, _) = mounted(3);
        let root = carousel.root();
        carousel.next(&mut doc);
        carousel.destroy(&mut doc);
        assert!(!doc.has_class(root, "transitioning"));
    }

    #[test]
    fn stars_render_filled_and_empty() {
        assert_eq!(stars(4), "★★★★☆");
        assert_eq!(stars(9), "★★★★★");
    }
}
