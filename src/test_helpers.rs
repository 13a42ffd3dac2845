//! Shared test utilities for the clinic-widgets test suite.
//!
//! Provides fixture builders that lay out the markup each controller binds
//! to, plus assertions over the rendered state.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut doc = Document::new();
//! testimonial_slider(&mut doc, &sample_testimonials(3));
//! let carousel = TestimonialCarousel::mount(&mut doc, TESTIMONIALS_ROOT, &config, clock)?;
//!
//! assert_single_active(&doc, carousel.root(), "carousel-slide", 0);
//! ```

use crate::carousel::{Slide, TESTIMONIALS_ROOT, TOUR_ROOT};
use crate::content::{SiteContent, Testimonial, TourSlide};
use crate::dom::{Document, ElementBuilder, NodeId};

// =========================================================================
// Fixture content
// =========================================================================

/// `count` five-star testimonials authored "Patient 1", "Patient 2", ...
pub fn sample_testimonials(count: usize) -> Vec<Testimonial> {
    (1..=count)
        .map(|i| Testimonial {
            author: format!("Patient {i}"),
            text: format!("Testimonial number {i}"),
            rating: 5,
            treatment: None,
        })
        .collect()
}

/// `count` tour slides labeled "Room 1", "Room 2", ...
pub fn sample_tour(count: usize) -> Vec<TourSlide> {
    (1..=count)
        .map(|i| TourSlide {
            label: format!("Room {i}"),
            image: format!("/tour/{i}.avif"),
            alt: format!("Photo of room {i}"),
        })
        .collect()
}

// =========================================================================
// Markup fixtures
// =========================================================================

/// Lay out a complete carousel skeleton and return its root.
pub fn carousel_skeleton<S: Slide>(doc: &mut Document, root_id: &str, slides: &[S]) -> NodeId {
    let body = doc.body();
    let root = ElementBuilder::new(doc, body, "section")
        .id(root_id)
        .class("carousel")
        .finish();
    let track = ElementBuilder::new(doc, root, "div")
        .class("carousel-track")
        .finish();
    for slide in slides {
        slide.build(doc, track);
    }
    ElementBuilder::new(doc, root, "button")
        .class("carousel-prev")
        .text("‹")
        .finish();
    ElementBuilder::new(doc, root, "button")
        .class("carousel-next")
        .text("›")
        .finish();
    ElementBuilder::new(doc, root, "button")
        .class("carousel-toggle")
        .finish();
    ElementBuilder::new(doc, root, "div")
        .class("carousel-dots")
        .finish();
    root
}

pub fn testimonial_slider(doc: &mut Document, testimonials: &[Testimonial]) -> NodeId {
    carousel_skeleton(doc, TESTIMONIALS_ROOT, testimonials)
}

pub fn tour_slider(doc: &mut Document, slides: &[TourSlide]) -> NodeId {
    carousel_skeleton(doc, TOUR_ROOT, slides)
}

/// Build the full page document from the bundled sample content.
pub fn sample_page_document() -> Document {
    crate::page::build_document(&SiteContent::sample(), &Default::default())
}

// =========================================================================
// State assertions
// =========================================================================

/// Indices (within `.class` elements under `scope`) that carry `active`.
pub fn active_indices(doc: &Document, scope: NodeId, class: &str) -> Vec<usize> {
    doc.query_class(scope, class)
        .into_iter()
        .enumerate()
        .filter(|(_, n)| doc.has_class(*n, "active"))
        .map(|(i, _)| i)
        .collect()
}

/// Assert exactly one `.class` element under `scope` is active, at `expected`.
pub fn assert_single_active(doc: &Document, scope: NodeId, class: &str, expected: usize) {
    let active = active_indices(doc, scope, class);
    assert_eq!(
        active,
        vec![expected],
        "expected only .{class} #{expected} to be active"
    );
}

/// Text of the carousel's live region.
pub fn live_text(doc: &Document, root: NodeId) -> String {
    let live = doc
        .first_by_class(root, "carousel-live")
        .unwrap_or_else(|| panic!("carousel has no live region"));
    doc.text(live).to_string()
}

/// Find an element by id. Panics with the missing id.
pub fn by_id(doc: &Document, id: &str) -> NodeId {
    doc.get_element_by_id(id)
        .unwrap_or_else(|| panic!("element #{id} not found"))
}

/// Elements under `scope` carrying `class` that are not hidden.
pub fn shown(doc: &Document, scope: NodeId, class: &str) -> Vec<NodeId> {
    doc.query_class(scope, class)
        .into_iter()
        .filter(|n| !doc.has_class(*n, "hidden"))
        .collect()
}
