//! # Clinic Widgets
//!
//! The interactive parts of a single-page orthodontic practice site, written
//! as headless controllers: testimonial and tour carousels, a treatment cost
//! estimator, gallery and blog filters, an FAQ accordion, booking and contact
//! forms, a booking modal, scroll effects, a 3D hero and a contact map.
//!
//! # Architecture: Document, Events, Clock
//!
//! Controllers never touch a browser. They read and write an in-memory
//! [`dom::Document`], react to host [`events::Event`]s and measure time with a
//! shared [`timer::Clock`]:
//!
//! ```text
//! content.toml ──► markup::render_page ──► HTML for the browser
//!        │
//!        └───────► page::build_document ──► Document ──► page::Page
//!                                                         ├── dispatch(Event)
//!                                                         └── tick()  (Clock)
//! ```
//!
//! A browser host mirrors document mutations onto the real DOM and turns DOM
//! events into [`events::Event`]s. Tests do the same with a manual clock, so
//! every timer (autoplay, transitions, toasts, simulated submissions) is
//! deterministic.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`dom`] | Arena element tree: ids, classes, attributes, text, focus |
//! | [`events`] | Host input events and dispatch results |
//! | [`timer`] | Clock plus one-slot timeout and interval primitives |
//! | [`mount`] | `Mounted`/`NotMounted` outcome of binding a widget to its anchors |
//! | [`carousel`] | Generic slide carousel used for testimonials and the practice tour |
//! | [`calculator`] | Treatment cost lookup, fee arithmetic and the estimator form |
//! | [`filter`] | Category filter and search over gallery cases and blog posts |
//! | [`accordion`] | Single-open FAQ accordion |
//! | [`forms`] | Field rules and the booking/contact form controller |
//! | [`overlay`] | Shared scroll lock, booking modal, mobile menu |
//! | [`notify`] | Toast notifications and timed live-region announcements |
//! | [`scroll_fx`] | Reveal animations, counters, parallax, sticky header |
//! | [`hero`] | 3D hero placement and camera easing behind a backend trait |
//! | [`map`] | Contact map behind a backend trait, with a link-out fallback |
//! | [`content`] | Site content loaded from `content.toml` |
//! | [`markup`] | Maud templates for the full page |
//! | [`page`] | Composition root owning every controller |
//! | [`config`] | Layered `widgets.toml` loading, validation, CSS variables |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Explicit Mount Outcomes
//!
//! A widget whose anchors are missing must not break the page. Every
//! constructor returns `Result<_, MountError>`, and the page stores the result
//! as a [`mount::Mount`]. Methods on a mounted controller can assume their
//! anchors exist; nothing downstream re-checks for missing elements.
//!
//! ## One Owner Per Controller
//!
//! [`page::Page`] constructs each controller once and holds it. There is no
//! global registry; tests mount a page (or a single controller) on a fresh
//! document and drive it directly.
//!
//! ## Completion Signals Over Fixed Delays
//!
//! Carousel transitions end on the first `TransitionEnd` from the track and
//! form submissions end on an explicit completion. The fixed delays
//! (`transition_ms`, `submit_delay_ms`) remain only as fallbacks.
//!
//! ## Wrapping Carousels
//!
//! Navigation wraps in every direction, so the previous/next buttons are
//! never disabled while there is more than one slide.

pub mod accordion;
pub mod calculator;
pub mod carousel;
pub mod config;
pub mod content;
pub mod dom;
pub mod events;
pub mod filter;
pub mod forms;
pub mod hero;
pub mod map;
pub mod markup;
pub mod mount;
pub mod notify;
pub mod output;
pub mod overlay;
pub mod page;
pub mod scroll_fx;
pub mod timer;

#[cfg(test)]
pub(crate) mod test_helpers;
