//! Scroll-driven effects.
//!
//! Everything here is configured from markup:
//!
//! | selector | behavior |
//! |----------|----------|
//! | `.animate-on-scroll[data-animation][data-delay]` | revealed once when it enters the viewport |
//! | `.counter[data-target][data-suffix]` | counts up from 0 once when it enters the viewport |
//! | `[data-speed]` | parallax offset proportional to scroll position |
//! | `.site-header` | `scrolled` past the configured offset |
//! | `.service-card` | `hovered` while the pointer is over it |
//!
//! Intersections arrive as [`Event::Intersect`] with the visible fraction;
//! anything below the configured threshold is ignored.

use tracing::debug;

use crate::config::AnimationConfig;
use crate::dom::{Document, NodeId};
use crate::events::{Event, Propagation};
use crate::mount::MountError;
use crate::timer::{Clock, Timeout};

const DEFAULT_ANIMATION: &str = "fade-up";

#[derive(Debug)]
struct Reveal {
    node: NodeId,
    animation: String,
    delay_ms: u64,
    timer: Timeout,
    done: bool,
}

#[derive(Debug)]
struct Counter {
    node: NodeId,
    target: u64,
    suffix: String,
    started_at: Option<u64>,
    done: bool,
}

#[derive(Debug)]
struct Parallax {
    node: NodeId,
    speed: f64,
}

/// Ease-out cubic over `progress` in [0, 1].
pub fn ease_out(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Counter value `elapsed_ms` into a `duration_ms` count-up to `target`.
pub fn counter_value(target: u64, elapsed_ms: u64, duration_ms: u64) -> u64 {
    if duration_ms == 0 || elapsed_ms >= duration_ms {
        return target;
    }
    let progress = elapsed_ms as f64 / duration_ms as f64;
    ((target as f64) * ease_out(progress)).round() as u64
}

#[derive(Debug)]
pub struct ScrollEffects {
    reveals: Vec<Reveal>,
    counters: Vec<Counter>,
    parallax: Vec<Parallax>,
    header: Option<NodeId>,
    cards: Vec<NodeId>,
    threshold: f64,
    counter_duration_ms: u64,
    header_offset_px: f64,
    clock: Clock,
}

impl ScrollEffects {
    /// Collect every effect on the page. Fails only when there is nothing
    /// to drive.
    pub fn mount(
        doc: &mut Document,
        config: &AnimationConfig,
        clock: Clock,
    ) -> Result<Self, MountError> {
        let body = doc.body();
        let reveals: Vec<Reveal> = doc
            .query_class(body, "animate-on-scroll")
            .into_iter()
            .map(|node| Reveal {
                node,
                animation: doc
                    .data(node, "animation")
                    .unwrap_or(DEFAULT_ANIMATION)
                    .to_string(),
                delay_ms: doc.data(node, "delay").and_then(|d| d.parse().ok()).unwrap_or(0),
                timer: Timeout::default(),
                done: false,
            })
            .collect();
        let counters: Vec<Counter> = doc
            .query_class(body, "counter")
            .into_iter()
            .filter_map(|node| {
                let target = doc.data(node, "target")?.parse().ok()?;
                Some(Counter {
                    node,
                    target,
                    suffix: doc.data(node, "suffix").unwrap_or_default().to_string(),
                    started_at: None,
                    done: false,
                })
            })
            .collect();
        let parallax: Vec<Parallax> = doc
            .query_attr(body, "data-speed")
            .into_iter()
            .filter_map(|node| {
                Some(Parallax {
                    node,
                    speed: doc.data(node, "speed")?.parse().ok()?,
                })
            })
            .collect();
        let header = doc.first_by_class(body, "site-header");
        let cards = doc.query_class(body, "service-card");

        if reveals.is_empty() && counters.is_empty() && parallax.is_empty() && header.is_none() {
            return Err(MountError::Empty("scroll effects".into()));
        }
        for counter in &counters {
            doc.set_text(counter.node, format!("0{}", counter.suffix));
        }
        debug!(
            reveals = reveals.len(),
            counters = counters.len(),
            parallax = parallax.len(),
            "scroll effects mounted"
        );
        Ok(Self {
            reveals,
            counters,
            parallax,
            header,
            cards,
            threshold: config.intersection_threshold,
            counter_duration_ms: config.counter_duration_ms,
            header_offset_px: config.header_offset_px,
            clock,
        })
    }

    fn reveal(doc: &mut Document, reveal: &mut Reveal) {
        reveal.done = true;
        doc.add_class(reveal.node, "visible");
        doc.add_class(reveal.node, &format!("animate-{}", reveal.animation));
    }

    fn on_intersect(&mut self, doc: &mut Document, target: NodeId, ratio: f64) -> Propagation {
        if ratio < self.threshold {
            return Propagation::Ignored;
        }
        let now = self.clock.now_ms();
        if let Some(reveal) = self.reveals.iter_mut().find(|r| r.node == target) {
            if !reveal.done && !reveal.timer.is_pending() {
                if reveal.delay_ms == 0 {
                    Self::reveal(doc, reveal);
                } else {
                    reveal.timer.start(now, reveal.delay_ms);
                }
            }
            return Propagation::Handled;
        }
        if let Some(counter) = self.counters.iter_mut().find(|c| c.node == target) {
            if counter.started_at.is_none() {
                counter.started_at = Some(now);
            }
            return Propagation::Handled;
        }
        Propagation::Ignored
    }

    fn on_scroll(&mut self, doc: &mut Document, y: f64) {
        for layer in &self.parallax {
            doc.set_attr(
                layer.node,
                "style",
                format!("transform: translateY({}px)", -y * layer.speed),
            );
        }
        if let Some(header) = self.header {
            doc.toggle_class(header, "scrolled", y > self.header_offset_px);
        }
    }

    /// Fire due reveals and step running counters.
    pub fn tick(&mut self, doc: &mut Document) {
        let now = self.clock.now_ms();
        for reveal in &mut self.reveals {
            if reveal.timer.fire(now) {
                Self::reveal(doc, reveal);
            }
        }
        for counter in &mut self.counters {
            let Some(start) = counter.started_at else { continue };
            if counter.done {
                continue;
            }
            let elapsed = now.saturating_sub(start);
            let value = counter_value(counter.target, elapsed, self.counter_duration_ms);
            doc.set_text(counter.node, format!("{value}{}", counter.suffix));
            counter.done = value == counter.target && elapsed >= self.counter_duration_ms;
        }
    }

    pub fn handle_event(&mut self, doc: &mut Document, event: &Event) -> Propagation {
        match event {
            Event::Intersect { target, ratio } => self.on_intersect(doc, *target, *ratio),
            Event::Scroll { y } => {
                self.on_scroll(doc, *y);
                Propagation::Handled
            }
            Event::PointerEnter { target } | Event::PointerLeave { target } => {
                let entering = matches!(event, Event::PointerEnter { .. });
                match self.cards.iter().find(|c| doc.contains(**c, *target)) {
                    Some(&card) => {
                        doc.toggle_class(card, "hovered", entering);
                        Propagation::Handled
                    }
                    None => Propagation::Ignored,
                }
            }
            _ => Propagation::Ignored,
        }
    }
}
