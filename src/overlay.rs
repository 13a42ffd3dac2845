//! Overlays that take over the page: the booking modal and the mobile menu.
//!
//! Both freeze page scrolling while open through a shared [`ScrollLock`].
//! The lock is held per owner, so closing one overlay never unfreezes the
//! page while another is still open.

use std::collections::BTreeSet;

use tracing::debug;

use crate::dom::{Document, ElementBuilder, NodeId};
use crate::events::{Event, Key, Propagation};
use crate::mount::{MountError, require_class, require_id};
use crate::notify::Announcer;
use crate::timer::Clock;

pub const BOOKING_MODAL: &str = "booking-modal";
pub const PRIMARY_NAV: &str = "primary-nav";

/// Class on `<body>` while any overlay holds the lock.
pub const NO_SCROLL: &str = "no-scroll";

/// Page scroll freeze, held by named owners.
#[derive(Debug, Default)]
pub struct ScrollLock {
    holders: BTreeSet<&'static str>,
}

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `owner`. The first holder freezes the page.
    pub fn acquire(&mut self, doc: &mut Document, owner: &'static str) {
        if self.holders.insert(owner) && self.holders.len() == 1 {
            let body = doc.body();
            doc.add_class(body, NO_SCROLL);
        }
    }

    /// Drop `owner`'s hold. Releasing without holding is ignored; the last
    /// holder to leave unfreezes the page.
    pub fn release(&mut self, doc: &mut Document, owner: &'static str) {
        if self.holders.remove(owner) && self.holders.is_empty() {
            let body = doc.body();
            doc.remove_class(body, NO_SCROLL);
        }
    }

    pub fn is_locked(&self) -> bool {
        !self.holders.is_empty()
    }

    pub fn holders(&self) -> usize {
        self.holders.len()
    }
}

const FOCUSABLE_TAGS: [&str; 5] = ["a", "button", "input", "select", "textarea"];

fn focusable(doc: &Document, scope: NodeId) -> Vec<NodeId> {
    doc.descendants(scope)
        .into_iter()
        .filter(|n| {
            (FOCUSABLE_TAGS.contains(&doc.tag(*n)) || doc.attr(*n, "tabindex").is_some())
                && doc.attr(*n, "disabled").is_none()
                && doc.attr(*n, "tabindex") != Some("-1")
        })
        .collect()
}

/// A dialog opened from any `[data-open-modal="<id>"]` trigger.
#[derive(Debug)]
pub struct Modal {
    id: &'static str,
    label: String,
    root: NodeId,
    close: NodeId,
    open: bool,
    return_focus: Option<NodeId>,
    announcer: Announcer,
}

impl Modal {
    /// Bind to `#id`, which must contain a `.modal-close` button. `label`
    /// names the dialog in open/close announcements.
    pub fn mount(
        doc: &mut Document,
        id: &'static str,
        label: &str,
        announcement_ms: u64,
        clock: Clock,
    ) -> Result<Self, MountError> {
        let root = require_id(doc, id)?;
        let close = require_class(doc, root, "modal-close")?;
        let region = match doc.first_by_class(doc.body(), "modal-announcer") {
            Some(node) => node,
            None => {
                let body = doc.body();
                ElementBuilder::new(doc, body, "div")
                    .class("modal-announcer")
                    .class("sr-only")
                    .finish()
            }
        };
        doc.set_attr(root, "role", "dialog");
        doc.set_flag(root, "aria-modal", true);
        doc.set_flag(root, "aria-hidden", true);
        doc.set_attr(close, "aria-label", format!("Close {}", label.to_lowercase()));
        Ok(Self {
            id,
            label: label.to_string(),
            root,
            close,
            open: false,
            return_focus: None,
            announcer: Announcer::new(doc, region, announcement_ms, clock),
        })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn open(&mut self, doc: &mut Document, lock: &mut ScrollLock) {
        if self.open {
            return;
        }
        self.open = true;
        self.return_focus = doc.focused();
        doc.add_class(self.root, "active");
        doc.set_flag(self.root, "aria-hidden", false);
        lock.acquire(doc, self.id);
        if let Some(first) = focusable(doc, self.root).first() {
            doc.focus(*first);
        }
        self.announcer.announce(doc, &format!("{} opened", self.label));
        debug!(modal = self.id, "opened");
    }

    pub fn close(&mut self, doc: &mut Document, lock: &mut ScrollLock) {
        if !self.open {
            return;
        }
        self.open = false;
        doc.remove_class(self.root, "active");
        doc.set_flag(self.root, "aria-hidden", true);
        lock.release(doc, self.id);
        match self.return_focus.take() {
            Some(node) => doc.focus(node),
            None => doc.blur(),
        }
        self.announcer.announce(doc, &format!("{} closed", self.label));
        debug!(modal = self.id, "closed");
    }

    pub fn tick(&mut self, doc: &mut Document) {
        self.announcer.tick(doc);
    }

    fn trap_tab(&self, doc: &mut Document, shift: bool) -> Propagation {
        let stops = focusable(doc, self.root);
        let (Some(&first), Some(&last)) = (stops.first(), stops.last()) else {
            return Propagation::PreventDefault;
        };
        let focused = doc.focused().filter(|n| doc.contains(self.root, *n));
        match (focused, shift) {
            (None, false) => doc.focus(first),
            (None, true) => doc.focus(last),
            (Some(n), false) if n == last => doc.focus(first),
            (Some(n), true) if n == first => doc.focus(last),
            _ => return Propagation::Ignored,
        }
        Propagation::PreventDefault
    }

    pub fn handle_event(
        &mut self,
        doc: &mut Document,
        event: &Event,
        lock: &mut ScrollLock,
    ) -> Propagation {
        match event {
            Event::Click { target } => {
                let trigger = doc
                    .closest_attr(*target, "data-open-modal")
                    .filter(|n| doc.data(*n, "open-modal") == Some(self.id));
                if trigger.is_some() {
                    self.open(doc, lock);
                    return Propagation::PreventDefault;
                }
                if !self.open {
                    return Propagation::Ignored;
                }
                // The root doubles as the backdrop; clicks inside content
                // land on descendants.
                if *target == self.root || doc.contains(self.close, *target) {
                    self.close(doc, lock);
                    return Propagation::Handled;
                }
                Propagation::Ignored
            }
            Event::KeyDown { key, .. } if self.open => match key {
                Key::Escape => {
                    self.close(doc, lock);
                    Propagation::PreventDefault
                }
                Key::Tab { shift } => self.trap_tab(doc, *shift),
                _ => Propagation::Ignored,
            },
            _ => Propagation::Ignored,
        }
    }
}

/// The collapsible navigation on narrow screens.
#[derive(Debug)]
pub struct MobileMenu {
    toggle: NodeId,
    nav: NodeId,
    open: bool,
}

impl MobileMenu {
    pub fn mount(doc: &mut Document) -> Result<Self, MountError> {
        let nav = require_id(doc, PRIMARY_NAV)?;
        let toggle = require_class(doc, doc.body(), "menu-toggle")?;
        doc.set_attr(toggle, "aria-controls", PRIMARY_NAV);
        doc.set_flag(toggle, "aria-expanded", false);
        Ok(Self {
            toggle,
            nav,
            open: false,
        })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, doc: &mut Document, open: bool, lock: &mut ScrollLock) {
        if self.open == open {
            return;
        }
        self.open = open;
        doc.toggle_class(self.nav, "active", open);
        doc.toggle_class(self.toggle, "active", open);
        doc.set_flag(self.toggle, "aria-expanded", open);
        if open {
            lock.acquire(doc, PRIMARY_NAV);
        } else {
            lock.release(doc, PRIMARY_NAV);
        }
    }

    pub fn handle_event(
        &mut self,
        doc: &mut Document,
        event: &Event,
        lock: &mut ScrollLock,
    ) -> Propagation {
        match event {
            Event::Click { target } if doc.contains(self.toggle, *target) => {
                let open = !self.open;
                self.set_open(doc, open, lock);
                Propagation::Handled
            }
            Event::Click { target } if self.open && doc.contains(self.nav, *target) => {
                let on_link = std::iter::successors(Some(*target), |n| doc.parent(*n))
                    .take_while(|n| doc.contains(self.nav, *n))
                    .any(|n| doc.tag(n) == "a");
                if on_link {
                    self.set_open(doc, false, lock);
                }
                Propagation::Ignored
            }
            Event::KeyDown {
                key: Key::Escape,
                ..
            } if self.open => {
                self.set_open(doc, false, lock);
                doc.focus(self.toggle);
                Propagation::Handled
            }
            _ => Propagation::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modal_page(doc: &mut Document) -> (NodeId, NodeId) {
        let body = doc.body();
        let trigger = ElementBuilder::new(doc, body, "button")
            .data("open-modal", BOOKING_MODAL)
            .text("Book now")
            .finish();
        let root = ElementBuilder::new(doc, body, "div")
            .id(BOOKING_MODAL)
            .class("modal")
            .finish();
        let content = ElementBuilder::new(doc, root, "div").class("modal-content").finish();
        ElementBuilder::new(doc, content, "button").class("modal-close").finish();
        ElementBuilder::new(doc, content, "input").attr("name", "name").finish();
        ElementBuilder::new(doc, content, "button").class("submit-btn").finish();
        (trigger, root)
    }

    fn mount_modal(doc: &mut Document, clock: &Clock) -> Modal {
        Modal::mount(doc, BOOKING_MODAL, "Booking form", 1000, clock.clone()).unwrap()
    }

    fn announcer_text(doc: &Document) -> String {
        let region = doc.first_by_class(doc.body(), "modal-announcer").unwrap();
        doc.text(region).to_string()
    }

    #[test]
    fn scroll_lock_counts_owners() {
        let mut doc = Document::new();
        let body = doc.body();
        let mut lock = ScrollLock::new();

        lock.acquire(&mut doc, "a");
        lock.acquire(&mut doc, "b");
        lock.acquire(&mut doc, "b");
        assert_eq!(lock.holders(), 2);

        lock.release(&mut doc, "a");
        assert!(doc.has_class(body, NO_SCROLL));
        lock.release(&mut doc, "a");
        assert!(doc.has_class(body, NO_SCROLL));
        lock.release(&mut doc, "b");
        assert!(!doc.has_class(body, NO_SCROLL));
        assert!(!lock.is_locked());
    }

    #[test]
    fn trigger_opens_and_escape_restores_focus() {
        let mut doc = Document::new();
        let clock = Clock::manual();
        let (trigger, root) = modal_page(&mut doc);
        let mut modal = mount_modal(&mut doc, &clock);
        let mut lock = ScrollLock::new();
        doc.focus(trigger);

        modal.handle_event(&mut doc, &Event::Click { target: trigger }, &mut lock);
        assert!(modal.is_open());
        assert_eq!(doc.attr(root, "aria-hidden"), Some("false"));
        assert!(lock.is_locked());
        let close = doc.first_by_class(root, "modal-close").unwrap();
        assert_eq!(doc.focused(), Some(close));
        assert_eq!(announcer_text(&doc), "Booking form opened");

        clock.advance(1000);
        modal.tick(&mut doc);
        assert_eq!(announcer_text(&doc), "");

        let outcome = modal.handle_event(
            &mut doc,
            &Event::KeyDown {
                target: close,
                key: Key::Escape,
            },
            &mut lock,
        );
        assert_eq!(outcome, Propagation::PreventDefault);
        assert!(!modal.is_open());
        assert!(!lock.is_locked());
        assert_eq!(doc.focused(), Some(trigger));
        assert_eq!(announcer_text(&doc), "Booking form closed");
    }

    #[test]
    fn backdrop_click_closes_but_content_click_does_not() {
        let mut doc = Document::new();
        let (_, root) = modal_page(&mut doc);
        let mut modal = mount_modal(&mut doc, &Clock::manual());
        let mut lock = ScrollLock::new();
        modal.open(&mut doc, &mut lock);

        let content = doc.first_by_class(root, "modal-content").unwrap();
        modal.handle_event(&mut doc, &Event::Click { target: content }, &mut lock);
        assert!(modal.is_open());
        modal.handle_event(&mut doc, &Event::Click { target: root }, &mut lock);
        assert!(!modal.is_open());
    }

    #[test]
    fn tab_wraps_inside_modal() {
        let mut doc = Document::new();
        let (_, root) = modal_page(&mut doc);
        let mut modal = mount_modal(&mut doc, &Clock::manual());
        let mut lock = ScrollLock::new();
        modal.open(&mut doc, &mut lock);
        let stops = focusable(&doc, root);
        assert_eq!(stops.len(), 3);

        doc.focus(stops[2]);
        let tab = Event::KeyDown {
            target: stops[2],
            key: Key::Tab { shift: false },
        };
        assert_eq!(modal.handle_event(&mut doc, &tab, &mut lock), Propagation::PreventDefault);
        assert_eq!(doc.focused(), Some(stops[0]));

        let back = Event::KeyDown {
            target: stops[0],
            key: Key::Tab { shift: true },
        };
        modal.handle_event(&mut doc, &back, &mut lock);
        assert_eq!(doc.focused(), Some(stops[2]));

        doc.focus(stops[1]);
        let mid = Event::KeyDown {
            target: stops[1],
            key: Key::Tab { shift: false },
        };
        assert_eq!(modal.handle_event(&mut doc, &mid, &mut lock), Propagation::Ignored);
    }

    #[test]
    fn menu_and_modal_share_lock() {
        let mut doc = Document::new();
        let (_, _) = modal_page(&mut doc);
        let body = doc.body();
        let toggle = ElementBuilder::new(&mut doc, body, "button").class("menu-toggle").finish();
        let nav = ElementBuilder::new(&mut doc, body, "nav").id(PRIMARY_NAV).finish();
        let link = ElementBuilder::new(&mut doc, nav, "a").attr("href", "#faq").finish();

        let mut modal = mount_modal(&mut doc, &Clock::manual());
        let mut menu = MobileMenu::mount(&mut doc).unwrap();
        let mut lock = ScrollLock::new();

        menu.handle_event(&mut doc, &Event::Click { target: toggle }, &mut lock);
        assert_eq!(doc.attr(toggle, "aria-expanded"), Some("true"));
        modal.open(&mut doc, &mut lock);
        modal.close(&mut doc, &mut lock);
        assert!(doc.has_class(body, NO_SCROLL));

        menu.handle_event(&mut doc, &Event::Click { target: link }, &mut lock);
        assert!(!menu.is_open());
        assert!(!doc.has_class(body, NO_SCROLL));
        assert!(!doc.has_class(nav, "active"));
    }

    fn menu_page(doc: &mut Document) -> (NodeId, NodeId, NodeId) {
        let body = doc.body();
        let toggle = ElementBuilder::new(doc, body, "button").class("menu-toggle").finish();
        let nav = ElementBuilder::new(doc, body, "nav").id(PRIMARY_NAV).finish();
        let list = ElementBuilder::new(doc, nav, "ul").finish();
        let link = ElementBuilder::new(doc, list, "a").attr("href", "#contact").finish();
        let icon = ElementBuilder::new(doc, link, "span").class("icon").finish();
        (toggle, list, icon)
    }

    #[test]
    fn click_inside_link_closes_menu() {
        let mut doc = Document::new();
        let (toggle, list, icon) = menu_page(&mut doc);
        let mut menu = MobileMenu::mount(&mut doc).unwrap();
        let mut lock = ScrollLock::new();

        menu.handle_event(&mut doc, &Event::Click { target: toggle }, &mut lock);
        menu.handle_event(&mut doc, &Event::Click { target: list }, &mut lock);
        assert!(menu.is_open());

        menu.handle_event(&mut doc, &Event::Click { target: icon }, &mut lock);
        assert!(!menu.is_open());
        assert!(!lock.is_locked());
        assert!(!doc.has_class(doc.body(), NO_SCROLL));
    }

    #[test]
    fn escape_closes_menu_and_returns_focus() {
        let mut doc = Document::new();
        let (toggle, _, icon) = menu_page(&mut doc);
        let mut menu = MobileMenu::mount(&mut doc).unwrap();
        let mut lock = ScrollLock::new();

        let escape = Event::KeyDown {
            target: icon,
            key: Key::Escape,
        };
        assert_eq!(menu.handle_event(&mut doc, &escape, &mut lock), Propagation::Ignored);

        menu.set_open(&mut doc, true, &mut lock);
        assert!(lock.is_locked());
        assert_eq!(menu.handle_event(&mut doc, &escape, &mut lock), Propagation::Handled);
        assert!(!menu.is_open());
        assert!(!lock.is_locked());
        assert_eq!(doc.attr(toggle, "aria-expanded"), Some("false"));
        assert_eq!(doc.focused(), Some(toggle));
    }
}
