//! Transient notifications and live-region announcements.
//!
//! [`Notifier`] injects toast elements into the notification area and
//! removes each one after `timeout_ms` (or when its close button is
//! clicked). [`Announcer`] writes a message into an existing `aria-live`
//! region and clears it again after `announcement_ms`, so repeated
//! identical messages are still read out.

use crate::config::NotificationConfig;
use crate::dom::{Document, ElementBuilder, NodeId};
use crate::events::{Event, Propagation};
use crate::timer::{Clock, Timeout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

impl NoticeKind {
    fn class(self) -> &'static str {
        match self {
            NoticeKind::Info => "notification-info",
            NoticeKind::Success => "notification-success",
            NoticeKind::Error => "notification-error",
        }
    }

    /// Errors interrupt the screen reader; everything else waits its turn.
    fn role(self) -> &'static str {
        match self {
            NoticeKind::Error => "alert",
            NoticeKind::Info | NoticeKind::Success => "status",
        }
    }
}

#[derive(Debug)]
struct Toast {
    node: NodeId,
    close: NodeId,
    expiry: Timeout,
}

/// Toast notifications appended to a container element.
#[derive(Debug)]
pub struct Notifier {
    container: NodeId,
    toasts: Vec<Toast>,
    timeout_ms: u64,
    clock: Clock,
}

impl Notifier {
    /// Bind to `#notification-area`, or append one to `<body>` if the page
    /// does not provide it. Notifications never fail to mount.
    pub fn mount(doc: &mut Document, config: &NotificationConfig, clock: Clock) -> Self {
        let container = match doc.get_element_by_id("notification-area") {
            Some(node) => node,
            None => {
                let body = doc.body();
                ElementBuilder::new(doc, body, "div")
                    .id("notification-area")
                    .class("notification-area")
                    .finish()
            }
        };
        Self {
            container,
            toasts: Vec::new(),
            timeout_ms: config.timeout_ms,
            clock,
        }
    }

    /// Show a toast; returns its element.
    pub fn show(&mut self, doc: &mut Document, kind: NoticeKind, message: &str) -> NodeId {
        let node = ElementBuilder::new(doc, self.container, "div")
            .class("notification")
            .class(kind.class())
            .class("show")
            .attr("role", kind.role())
            .finish();
        ElementBuilder::new(doc, node, "span")
            .class("notification-message")
            .text(message)
            .finish();
        let close = ElementBuilder::new(doc, node, "button")
            .class("notification-close")
            .attr("aria-label", "Dismiss notification")
            .text("×")
            .finish();

        let mut expiry = Timeout::default();
        expiry.start(self.clock.now_ms(), self.timeout_ms);
        self.toasts.push(Toast {
            node,
            close,
            expiry,
        });
        node
    }

    /// Messages currently on screen, oldest first.
    pub fn visible_messages(&self, doc: &Document) -> Vec<String> {
        self.toasts
            .iter()
            .filter_map(|t| doc.first_by_class(t.node, "notification-message"))
            .map(|n| doc.text(n).to_string())
            .collect()
    }

    pub fn handle_event(&mut self, doc: &mut Document, event: &Event) -> Propagation {
        let Event::Click { target } = event else {
            return Propagation::Ignored;
        };
        let Some(pos) = self.toasts.iter().position(|t| doc.contains(t.close, *target)) else {
            return Propagation::Ignored;
        };
        let toast = self.toasts.remove(pos);
        doc.remove(toast.node);
        Propagation::Handled
    }

    /// Remove every toast whose lifetime has run out.
    pub fn tick(&mut self, doc: &mut Document) {
        let now = self.clock.now_ms();
        self.toasts.retain_mut(|toast| {
            if toast.expiry.fire(now) {
                doc.remove(toast.node);
                false
            } else {
                true
            }
        });
    }
}

/// A live region that clears itself after a short delay.
#[derive(Debug)]
pub struct Announcer {
    region: NodeId,
    clear: Timeout,
    lifetime_ms: u64,
    clock: Clock,
}

impl Announcer {
    /// Use `region` as the live region, marking it polite if unmarked.
    pub fn new(doc: &mut Document, region: NodeId, lifetime_ms: u64, clock: Clock) -> Self {
        if doc.attr(region, "aria-live").is_none() {
            doc.set_attr(region, "aria-live", "polite");
        }
        Self {
            region,
            clear: Timeout::default(),
            lifetime_ms,
            clock,
        }
    }

    pub fn region(&self) -> NodeId {
        self.region
    }

    pub fn announce(&mut self, doc: &mut Document, message: &str) {
        doc.set_text(self.region, message);
        self.clear.start(self.clock.now_ms(), self.lifetime_ms);
    }

    pub fn tick(&mut self, doc: &mut Document) {
        if self.clear.fire(self.clock.now_ms()) {
            doc.set_text(self.region, "");
        }
    }
}
