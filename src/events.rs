//! Host input events.
//!
//! A host (browser bindings, a test, the CLI) translates whatever the
//! platform delivers into an [`Event`] and hands it to the page. Controllers
//! inspect the target to decide whether the event is theirs and report back
//! through [`Propagation`].

use crate::dom::NodeId;

/// Keys the widgets react to. Everything else arrives as [`Key::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Enter,
    Space,
    Escape,
    Tab { shift: bool },
    Other(String),
}

impl Key {
    /// Map a `KeyboardEvent.key` string.
    pub fn from_key_name(name: &str, shift: bool) -> Self {
        match name {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "Home" => Key::Home,
            "End" => Key::End,
            "Enter" => Key::Enter,
            " " | "Spacebar" => Key::Space,
            "Escape" | "Esc" => Key::Escape,
            "Tab" => Key::Tab { shift },
            other => Key::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Click { target: NodeId },
    KeyDown { target: NodeId, key: Key },
    /// The user edited a form control; the page stores `value` before dispatch.
    Input { target: NodeId, value: String },
    Blur { target: NodeId },
    Submit { form: NodeId },
    TouchStart { target: NodeId, x: f64, y: f64 },
    TouchEnd { target: NodeId, x: f64, y: f64 },
    PointerEnter { target: NodeId },
    PointerLeave { target: NodeId },
    PointerMove { x: f64, y: f64 },
    VisibilityChange { hidden: bool },
    TransitionEnd { target: NodeId },
    /// An observed element crossed into (or out of) the viewport.
    Intersect { target: NodeId, ratio: f64 },
    Scroll { y: f64 },
    Resize { width: f64, height: f64 },
}

impl Event {
    /// The element the event was dispatched on, if it has one.
    pub fn target(&self) -> Option<NodeId> {
        match self {
            Event::Click { target }
            | Event::KeyDown { target, .. }
            | Event::Input { target, .. }
            | Event::Blur { target }
            | Event::TouchStart { target, .. }
            | Event::TouchEnd { target, .. }
            | Event::PointerEnter { target }
            | Event::PointerLeave { target }
            | Event::TransitionEnd { target }
            | Event::Intersect { target, .. } => Some(*target),
            Event::Submit { form } => Some(*form),
            Event::PointerMove { .. }
            | Event::VisibilityChange { .. }
            | Event::Scroll { .. }
            | Event::Resize { .. } => None,
        }
    }
}

/// What a controller did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Propagation {
    /// Not for this controller.
    Ignored,
    Handled,
    /// Handled, and the host must suppress the browser default (scrolling,
    /// native form submission, focus movement).
    PreventDefault,
}

impl Propagation {
    pub fn is_handled(self) -> bool {
        self != Propagation::Ignored
    }

    /// Combine outcomes from several controllers; the strongest wins.
    pub fn merge(self, other: Propagation) -> Propagation {
        self.max(other)
    }
}
