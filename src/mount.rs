//! Widget mounting outcome.
//!
//! A widget that cannot find its anchors must not take the page down with
//! it. Constructors return `Result<_, MountError>`; the page wraps that in a
//! [`Mount`], which logs the failure once and otherwise behaves like an
//! `Option` the page can hold for the lifetime of the document.

use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MountError {
    #[error("missing anchor: {0}")]
    MissingAnchor(String),
    #[error("no items found under {0}")]
    Empty(String),
    #[error("{0} library is not available")]
    LibraryUnavailable(&'static str),
}

/// A controller that either bound to the page or did not.
#[derive(Debug)]
pub enum Mount<T> {
    Mounted(T),
    NotMounted(MountError),
}

impl<T> Mount<T> {
    /// Wrap a constructor result, logging a warning when `widget` failed.
    pub fn from_result(widget: &str, result: Result<T, MountError>) -> Self {
        match result {
            Ok(controller) => Mount::Mounted(controller),
            Err(reason) => {
                warn!(widget, %reason, "widget not mounted");
                Mount::NotMounted(reason)
            }
        }
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self, Mount::Mounted(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Mount::Mounted(c) => Some(c),
            Mount::NotMounted(_) => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Mount::Mounted(c) => Some(c),
            Mount::NotMounted(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&MountError> {
        match self {
            Mount::Mounted(_) => None,
            Mount::NotMounted(reason) => Some(reason),
        }
    }
}

/// Shorthand for "look up `id` or fail with [`MountError::MissingAnchor`]".
pub fn require_id(
    doc: &crate::dom::Document,
    id: &str,
) -> Result<crate::dom::NodeId, MountError> {
    doc.get_element_by_id(id)
        .ok_or_else(|| MountError::MissingAnchor(format!("#{id}")))
}

/// Shorthand for "first `.class` under `scope` or fail".
pub fn require_class(
    doc: &crate::dom::Document,
    scope: crate::dom::NodeId,
    class: &str,
) -> Result<crate::dom::NodeId, MountError> {
    doc.first_by_class(scope, class)
        .ok_or_else(|| MountError::MissingAnchor(format!(".{class}")))
}
