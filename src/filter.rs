//! Category filter and text search over a grid of items.
//!
//! The results gallery and the blog index use the same controller. Each item
//! carries a `data-category` tag; the current filter is either [`ALL`] or a
//! tag that must match exactly. The blog additionally narrows by a search
//! query, matched case-insensitively against each item's text.
//!
//! ```text
//! #<root-id>
//! ├── button.filter-btn[data-filter]   one per category, plus "all"
//! ├── input.filter-search              optional
//! ├── .filter-grid
//! │   └── .filter-item[data-category]
//! ├── .filter-empty                    shown when nothing matches
//! ├── .filter-results                  live region (created if absent)
//! └── button.load-more                 optional
//! ```

use tracing::debug;

use crate::dom::{Document, ElementBuilder, NodeId};
use crate::events::{Event, Propagation};
use crate::mount::{MountError, require_class, require_id};
use crate::notify::{NoticeKind, Notifier};

/// The filter value that matches every item.
pub const ALL: &str = "all";

pub const GALLERY_ROOT: &str = "results-gallery";
pub const BLOG_ROOT: &str = "blog";

const LOAD_MORE_NOTICE: &str = "All articles are already shown. Check back soon for more.";

#[derive(Debug)]
struct Item {
    node: NodeId,
    category: String,
}

#[derive(Debug)]
pub struct FilterGrid {
    root: NodeId,
    buttons: Vec<NodeId>,
    search: Option<NodeId>,
    items: Vec<Item>,
    empty: Option<NodeId>,
    results: NodeId,
    load_more: Option<NodeId>,
    current: String,
    query: String,
}

impl FilterGrid {
    pub fn mount(doc: &mut Document, root_id: &str) -> Result<Self, MountError> {
        let root = require_id(doc, root_id)?;
        let grid = require_class(doc, root, "filter-grid")?;
        let items: Vec<Item> = doc
            .query_class(grid, "filter-item")
            .into_iter()
            .map(|node| Item {
                node,
                category: doc.data(node, "category").unwrap_or_default().to_string(),
            })
            .collect();
        if items.is_empty() {
            return Err(MountError::Empty(format!("#{root_id}")));
        }
        let results = match doc.first_by_class(root, "filter-results") {
            Some(node) => node,
            None => ElementBuilder::new(doc, root, "p")
                .class("filter-results")
                .class("sr-only")
                .finish(),
        };
        doc.set_attr(results, "aria-live", "polite");

        let mut controller = Self {
            root,
            buttons: doc.query_class(root, "filter-btn"),
            search: doc.first_by_class(root, "filter-search"),
            items,
            empty: doc.first_by_class(root, "filter-empty"),
            results,
            load_more: doc.first_by_class(root, "load-more"),
            current: ALL.to_string(),
            query: String::new(),
        };
        controller.apply(doc);
        Ok(controller)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn current_filter(&self) -> &str {
        &self.current
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Show only items tagged `category` (or everything for [`ALL`]).
    /// Returns the number of visible items.
    pub fn filter(&mut self, doc: &mut Document, category: &str) -> usize {
        self.current = category.to_string();
        self.apply(doc)
    }

    /// Narrow the current filter by a case-insensitive text query.
    pub fn search(&mut self, doc: &mut Document, query: &str) -> usize {
        self.query = query.trim().to_lowercase();
        self.apply(doc)
    }

    /// Visible items in document order.
    pub fn visible(&self, doc: &Document) -> Vec<NodeId> {
        self.items
            .iter()
            .map(|i| i.node)
            .filter(|n| !doc.has_class(*n, "hidden"))
            .collect()
    }

    /// There is no pagination; tell the visitor so.
    pub fn load_more(&self, doc: &mut Document, notifier: &mut Notifier) {
        notifier.show(doc, NoticeKind::Info, LOAD_MORE_NOTICE);
    }

    fn matches(&self, doc: &Document, item: &Item) -> bool {
        let category_ok = self.current == ALL || item.category == self.current;
        category_ok
            && (self.query.is_empty()
                || doc.text_content(item.node).to_lowercase().contains(&self.query))
    }

    fn apply(&mut self, doc: &mut Document) -> usize {
        let mut shown = 0;
        for item in &self.items {
            let visible = self.matches(doc, item);
            doc.toggle_class(item.node, "hidden", !visible);
            doc.set_flag(item.node, "aria-hidden", !visible);
            shown += visible as usize;
        }
        for &button in &self.buttons {
            let active = doc.data(button, "filter") == Some(self.current.as_str());
            doc.toggle_class(button, "active", active);
            doc.set_flag(button, "aria-pressed", active);
        }
        if let Some(empty) = self.empty {
            doc.toggle_class(empty, "hidden", shown > 0);
        }
        let summary = match shown {
            1 => "1 result".to_string(),
            n => format!("{n} results"),
        };
        doc.set_text(self.results, summary);
        debug!(filter = %self.current, query = %self.query, shown, "filter applied");
        shown
    }

    pub fn handle_event(
        &mut self,
        doc: &mut Document,
        event: &Event,
        notifier: &mut Notifier,
    ) -> Propagation {
        match event {
            Event::Click { target } => {
                let pressed = self.buttons.iter().copied().find(|b| doc.contains(*b, *target));
                if let Some(button) = pressed {
                    let category = doc.data(button, "filter").unwrap_or(ALL).to_string();
                    self.filter(doc, &category);
                    return Propagation::PreventDefault;
                }
                if self.load_more.is_some_and(|b| doc.contains(b, *target)) {
                    self.load_more(doc, notifier);
                    return Propagation::PreventDefault;
                }
                Propagation::Ignored
            }
            Event::Input { target, value } if Some(*target) == self.search => {
                self.search(doc, value);
                Propagation::Handled
            }
            _ => Propagation::Ignored,
        }
    }
}
