//! FAQ accordion: at most one answer open at a time.

use crate::dom::{Document, NodeId};
use crate::events::{Event, Key, Propagation};
use crate::mount::{MountError, require_id};

pub const FAQ_ROOT: &str = "faq";

#[derive(Debug)]
struct Entry {
    item: NodeId,
    question: NodeId,
    answer: NodeId,
}

#[derive(Debug)]
pub struct Accordion {
    entries: Vec<Entry>,
    open: Option<usize>,
}

impl Accordion {
    /// Bind to every `.faq-item` (with a `.faq-question` and `.faq-answer`)
    /// under `#faq`. Incomplete items are skipped.
    pub fn mount(doc: &mut Document) -> Result<Self, MountError> {
        let root = require_id(doc, FAQ_ROOT)?;
        let entries: Vec<Entry> = doc
            .query_class(root, "faq-item")
            .into_iter()
            .filter_map(|item| {
                Some(Entry {
                    item,
                    question: doc.first_by_class(item, "faq-question")?,
                    answer: doc.first_by_class(item, "faq-answer")?,
                })
            })
            .collect();
        if entries.is_empty() {
            return Err(MountError::Empty(format!("#{FAQ_ROOT}")));
        }

        for (i, entry) in entries.iter().enumerate() {
            let answer_id = match doc.attr(entry.answer, "id") {
                Some(id) => id.to_string(),
                None => {
                    let id = format!("faq-answer-{}", i + 1);
                    doc.set_attr(entry.answer, "id", id.clone());
                    id
                }
            };
            doc.set_attr(entry.question, "aria-controls", answer_id);
            doc.set_attr(entry.answer, "role", "region");
        }
        let mut accordion = Self {
            entries,
            open: None,
        };
        accordion.render(doc);
        Ok(accordion)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the open item.
    pub fn expanded(&self) -> Option<usize> {
        self.open
    }

    /// Open `index`, closing whatever was open. Out-of-range is a no-op.
    pub fn open(&mut self, doc: &mut Document, index: usize) {
        if index < self.entries.len() {
            self.open = Some(index);
            self.render(doc);
        }
    }

    pub fn close_all(&mut self, doc: &mut Document) {
        self.open = None;
        self.render(doc);
    }

    /// Open `index` if it is closed, close it if it is open.
    pub fn toggle(&mut self, doc: &mut Document, index: usize) {
        if self.open == Some(index) {
            self.close_all(doc);
        } else {
            self.open(doc, index);
        }
    }

    fn render(&self, doc: &mut Document) {
        for (i, entry) in self.entries.iter().enumerate() {
            let open = self.open == Some(i);
            doc.toggle_class(entry.item, "expanded", open);
            doc.set_flag(entry.question, "aria-expanded", open);
            doc.set_flag(entry.answer, "aria-hidden", !open);
        }
    }

    fn index_of(&self, doc: &Document, target: NodeId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| doc.contains(e.question, target))
    }

    pub fn handle_event(&mut self, doc: &mut Document, event: &Event) -> Propagation {
        match event {
            Event::Click { target } => match self.index_of(doc, *target) {
                Some(i) => {
                    self.toggle(doc, i);
                    Propagation::Handled
                }
                None => Propagation::Ignored,
            },
            Event::KeyDown { target, key } => {
                let Some(i) = self.index_of(doc, *target) else {
                    return Propagation::Ignored;
                };
                let last = self.entries.len() - 1;
                let focus_to = match key {
                    Key::Enter | Key::Space => {
                        self.toggle(doc, i);
                        return Propagation::PreventDefault;
                    }
                    Key::ArrowDown => {
                        if i == last {
                            0
                        } else {
                            i + 1
                        }
                    }
                    Key::ArrowUp => {
                        if i == 0 {
                            last
                        } else {
                            i - 1
                        }
                    }
                    Key::Home => 0,
                    Key::End => last,
                    _ => return Propagation::Ignored,
                };
                doc.focus(self.entries[focus_to].question);
                Propagation::PreventDefault
            }
            _ => Propagation::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementBuilder;

    fn faq(doc: &mut Document, count: usize) -> Vec<NodeId> {
        let body = doc.body();
        let root = ElementBuilder::new(doc, body, "section").id(FAQ_ROOT).finish();
        (0..count)
            .map(|i| {
                let item = ElementBuilder::new(doc, root, "div").class("faq-item").finish();
                let question = ElementBuilder::new(doc, item, "button")
                    .class("faq-question")
                    .text(format!("Question {i}"))
                    .finish();
                ElementBuilder::new(doc, item, "div")
                    .class("faq-answer")
                    .text(format!("Answer {i}"))
                    .finish();
                question
            })
            .collect()
    }

    fn expanded_count(doc: &Document) -> usize {
        doc.query_class(doc.body(), "faq-question")
            .into_iter()
            .filter(|q| doc.attr(*q, "aria-expanded") == Some("true"))
            .count()
    }

    #[test]
    fn starts_collapsed_with_aria_wiring() {
        let mut doc = Document::new();
        let questions = faq(&mut doc, 3);
        let accordion = Accordion::mount(&mut doc).unwrap();
        assert_eq!(accordion.expanded(), None);
        assert_eq!(expanded_count(&doc), 0);
        assert_eq!(doc.attr(questions[1], "aria-controls"), Some("faq-answer-2"));
    }

    #[test]
    fn opening_second_closes_first() {
        let mut doc = Document::new();
        let questions = faq(&mut doc, 3);
        let mut accordion = Accordion::mount(&mut doc).unwrap();

        accordion.handle_event(&mut doc, &Event::Click { target: questions[0] });
        accordion.handle_event(&mut doc, &Event::Click { target: questions[1] });
        assert_eq!(accordion.expanded(), Some(1));
        assert_eq!(expanded_count(&doc), 1);
        assert_eq!(doc.attr(questions[1], "aria-expanded"), Some("true"));
    }

    #[test]
    fn clicking_open_item_closes_it() {
        let mut doc = Document::new();
        let questions = faq(&mut doc, 2);
        let mut accordion = Accordion::mount(&mut doc).unwrap();
        accordion.toggle(&mut doc, 0);
        accordion.handle_event(&mut doc, &Event::Click { target: questions[0] });
        assert_eq!(accordion.expanded(), None);
        assert_eq!(expanded_count(&doc), 0);
    }

    #[test]
    fn keyboard_toggles_and_moves_focus() {
        let mut doc = Document::new();
        let questions = faq(&mut doc, 3);
        let mut accordion = Accordion::mount(&mut doc).unwrap();

        let outcome = accordion.handle_event(
            &mut doc,
            &Event::KeyDown {
                target: questions[2],
                key: Key::Space,
            },
        );
        assert_eq!(outcome, Propagation::PreventDefault);
        assert_eq!(accordion.expanded(), Some(2));

        let arrow_down = Event::KeyDown {
            target: questions[2],
            key: Key::ArrowDown,
        };
        accordion.handle_event(&mut doc, &arrow_down);
        assert_eq!(doc.focused(), Some(questions[0]));
        let arrow_up = Event::KeyDown {
            target: questions[0],
            key: Key::ArrowUp,
        };
        accordion.handle_event(&mut doc, &arrow_up);
        assert_eq!(doc.focused(), Some(questions[2]));
        let home = Event::KeyDown {
            target: questions[2],
            key: Key::Home,
        };
        accordion.handle_event(&mut doc, &home);
        assert_eq!(doc.focused(), Some(questions[0]));
        let end = Event::KeyDown {
            target: questions[0],
            key: Key::End,
        };
        accordion.handle_event(&mut doc, &end);
        assert_eq!(doc.focused(), Some(questions[2]));
    }

    #[test]
    fn out_of_range_open_is_noop() {
        let mut doc = Document::new();
        faq(&mut doc, 2);
        let mut accordion = Accordion::mount(&mut doc).unwrap();
        accordion.open(&mut doc, 1);
        accordion.open(&mut doc, 9);
        assert_eq!(accordion.expanded(), Some(1));
    }

    #[test]
    fn mount_without_items_fails() {
        let mut doc = Document::new();
        faq(&mut doc, 0);
        assert_eq!(
            Accordion::mount(&mut doc).err(),
            Some(MountError::Empty("#faq".into()))
        );
    }
}
