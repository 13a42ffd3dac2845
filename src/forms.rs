//! Booking and contact forms.
//!
//! Each form is a fixed list of [`FieldSpec`]s. A field is validated when it
//! loses focus and again, together with every other field, on submit. All
//! failures are reported at once: each failing input is marked invalid with
//! its message written next to it, and the form's live region announces the
//! total.
//!
//! There is no network. A valid submit moves the form to
//! [`FormState::Submitting`]; the submission completes on
//! [`FormController::complete_submission`] or, failing that, after
//! `submit_delay_ms`.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::config::{FormsConfig, NotificationConfig};
use crate::dom::{Document, ElementBuilder, NodeId};
use crate::events::{Event, Propagation};
use crate::mount::{MountError, require_class, require_id};
use crate::notify::{Announcer, NoticeKind, Notifier};
use crate::timer::{Clock, Timeout};

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s().-]+$").expect("phone pattern compiles"));

/// A single check applied to a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    /// Optional leading `+`, 10-16 digits, spaces/dashes/dots/parentheses.
    Phone,
    MinLength(usize),
    MaxLength(usize),
}

impl Rule {
    /// Check `value`. Apart from [`Rule::Required`], rules pass on an empty
    /// value so optional fields can stay blank.
    pub fn check(self, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return match self {
                Rule::Required => Err("This field is required.".to_string()),
                _ => Ok(()),
            };
        }
        match self {
            Rule::Required => Ok(()),
            Rule::Email if !EMAIL.is_match(value) => {
                Err("Please enter a valid email address.".to_string())
            }
            Rule::Phone if !is_phone(value) => {
                Err("Please enter a valid phone number.".to_string())
            }
            Rule::MinLength(n) if value.chars().count() < n => {
                Err(format!("Please enter at least {n} characters."))
            }
            Rule::MaxLength(n) if value.chars().count() > n => {
                Err(format!("Please use no more than {n} characters."))
            }
            _ => Ok(()),
        }
    }
}

fn is_phone(value: &str) -> bool {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    PHONE.is_match(value) && (10..=16).contains(&digits)
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// The input's `name` attribute.
    pub name: &'static str,
    pub rules: &'static [Rule],
}

impl FieldSpec {
    /// First failing rule's message.
    pub fn validate(&self, value: &str) -> Result<(), String> {
        self.rules.iter().try_for_each(|rule| rule.check(value))
    }
}

pub const BOOKING_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        rules: &[Rule::Required, Rule::MinLength(2)],
    },
    FieldSpec {
        name: "email",
        rules: &[Rule::Required, Rule::Email],
    },
    FieldSpec {
        name: "phone",
        rules: &[Rule::Required, Rule::Phone],
    },
    FieldSpec {
        name: "service",
        rules: &[Rule::Required],
    },
    FieldSpec {
        name: "date",
        rules: &[Rule::Required],
    },
    FieldSpec {
        name: "message",
        rules: &[Rule::MaxLength(500)],
    },
];

pub const CONTACT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        rules: &[Rule::Required, Rule::MinLength(2)],
    },
    FieldSpec {
        name: "email",
        rules: &[Rule::Required, Rule::Email],
    },
    FieldSpec {
        name: "phone",
        rules: &[Rule::Phone],
    },
    FieldSpec {
        name: "subject",
        rules: &[Rule::Required],
    },
    FieldSpec {
        name: "message",
        rules: &[Rule::Required, Rule::MinLength(10), Rule::MaxLength(1000)],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Booking,
    Contact,
}

impl FormKind {
    pub fn form_id(self) -> &'static str {
        match self {
            FormKind::Booking => "booking-form",
            FormKind::Contact => "contact-form",
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            FormKind::Booking => BOOKING_FIELDS,
            FormKind::Contact => CONTACT_FIELDS,
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            FormKind::Booking => {
                "Thank you! Your appointment request has been received. \
                 We will call you to confirm."
            }
            FormKind::Contact => "Thank you for your message. We will get back to you shortly.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Submitting,
    Submitted,
}

/// Submitted values keyed by field name.
pub type FormValues = BTreeMap<String, String>;

#[derive(Debug)]
struct BoundField {
    spec: FieldSpec,
    input: NodeId,
    error: NodeId,
}

#[derive(Debug)]
pub struct FormController {
    kind: FormKind,
    form: NodeId,
    fields: Vec<BoundField>,
    submit: NodeId,
    submit_label: String,
    status: Announcer,
    state: FormState,
    delivery: Timeout,
    submit_delay_ms: u64,
    clock: Clock,
}

impl FormController {
    /// Bind to `#booking-form` or `#contact-form`. Every field in the form's
    /// spec needs an input with a matching `name`; error slots and the live
    /// region are created when the markup lacks them.
    pub fn mount(
        doc: &mut Document,
        kind: FormKind,
        forms: &FormsConfig,
        notifications: &NotificationConfig,
        clock: Clock,
    ) -> Result<Self, MountError> {
        let form = require_id(doc, kind.form_id())?;
        let submit = require_class(doc, form, "submit-btn")?;

        let mut fields = Vec::with_capacity(kind.fields().len());
        for spec in kind.fields() {
            let input = doc
                .query_attr(form, "name")
                .into_iter()
                .find(|n| doc.attr(*n, "name") == Some(spec.name))
                .ok_or_else(|| {
                    MountError::MissingAnchor(format!("#{} [name={}]", kind.form_id(), spec.name))
                })?;
            let group = doc.parent(input).unwrap_or(form);
            let error = match doc.first_by_class(group, "field-error") {
                Some(node) => node,
                None => ElementBuilder::new(doc, group, "span")
                    .class("field-error")
                    .finish(),
            };
            let error_id = format!("{}-{}-error", kind.form_id(), spec.name);
            doc.set_attr(error, "id", error_id.clone());
            doc.set_attr(input, "aria-describedby", error_id);
            if spec.rules.contains(&Rule::Required) {
                doc.set_flag(input, "aria-required", true);
            }
            fields.push(BoundField {
                spec: *spec,
                input,
                error,
            });
        }

        let region = match doc.first_by_class(form, "form-status") {
            Some(node) => node,
            None => ElementBuilder::new(doc, form, "div")
                .class("form-status")
                .class("sr-only")
                .finish(),
        };
        doc.set_attr(form, "novalidate", "");
        let submit_label = doc.text(submit).to_string();
        Ok(Self {
            kind,
            form,
            fields,
            submit,
            submit_label,
            status: Announcer::new(doc, region, notifications.announcement_ms, clock.clone()),
            state: FormState::Editing,
            delivery: Timeout::default(),
            submit_delay_ms: forms.submit_delay_ms,
            clock,
        })
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn input(&self, name: &str) -> Option<NodeId> {
        self.fields.iter().find(|f| f.spec.name == name).map(|f| f.input)
    }

    pub fn values(&self, doc: &Document) -> FormValues {
        self.fields
            .iter()
            .map(|f| (f.spec.name.to_string(), doc.value(f.input).trim().to_string()))
            .collect()
    }

    fn check(&self, doc: &mut Document, field: usize) -> bool {
        let BoundField { spec, input, error } = &self.fields[field];
        let result = spec.validate(doc.value(*input));
        let valid = result.is_ok();
        doc.set_text(*error, result.err().unwrap_or_default());
        doc.toggle_class(*input, "error", !valid);
        doc.set_flag(*input, "aria-invalid", !valid);
        valid
    }

    /// Validate one field by name. Unknown names validate as `true`.
    pub fn validate_field(&mut self, doc: &mut Document, name: &str) -> bool {
        match self.fields.iter().position(|f| f.spec.name == name) {
            Some(i) => self.check(doc, i),
            None => true,
        }
    }

    /// Validate every field; returns how many failed.
    pub fn validate_all(&mut self, doc: &mut Document) -> usize {
        (0..self.fields.len()).filter(|&i| !self.check(doc, i)).count()
    }

    /// Validate and, if everything passes, start the submission.
    /// Returns whether a submission started.
    pub fn submit(&mut self, doc: &mut Document) -> bool {
        if self.state == FormState::Submitting {
            debug!(form = self.kind.form_id(), "submit ignored, already sending");
            return false;
        }
        let errors = self.validate_all(doc);
        if errors > 0 {
            let noun = if errors == 1 { "error" } else { "errors" };
            self.status
                .announce(doc, &format!("Please correct {errors} {noun} in the form."));
            if let Some(first) = self.fields.iter().find(|f| doc.has_class(f.input, "error")) {
                doc.focus(first.input);
            }
            self.state = FormState::Editing;
            return false;
        }

        self.state = FormState::Submitting;
        doc.set_attr(self.submit, "disabled", "");
        doc.set_flag(self.submit, "aria-busy", true);
        doc.set_text(self.submit, "Sending...");
        self.delivery.start(self.clock.now_ms(), self.submit_delay_ms);
        true
    }

    /// Finish an in-flight submission: notify, reset, and hand back the
    /// values that were sent. `None` when nothing was in flight.
    pub fn complete_submission(
        &mut self,
        doc: &mut Document,
        notifier: &mut Notifier,
    ) -> Option<FormValues> {
        if self.state != FormState::Submitting {
            return None;
        }
        self.delivery.cancel();
        let values = self.values(doc);
        info!(form = self.kind.form_id(), fields = values.len(), "form submitted");
        notifier.show(doc, NoticeKind::Success, self.kind.success_message());
        self.reset(doc);
        self.state = FormState::Submitted;
        Some(values)
    }

    /// Clear every field and error and restore the submit button.
    pub fn reset(&mut self, doc: &mut Document) {
        for field in &self.fields {
            doc.set_attr(field.input, "value", "");
            doc.set_text(field.error, "");
            doc.remove_class(field.input, "error");
            doc.remove_attr(field.input, "aria-invalid");
        }
        doc.remove_attr(self.submit, "disabled");
        doc.remove_attr(self.submit, "aria-busy");
        doc.set_text(self.submit, self.submit_label.clone());
        self.delivery.cancel();
        self.state = FormState::Editing;
    }

    /// Complete a submission whose delay ran out. Returns the sent values.
    pub fn tick(&mut self, doc: &mut Document, notifier: &mut Notifier) -> Option<FormValues> {
        self.status.tick(doc);
        if self.delivery.fire(self.clock.now_ms()) {
            return self.complete_submission(doc, notifier);
        }
        None
    }

    pub fn handle_event(&mut self, doc: &mut Document, event: &Event) -> Propagation {
        match event {
            Event::Submit { form } if *form == self.form => {
                self.submit(doc);
                Propagation::PreventDefault
            }
            Event::Click { target } if doc.contains(self.submit, *target) => {
                self.submit(doc);
                Propagation::PreventDefault
            }
            Event::Blur { target } => match self.fields.iter().position(|f| f.input == *target) {
                Some(i) => {
                    self.check(doc, i);
                    Propagation::Handled
                }
                None => Propagation::Ignored,
            },
            Event::Input { target, .. } => {
                let Some(i) = self.fields.iter().position(|f| f.input == *target) else {
                    return Propagation::Ignored;
                };
                if self.state == FormState::Submitted {
                    self.state = FormState::Editing;
                }
                // Clear a stale error as soon as the value becomes valid.
                if doc.has_class(self.fields[i].input, "error") {
                    self.check(doc, i);
                }
                Propagation::Handled
            }
            _ => Propagation::Ignored,
        }
    }
}
