//! End-to-end flows over the sample page: a host dispatching events and
//! advancing a manual clock, the way a browser binding would.

use clinic_widgets::config::WidgetConfig;
use clinic_widgets::content::SiteContent;
use clinic_widgets::dom::{Document, NodeId};
use clinic_widgets::events::{Event, Key, Propagation};
use clinic_widgets::forms::{FormKind, FormState};
use clinic_widgets::overlay::{BOOKING_MODAL, NO_SCROLL};
use clinic_widgets::page::{Hosts, Page, build_document};
use clinic_widgets::timer::Clock;

fn sample_page() -> Page {
    let config = WidgetConfig::default();
    let doc = build_document(&SiteContent::sample(), &config);
    Page::mount(doc, &config, Clock::manual(), Hosts::default())
}

fn by_id(doc: &Document, id: &str) -> NodeId {
    doc.get_element_by_id(id)
        .unwrap_or_else(|| panic!("element #{id} not found"))
}

fn type_into(page: &mut Page, id: &str, value: &str) {
    let target = by_id(page.doc(), id);
    page.dispatch(&Event::Input {
        target,
        value: value.to_string(),
    });
}

fn advance(page: &mut Page, ms: u64) -> Vec<(FormKind, clinic_widgets::forms::FormValues)> {
    page.clock().advance(ms);
    page.tick()
}

#[test]
fn testimonials_autoplay_and_hold_on_hover() {
    let mut page = sample_page();
    assert_eq!(page.testimonials().unwrap().current_index(), 0);

    advance(&mut page, 5000);
    assert_eq!(page.testimonials().unwrap().current_index(), 1);

    let root = page.testimonials().unwrap().root();
    page.dispatch(&Event::PointerEnter { target: root });
    advance(&mut page, 12_000);
    assert_eq!(page.testimonials().unwrap().current_index(), 1);

    page.dispatch(&Event::PointerLeave { target: root });
    advance(&mut page, 5000);
    assert_eq!(page.testimonials().unwrap().current_index(), 2);
}

#[test]
fn calculator_renders_breakdown_from_selects() {
    let mut page = sample_page();
    type_into(&mut page, "treatment-type", "invisalign");
    type_into(&mut page, "treatment-duration", "short");
    type_into(&mut page, "case-complexity", "simple");

    let form = by_id(page.doc(), "cost-calculator");
    let button = page.doc().first_by_class(form, "calculate-btn").unwrap();
    let outcome = page.dispatch(&Event::Click { target: button });
    assert_eq!(outcome, Propagation::PreventDefault);

    let estimate = page.calculator().unwrap().last_estimate().unwrap();
    assert_eq!(estimate.subtotal, 4150);
    let result = by_id(page.doc(), "cost-result");
    assert!(page.doc().has_class(result, "show"));
    assert!(page.doc().text_content(result).contains("$4,150"));
}

#[test]
fn gallery_filter_then_unknown_category() {
    let mut page = sample_page();
    let gallery = page.gallery().unwrap().root();
    let button = page
        .doc()
        .query_class(gallery, "filter-btn")
        .into_iter()
        .find(|b| page.doc().data(*b, "filter") == Some("invisalign"))
        .unwrap();
    page.dispatch(&Event::Click { target: button });
    assert_eq!(page.gallery().unwrap().visible(page.doc()).len(), 2);

    let results = page.doc().first_by_class(gallery, "filter-results").unwrap();
    assert_eq!(page.doc().text(results), "2 results");
}

#[test]
fn faq_keyboard_toggle_keeps_one_open() {
    let mut page = sample_page();
    let faq = by_id(page.doc(), "faq");
    let questions = page.doc().query_class(faq, "faq-question");

    page.dispatch(&Event::Click {
        target: questions[0],
    });
    let outcome = page.dispatch(&Event::KeyDown {
        target: questions[2],
        key: Key::Enter,
    });
    assert_eq!(outcome, Propagation::PreventDefault);
    assert_eq!(page.faq().unwrap().expanded(), Some(2));
}

#[test]
fn booking_flow_closes_modal_after_delivery() {
    let mut page = sample_page();
    let trigger = page
        .doc()
        .query_attr(page.doc().body(), "data-open-modal")
        .into_iter()
        .find(|n| page.doc().attr(*n, "data-open-modal") == Some(BOOKING_MODAL))
        .unwrap();
    page.dispatch(&Event::Click { target: trigger });
    assert!(page.modal().unwrap().is_open());
    assert!(page.doc().has_class(page.doc().body(), NO_SCROLL));

    let form = page.form(FormKind::Booking).unwrap().form();
    page.dispatch(&Event::Submit { form });
    assert_eq!(page.form(FormKind::Booking).unwrap().state(), FormState::Editing);

    type_into(&mut page, "booking-form-name", "Ana Silva");
    type_into(&mut page, "booking-form-email", "ana@example.com");
    type_into(&mut page, "booking-form-phone", "(555) 123-4567");
    type_into(&mut page, "booking-form-service", "Invisalign");
    type_into(&mut page, "booking-form-date", "2026-11-02");
    page.dispatch(&Event::Submit { form });
    assert_eq!(
        page.form(FormKind::Booking).unwrap().state(),
        FormState::Submitting
    );

    let delivered = advance(&mut page, 1500);
    assert_eq!(delivered.len(), 1);
    let (kind, values) = &delivered[0];
    assert_eq!(*kind, FormKind::Booking);
    assert_eq!(values["email"], "ana@example.com");

    assert!(!page.modal().unwrap().is_open());
    assert!(!page.scroll_lock().is_locked());
    assert!(!page.doc().has_class(page.doc().body(), NO_SCROLL));
    assert_eq!(page.notifier().visible_messages(page.doc()).len(), 1);

    advance(&mut page, 5000);
    assert!(page.notifier().visible_messages(page.doc()).is_empty());
}

#[test]
fn escape_closes_modal() {
    let mut page = sample_page();
    let trigger = page
        .doc()
        .query_attr(page.doc().body(), "data-open-modal")
        .into_iter()
        .next()
        .unwrap();
    page.doc_mut().focus(trigger);
    page.dispatch(&Event::Click { target: trigger });
    assert_ne!(page.doc().focused(), Some(trigger));
    let body = page.doc().body();
    page.dispatch(&Event::KeyDown {
        target: body,
        key: Key::Escape,
    });
    assert!(!page.modal().unwrap().is_open());
    assert_eq!(page.doc().focused(), Some(trigger));
}
