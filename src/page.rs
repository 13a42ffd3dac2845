//! Page composition root.
//!
//! [`Page`] owns the document, the clock, the shared scroll lock and every
//! controller. Each controller is mounted exactly once; a controller that
//! cannot find its anchors stays [`Mount::NotMounted`] and the rest of the
//! page works regardless. Hosts feed input through [`Page::dispatch`] and
//! drive time through [`Page::tick`].
//!
//! [`build_document`] lays out the in-memory equivalent of
//! [`crate::markup::render_page`] so the whole page can run without a
//! browser (tests, the `check` command).

use tracing::{debug, info};

use crate::accordion::{Accordion, FAQ_ROOT};
use crate::calculator::{Complexity, CostCalculator, DurationBucket, Treatment};
use crate::carousel::{Slide, TESTIMONIALS_ROOT, TOUR_ROOT, TestimonialCarousel, TourCarousel};
use crate::config::WidgetConfig;
use crate::content::SiteContent;
use crate::dom::{Document, ElementBuilder, NodeId};
use crate::events::{Event, Propagation};
use crate::filter::{ALL, BLOG_ROOT, FilterGrid, GALLERY_ROOT};
use crate::forms::{FormController, FormKind, FormValues};
use crate::hero::{HERO_CANVAS, HeroScene, SceneBackend};
use crate::map::{ContactMap, MAP_ROOT, MapBackend};
use crate::markup::{NAV_LINKS, category_label, markdown_text};
use crate::mount::{Mount, MountError};
use crate::notify::Notifier;
use crate::overlay::{BOOKING_MODAL, MobileMenu, Modal, PRIMARY_NAV, ScrollLock};
use crate::scroll_fx::ScrollEffects;
use crate::timer::Clock;

// ============================================================================
// Document layout
// ============================================================================

/// Build the page tree for `content`.
pub fn build_document(content: &SiteContent, config: &WidgetConfig) -> Document {
    let mut doc = Document::new();
    let body = doc.body();
    let d = &mut doc;

    let header = ElementBuilder::new(d, body, "header").class("site-header").finish();
    ElementBuilder::new(d, header, "button").class("menu-toggle").finish();
    let nav = ElementBuilder::new(d, header, "nav").id(PRIMARY_NAV).finish();
    for (anchor, label) in NAV_LINKS {
        ElementBuilder::new(d, nav, "a")
            .attr("href", format!("#{anchor}"))
            .text(label)
            .finish();
    }
    ElementBuilder::new(d, header, "button")
        .data("open-modal", BOOKING_MODAL)
        .text("Book Appointment")
        .finish();

    let main = d.append(body, "main");
    let hero = ElementBuilder::new(d, main, "section").class("hero").finish();
    ElementBuilder::new(d, hero, "div").class("hero-bg").data("speed", "0.5").finish();
    ElementBuilder::new(d, hero, "div").id(HERO_CANVAS).finish();

    let services = ElementBuilder::new(d, main, "section").id("services").finish();
    for (i, service) in content.services.iter().enumerate() {
        ElementBuilder::new(d, services, "div")
            .class("service-card")
            .class("animate-on-scroll")
            .data("animation", "fade-up")
            .data("delay", (i * 100).to_string())
            .text(service.clone())
            .finish();
    }
    let stats = ElementBuilder::new(d, main, "section").class("stats").finish();
    for stat in &content.stats {
        ElementBuilder::new(d, stats, "span")
            .class("counter")
            .data("target", stat.value.to_string())
            .data("suffix", stat.suffix.clone())
            .finish();
    }

    carousel(d, main, TESTIMONIALS_ROOT, &content.testimonials);
    carousel(d, main, TOUR_ROOT, &content.tour);

    let cases: Vec<_> = content
        .cases
        .iter()
        .map(|c| (c.category.as_str(), format!("{} {}", c.title, c.description)))
        .collect();
    filter_section(d, main, GALLERY_ROOT, &content.case_categories(), &cases, false);
    calculator(d, main);
    let posts: Vec<_> = content
        .posts
        .iter()
        .map(|p| (p.category.as_str(), format!("{} {}", p.title, markdown_text(&p.excerpt))))
        .collect();
    filter_section(d, main, BLOG_ROOT, &content.post_categories(), &posts, true);

    let faq = ElementBuilder::new(d, main, "section").id(FAQ_ROOT).finish();
    for item in &content.faq {
        let entry = ElementBuilder::new(d, faq, "div").class("faq-item").finish();
        ElementBuilder::new(d, entry, "button")
            .class("faq-question")
            .text(item.question.clone())
            .finish();
        ElementBuilder::new(d, entry, "div")
            .class("faq-answer")
            .text(item.answer.clone())
            .finish();
    }

    let contact = ElementBuilder::new(d, main, "section").id("contact").finish();
    form(d, contact, FormKind::Contact, "Send Message");
    ElementBuilder::new(d, contact, "div").id(MAP_ROOT).finish();

    let modal = ElementBuilder::new(d, body, "div").id(BOOKING_MODAL).class("modal").finish();
    let modal_content = ElementBuilder::new(d, modal, "div").class("modal-content").finish();
    ElementBuilder::new(d, modal_content, "button").class("modal-close").text("×").finish();
    let booking = form(d, modal_content, FormKind::Booking, "Request Appointment");
    let service_select = d
        .query_attr(booking, "name")
        .into_iter()
        .find(|n| d.attr(*n, "name") == Some("service"));
    if let Some(select) = service_select {
        for service in &content.services {
            ElementBuilder::new(d, select, "option")
                .attr("value", service.clone())
                .text(service.clone())
                .finish();
        }
    }

    ElementBuilder::new(d, body, "div")
        .id("notification-area")
        .class("notification-area")
        .finish();
    debug!(
        title = %config.contact.practice_name,
        elements = doc.descendants(body).len(),
        "document built"
    );
    doc
}

fn carousel<S: Slide>(doc: &mut Document, parent: NodeId, root_id: &str, slides: &[S]) {
    let root = ElementBuilder::new(doc, parent, "div")
        .id(root_id)
        .class("carousel")
        .finish();
    let track = ElementBuilder::new(doc, root, "div").class("carousel-track").finish();
    for (i, slide) in slides.iter().enumerate() {
        let node = slide.build(doc, track);
        doc.toggle_class(node, "active", i == 0);
    }
    for class in ["carousel-prev", "carousel-next"] {
        ElementBuilder::new(doc, root, "button").class(class).finish();
    }
    ElementBuilder::new(doc, root, "div").class("carousel-dots").finish();
    ElementBuilder::new(doc, root, "button").class("carousel-toggle").finish();
    ElementBuilder::new(doc, root, "div")
        .class("carousel-live")
        .class("sr-only")
        .finish();
}

fn filter_section(
    doc: &mut Document,
    parent: NodeId,
    root_id: &str,
    categories: &[&str],
    items: &[(&str, String)],
    searchable: bool,
) {
    let root = ElementBuilder::new(doc, parent, "section").id(root_id).finish();
    for tag in std::iter::once(ALL).chain(categories.iter().copied()) {
        ElementBuilder::new(doc, root, "button")
            .class("filter-btn")
            .data("filter", tag)
            .text(category_label(tag))
            .finish();
    }
    if searchable {
        ElementBuilder::new(doc, root, "input").class("filter-search").finish();
    }
    let grid = ElementBuilder::new(doc, root, "div").class("filter-grid").finish();
    for (category, text) in items {
        ElementBuilder::new(doc, grid, "article")
            .class("filter-item")
            .data("category", *category)
            .text(text.clone())
            .finish();
    }
    ElementBuilder::new(doc, root, "p").class("filter-empty").class("hidden").finish();
    if searchable {
        ElementBuilder::new(doc, root, "button").class("load-more").finish();
    }
}

fn calculator(doc: &mut Document, parent: NodeId) {
    let section = ElementBuilder::new(doc, parent, "section").id("calculator").finish();
    let form = ElementBuilder::new(doc, section, "form").id("cost-calculator").finish();
    let selects: [(&str, Vec<&str>); 3] = [
        ("treatment-type", Treatment::ALL.iter().map(|t| t.key()).collect()),
        ("treatment-duration", DurationBucket::ALL.iter().map(|d| d.key()).collect()),
        ("case-complexity", Complexity::ALL.iter().map(|c| c.key()).collect()),
    ];
    for (id, options) in selects {
        let select = ElementBuilder::new(doc, form, "select").id(id).finish();
        for value in options {
            ElementBuilder::new(doc, select, "option").attr("value", value).finish();
        }
    }
    ElementBuilder::new(doc, form, "button").class("calculate-btn").finish();
    ElementBuilder::new(doc, form, "p").class("calculator-error").finish();
    let result = ElementBuilder::new(doc, section, "div").id("cost-result").finish();
    for field in [
        "base",
        "consultation",
        "imaging",
        "retainers",
        "subtotal",
        "monthly",
        "insurance",
        "patient",
    ] {
        ElementBuilder::new(doc, result, "span").data("field", field).finish();
    }
}

fn form(doc: &mut Document, parent: NodeId, kind: FormKind, submit_label: &str) -> NodeId {
    let form = ElementBuilder::new(doc, parent, "form").id(kind.form_id()).finish();
    for spec in kind.fields() {
        let group = ElementBuilder::new(doc, form, "div").class("form-group").finish();
        let tag = match spec.name {
            "service" => "select",
            "message" => "textarea",
            _ => "input",
        };
        ElementBuilder::new(doc, group, tag)
            .id(&format!("{}-{}", kind.form_id(), spec.name))
            .attr("name", spec.name)
            .finish();
        ElementBuilder::new(doc, group, "span").class("field-error").finish();
    }
    ElementBuilder::new(doc, form, "button")
        .class("submit-btn")
        .text(submit_label)
        .finish();
    form
}

// ============================================================================
// Composition root
// ============================================================================

/// Host-provided libraries. Anything left `None` gets its static fallback.
#[derive(Default)]
pub struct Hosts<'a> {
    pub scene: Option<Box<dyn SceneBackend>>,
    pub map: Option<&'a mut dyn MapBackend>,
    /// Initial viewport size for the hero scene.
    pub viewport: (f64, f64),
}

/// Mount outcome of one widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetStatus {
    pub widget: &'static str,
    pub error: Option<MountError>,
}

impl WidgetStatus {
    fn of<T>(widget: &'static str, mount: &Mount<T>) -> Self {
        Self {
            widget,
            error: mount.reason().cloned(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug)]
pub struct Page {
    doc: Document,
    clock: Clock,
    lock: ScrollLock,
    notifier: Notifier,
    testimonials: Mount<TestimonialCarousel>,
    tour: Mount<TourCarousel>,
    calculator: Mount<CostCalculator>,
    gallery: Mount<FilterGrid>,
    blog: Mount<FilterGrid>,
    faq: Mount<Accordion>,
    modal: Mount<Modal>,
    menu: Mount<MobileMenu>,
    booking: Mount<FormController>,
    contact: Mount<FormController>,
    effects: Mount<ScrollEffects>,
    hero: Mount<HeroScene>,
    map: Mount<ContactMap>,
}

impl Page {
    /// Mount every widget on `doc`.
    pub fn mount(mut doc: Document, config: &WidgetConfig, clock: Clock, hosts: Hosts<'_>) -> Self {
        let d = &mut doc;
        let notifier = Notifier::mount(d, &config.notifications, clock.clone());
        let announce_ms = config.notifications.announcement_ms;
        let form = |d: &mut Document, kind: FormKind| {
            Mount::from_result(
                kind.form_id(),
                FormController::mount(d, kind, &config.forms, &config.notifications, clock.clone()),
            )
        };
        let booking = form(d, FormKind::Booking);
        let contact = form(d, FormKind::Contact);

        let page = Self {
            testimonials: Mount::from_result(
                "testimonials",
                TestimonialCarousel::mount(d, TESTIMONIALS_ROOT, &config.carousel, clock.clone()),
            ),
            tour: Mount::from_result(
                "tour",
                TourCarousel::mount(d, TOUR_ROOT, &config.carousel, clock.clone()),
            ),
            calculator: Mount::from_result(
                "calculator",
                CostCalculator::mount(d, &config.calculator),
            ),
            gallery: Mount::from_result("gallery", FilterGrid::mount(d, GALLERY_ROOT)),
            blog: Mount::from_result("blog", FilterGrid::mount(d, BLOG_ROOT)),
            faq: Mount::from_result("faq", Accordion::mount(d)),
            modal: Mount::from_result(
                "booking-modal",
                Modal::mount(d, BOOKING_MODAL, "Booking form", announce_ms, clock.clone()),
            ),
            menu: Mount::from_result("mobile-menu", MobileMenu::mount(d)),
            booking,
            contact,
            effects: Mount::from_result(
                "scroll-effects",
                ScrollEffects::mount(d, &config.animations, clock.clone()),
            ),
            hero: Mount::from_result("hero", HeroScene::mount(d, hosts.scene, hosts.viewport)),
            map: Mount::from_result("map", ContactMap::mount(d, &config.contact, hosts.map)),
            notifier,
            lock: ScrollLock::new(),
            clock,
            doc,
        };
        let mounted = page.status().iter().filter(|s| s.is_mounted()).count();
        info!(mounted, total = page.status().len(), "page mounted");
        page
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.lock
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn testimonials(&mut self) -> Option<&mut TestimonialCarousel> {
        self.testimonials.get_mut()
    }

    pub fn tour(&mut self) -> Option<&mut TourCarousel> {
        self.tour.get_mut()
    }

    pub fn calculator(&self) -> Option<&CostCalculator> {
        self.calculator.get()
    }

    pub fn gallery(&self) -> Option<&FilterGrid> {
        self.gallery.get()
    }

    pub fn blog(&self) -> Option<&FilterGrid> {
        self.blog.get()
    }

    pub fn faq(&self) -> Option<&Accordion> {
        self.faq.get()
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.get()
    }

    pub fn form(&self, kind: FormKind) -> Option<&FormController> {
        match kind {
            FormKind::Booking => self.booking.get(),
            FormKind::Contact => self.contact.get(),
        }
    }

    /// Mount outcome of every widget, in mount order.
    pub fn status(&self) -> Vec<WidgetStatus> {
        vec![
            WidgetStatus::of("testimonials", &self.testimonials),
            WidgetStatus::of("tour", &self.tour),
            WidgetStatus::of("calculator", &self.calculator),
            WidgetStatus::of("gallery", &self.gallery),
            WidgetStatus::of("blog", &self.blog),
            WidgetStatus::of("faq", &self.faq),
            WidgetStatus::of("booking-modal", &self.modal),
            WidgetStatus::of("mobile-menu", &self.menu),
            WidgetStatus::of("booking-form", &self.booking),
            WidgetStatus::of("contact-form", &self.contact),
            WidgetStatus::of("scroll-effects", &self.effects),
            WidgetStatus::of("hero", &self.hero),
            WidgetStatus::of("map", &self.map),
        ]
    }

    /// Route one host event to every mounted controller.
    pub fn dispatch(&mut self, event: &Event) -> Propagation {
        if let Event::Input { target, value } = event {
            self.doc.set_attr(*target, "value", value.clone());
        }
        let doc = &mut self.doc;
        let lock = &mut self.lock;
        let mut out = Propagation::Ignored;

        if let Some(modal) = self.modal.get_mut() {
            out = out.merge(modal.handle_event(doc, event, lock));
        }
        if let Some(menu) = self.menu.get_mut() {
            out = out.merge(menu.handle_event(doc, event, lock));
        }
        if let Some(c) = self.testimonials.get_mut() {
            out = out.merge(c.handle_event(doc, event));
        }
        if let Some(c) = self.tour.get_mut() {
            out = out.merge(c.handle_event(doc, event));
        }
        if let Some(calc) = self.calculator.get_mut() {
            out = out.merge(calc.handle_event(doc, event));
        }
        for grid in [&mut self.gallery, &mut self.blog] {
            if let Some(grid) = grid.get_mut() {
                out = out.merge(grid.handle_event(doc, event, &mut self.notifier));
            }
        }
        if let Some(faq) = self.faq.get_mut() {
            out = out.merge(faq.handle_event(doc, event));
        }
        for form in [&mut self.booking, &mut self.contact] {
            if let Some(form) = form.get_mut() {
                out = out.merge(form.handle_event(doc, event));
            }
        }
        if let Some(fx) = self.effects.get_mut() {
            out = out.merge(fx.handle_event(doc, event));
        }
        if let Some(hero) = self.hero.get_mut() {
            out = out.merge(hero.handle_event(doc, event));
        }
        out = out.merge(self.notifier.handle_event(doc, event));
        out
    }

    /// Finish an in-flight form submission now, as if the server replied.
    pub fn complete_submission(&mut self, kind: FormKind) -> Option<FormValues> {
        let form = match kind {
            FormKind::Booking => self.booking.get_mut(),
            FormKind::Contact => self.contact.get_mut(),
        }?;
        let values = form.complete_submission(&mut self.doc, &mut self.notifier)?;
        if kind == FormKind::Booking {
            self.close_booking_modal();
        }
        Some(values)
    }

    fn close_booking_modal(&mut self) {
        if let Some(modal) = self.modal.get_mut() {
            modal.close(&mut self.doc, &mut self.lock);
        }
    }

    /// Advance every timer-driven controller to the clock's current time and
    /// draw one hero frame. Returns the form submissions that completed.
    pub fn tick(&mut self) -> Vec<(FormKind, FormValues)> {
        let doc = &mut self.doc;
        if let Some(c) = self.testimonials.get_mut() {
            c.tick(doc);
        }
        if let Some(c) = self.tour.get_mut() {
            c.tick(doc);
        }
        if let Some(fx) = self.effects.get_mut() {
            fx.tick(doc);
        }
        if let Some(modal) = self.modal.get_mut() {
            modal.tick(doc);
        }
        if let Some(hero) = self.hero.get_mut() {
            hero.frame();
        }

        let mut delivered = Vec::new();
        for (kind, form) in [
            (FormKind::Booking, &mut self.booking),
            (FormKind::Contact, &mut self.contact),
        ] {
            if let Some(values) = form.get_mut().and_then(|f| f.tick(doc, &mut self.notifier)) {
                delivered.push((kind, values));
            }
        }
        self.notifier.tick(doc);
        if delivered.iter().any(|(kind, _)| *kind == FormKind::Booking) {
            self.close_booking_modal();
        }
        delivered
    }
}
