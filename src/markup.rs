//! Page markup.
//!
//! Renders the single-page site with every anchor the controllers bind to.
//! The element ids and classes here are the other half of each controller's
//! markup contract; [`crate::page::build_document`] lays out the same tree
//! for in-memory use.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time templating with
//! automatic escaping. Blog excerpts are markdown, rendered with
//! pulldown-cmark.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Event as MdEvent, Parser, html as md_html};

use crate::accordion::FAQ_ROOT;
use crate::calculator::{Complexity, DurationBucket, Treatment};
use crate::carousel::{TESTIMONIALS_ROOT, TOUR_ROOT, stars};
use crate::config::{self, WidgetConfig};
use crate::content::{BlogPost, GalleryCase, SiteContent, Testimonial, TourSlide};
use crate::filter::{ALL, BLOG_ROOT, GALLERY_ROOT};
use crate::forms::FormKind;
use crate::hero::HERO_CANVAS;
use crate::map::MAP_ROOT;
use crate::overlay::{BOOKING_MODAL, PRIMARY_NAV};

const CSS_STATIC: &str = include_str!("../static/widgets.css");

/// Section anchors listed in the primary navigation.
pub const NAV_LINKS: [(&str, &str); 6] = [
    ("services", "Services"),
    ("testimonials", "Reviews"),
    (GALLERY_ROOT, "Results"),
    ("calculator", "Costs"),
    (BLOG_ROOT, "Blog"),
    ("contact", "Contact"),
];

/// Render markdown to HTML.
pub fn markdown_html(source: &str) -> String {
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new(source));
    out
}

/// Plain text of a markdown snippet, for search and screen readers.
pub fn markdown_text(source: &str) -> String {
    let mut out = String::new();
    for event in Parser::new(source) {
        match event {
            MdEvent::Text(t) | MdEvent::Code(t) => out.push_str(&t),
            MdEvent::SoftBreak | MdEvent::HardBreak => out.push(' '),
            _ => {}
        }
    }
    out
}

/// Capitalize a category tag for its filter button.
pub fn category_label(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>().replace('-', " "),
        None => String::new(),
    }
}

/// Render the complete page.
pub fn render_page(content: &SiteContent, config: &WidgetConfig) -> Markup {
    let css = format!("{}\n\n{}", config::generate_theme_css(config), CSS_STATIC);
    let testimonials = html! {
        @for (i, t) in content.testimonials.iter().enumerate() { (testimonial_slide(t, i == 0)) }
    };
    let tour = html! {
        @for (i, s) in content.tour.iter().enumerate() { (tour_slide(s, i == 0)) }
    };
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (config.contact.practice_name) }
                style { (PreEscaped(css)) }
            }
            body {
                (site_header(config))
                main {
                    (hero(config))
                    (services(content))
                    (stats(content))
                    (carousel_section(
                        "testimonials", "What our patients say", TESTIMONIALS_ROOT, testimonials
                    ))
                    (carousel_section("tour", "Tour our practice", TOUR_ROOT, tour))
                    (gallery(content))
                    (calculator())
                    (blog(content))
                    (faq(content))
                    (contact(config))
                }
                (booking_modal(content))
                div #notification-area .notification-area aria-live="polite" {}
                div .modal-announcer .sr-only aria-live="polite" {}
            }
        }
    }
}

fn site_header(config: &WidgetConfig) -> Markup {
    html! {
        header .site-header {
            a .logo href="#" { (config.contact.practice_name) }
            button .menu-toggle type="button" aria-label="Menu"
                aria-controls=(PRIMARY_NAV) aria-expanded="false" {
                span .hamburger-line {}
                span .hamburger-line {}
                span .hamburger-line {}
            }
            nav #(PRIMARY_NAV) {
                ul {
                    @for (anchor, label) in NAV_LINKS {
                        li { a href={ "#" (anchor) } { (label) } }
                    }
                }
            }
            button .btn-primary type="button" data-open-modal=(BOOKING_MODAL) { "Book Appointment" }
        }
    }
}

fn hero(config: &WidgetConfig) -> Markup {
    html! {
        section .hero {
            div .hero-bg data-speed="0.5" {}
            div #(HERO_CANVAS) {}
            div .hero-content {
                h1 { "Confident smiles start here" }
                p { "Modern orthodontic care at " (config.contact.practice_name) "." }
                button .btn-primary type="button" data-open-modal=(BOOKING_MODAL) {
                    "Book a free consultation"
                }
            }
        }
    }
}

fn services(content: &SiteContent) -> Markup {
    html! {
        section #services {
            h2 { "Our services" }
            div .services-grid {
                @for (i, service) in content.services.iter().enumerate() {
                    div .service-card .animate-on-scroll
                        data-animation="fade-up" data-delay=(i * 100) {
                        h3 { (service) }
                    }
                }
            }
        }
    }
}

fn stats(content: &SiteContent) -> Markup {
    html! {
        section .stats {
            @for stat in &content.stats {
                div .stat {
                    span .counter data-target=(stat.value) data-suffix=(stat.suffix) {
                        "0" (stat.suffix)
                    }
                    span .stat-label { (stat.label) }
                }
            }
        }
    }
}

fn testimonial_slide(t: &Testimonial, active: bool) -> Markup {
    html! {
        div .carousel-slide .testimonial-slide .active[active]
            data-rating=(t.rating) data-treatment=[t.treatment.as_deref()] {
            span .testimonial-rating aria-label={ (t.rating) " out of 5 stars" } {
                (stars(t.rating))
            }
            blockquote .testimonial-text { (t.text) }
            cite .testimonial-author { (t.author) }
        }
    }
}

fn tour_slide(s: &TourSlide, active: bool) -> Markup {
    html! {
        figure .carousel-slide .tour-slide .active[active] data-label=(s.label) {
            img src=(s.image) alt=(s.alt) loading="lazy";
            figcaption .tour-label { (s.label) }
        }
    }
}

fn carousel_section(section_id: &str, heading: &str, root_id: &str, slides: Markup) -> Markup {
    html! {
        section #(section_id) {
            h2 { (heading) }
            div #(root_id) .carousel aria-label=(heading) {
                div .carousel-track { (slides) }
                button .carousel-prev type="button" aria-label="Previous slide" { "‹" }
                button .carousel-next type="button" aria-label="Next slide" { "›" }
                div .carousel-dots {}
                button .carousel-toggle type="button" aria-label="Pause automatic slide show" {}
                div .carousel-live .sr-only aria-live="polite" aria-atomic="true" {}
            }
        }
    }
}

fn filter_buttons(categories: &[&str]) -> Markup {
    html! {
        div .filter-buttons role="group" aria-label="Filter by category" {
            button .filter-btn .active type="button" data-filter=(ALL) aria-pressed="true" { "All" }
            @for tag in categories {
                button .filter-btn type="button" data-filter=(tag) aria-pressed="false" {
                    (category_label(tag))
                }
            }
        }
    }
}

fn case_card(case: &GalleryCase) -> Markup {
    html! {
        article .filter-item .case-card data-category=(case.category) {
            div .case-images {
                img src=(case.before) alt={ (case.title) " before treatment" } loading="lazy";
                img src=(case.after) alt={ (case.title) " after treatment" } loading="lazy";
            }
            h3 { (case.title) }
            p .case-meta { (category_label(&case.category)) " · " (case.months) " months" }
            @if !case.description.is_empty() {
                p { (case.description) }
            }
        }
    }
}

fn gallery(content: &SiteContent) -> Markup {
    html! {
        section #(GALLERY_ROOT) {
            h2 { "Before and after" }
            (filter_buttons(&content.case_categories()))
            div .filter-grid {
                @for case in &content.cases { (case_card(case)) }
            }
            p .filter-empty .hidden { "No cases in this category yet." }
            p .filter-results .sr-only aria-live="polite" {}
        }
    }
}

fn select(id: &str, label: &str, options: &[(&str, &str)]) -> Markup {
    html! {
        div .form-group {
            label for=(id) { (label) }
            select #(id) name=(id) {
                option value="" { "Select..." }
                @for (value, text) in options {
                    option value=(value) { (text) }
                }
            }
        }
    }
}

fn calculator() -> Markup {
    let treatments: Vec<_> = Treatment::ALL.iter().map(|t| (t.key(), t.label())).collect();
    let durations: Vec<_> = DurationBucket::ALL.iter().map(|d| (d.key(), d.label())).collect();
    let complexities: Vec<_> = Complexity::ALL.iter().map(|c| (c.key(), c.label())).collect();
    let rows = [
        ("base", "Treatment"),
        ("consultation", "Consultation"),
        ("imaging", "X-rays and scans"),
        ("retainers", "Retainers"),
        ("subtotal", "Total"),
        ("monthly", "Monthly payment"),
        ("insurance", "Estimated insurance"),
        ("patient", "Your share"),
    ];
    html! {
        section #calculator {
            h2 { "Estimate your treatment cost" }
            form #cost-calculator {
                (select("treatment-type", "Treatment", &treatments))
                (select("treatment-duration", "Expected duration", &durations))
                (select("case-complexity", "Case complexity", &complexities))
                button .calculate-btn type="button" { "Calculate" }
                p .calculator-error role="alert" {}
            }
            div #cost-result aria-hidden="true" {
                dl {
                    @for (field, label) in rows {
                        dt { (label) }
                        dd { span data-field=(field) {} }
                    }
                }
            }
        }
    }
}

fn post_card(post: &BlogPost) -> Markup {
    html! {
        article .filter-item .post-card data-category=(post.category) {
            h3 { (post.title) }
            p .post-meta {
                time datetime=(post.date) { (post.date) }
                @if !post.author.is_empty() { " · " (post.author) }
            }
            div .post-excerpt { (PreEscaped(markdown_html(&post.excerpt))) }
        }
    }
}

fn blog(content: &SiteContent) -> Markup {
    html! {
        section #(BLOG_ROOT) {
            h2 { "From our blog" }
            (filter_buttons(&content.post_categories()))
            input .filter-search type="search" placeholder="Search articles"
                aria-label="Search articles";
            div .filter-grid {
                @for post in &content.posts { (post_card(post)) }
            }
            p .filter-empty .hidden { "No articles match your search." }
            p .filter-results .sr-only aria-live="polite" {}
            button .load-more type="button" { "Load more" }
        }
    }
}

fn faq(content: &SiteContent) -> Markup {
    html! {
        section #(FAQ_ROOT) {
            h2 { "Frequently asked questions" }
            @for (i, item) in content.faq.iter().enumerate() {
                div .faq-item {
                    button .faq-question type="button" aria-expanded="false"
                        aria-controls={ "faq-answer-" (i + 1) } { (item.question) }
                    div .faq-answer #(format!("faq-answer-{}", i + 1))
                        role="region" aria-hidden="true" {
                        p { (item.answer) }
                    }
                }
            }
        }
    }
}

/// One labeled input with its error slot.
fn field(kind: FormKind, name: &str, label: &str, control: Markup) -> Markup {
    let error_id = format!("{}-{}-error", kind.form_id(), name);
    html! {
        div .form-group {
            label for={ (kind.form_id()) "-" (name) } { (label) }
            (control)
            span .field-error #(error_id) {}
        }
    }
}

fn input(kind: FormKind, name: &str, input_type: &str) -> Markup {
    html! {
        input #(format!("{}-{}", kind.form_id(), name)) type=(input_type) name=(name);
    }
}

fn textarea(kind: FormKind, name: &str, max: usize) -> Markup {
    html! {
        textarea #(format!("{}-{}", kind.form_id(), name)) name=(name) maxlength=(max) {}
    }
}

fn contact(config: &WidgetConfig) -> Markup {
    let kind = FormKind::Contact;
    html! {
        section #contact {
            h2 { "Get in touch" }
            address { (config.contact.practice_name) br; (config.contact.address) }
            form #(kind.form_id()) novalidate {
                (field(kind, "name", "Name", input(kind, "name", "text")))
                (field(kind, "email", "Email", input(kind, "email", "email")))
                (field(kind, "phone", "Phone (optional)", input(kind, "phone", "tel")))
                (field(kind, "subject", "Subject", input(kind, "subject", "text")))
                (field(kind, "message", "Message", textarea(kind, "message", 1000)))
                button .submit-btn type="submit" { "Send Message" }
                div .form-status .sr-only aria-live="polite" {}
            }
            div #(MAP_ROOT) {}
        }
    }
}

fn booking_modal(content: &SiteContent) -> Markup {
    let kind = FormKind::Booking;
    html! {
        div #(BOOKING_MODAL) .modal role="dialog" aria-modal="true" aria-hidden="true"
            aria-labelledby="booking-title" {
            div .modal-content {
                button .modal-close type="button" aria-label="Close booking form" { "×" }
                h2 #booking-title { "Book an appointment" }
                form #(kind.form_id()) novalidate {
                    (field(kind, "name", "Name", input(kind, "name", "text")))
                    (field(kind, "email", "Email", input(kind, "email", "email")))
                    (field(kind, "phone", "Phone", input(kind, "phone", "tel")))
                    (field(kind, "service", "Service", html! {
                        select #(format!("{}-service", kind.form_id())) name="service" {
                            option value="" { "Select a service" }
                            @for service in &content.services {
                                option value=(service) { (service) }
                            }
                        }
                    }))
                    (field(kind, "date", "Preferred date", input(kind, "date", "date")))
                    (field(
                        kind,
                        "message",
                        "Anything we should know? (optional)",
                        textarea(kind, "message", 500)
                    ))
                    button .submit-btn type="submit" { "Request Appointment" }
                    div .form-status .sr-only aria-live="polite" {}
                }
            }
        }
    }
}
