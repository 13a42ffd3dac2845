//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Estimate
//!
//! ```text
//! Invisalign, up to 12 months, simple
//!     Treatment            $3,500
//!     Consultation           $150
//!     X-rays and scans       $200
//!     Retainers              $300
//!     Total                $4,150
//!
//!     Monthly (24 months)    $173
//!     Insurance (est.)     $2,075
//!     Your share           $2,075
//! ```
//!
//! ## Check
//!
//! ```text
//! Content
//!     4 testimonials, 4 tour slides, 4 questions, 4 cases, 4 posts
//!
//! Widgets
//! 001 testimonials    mounted
//! 012 hero            not mounted: 3D library is not available
//!
//! 11 of 13 widgets mounted
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::calculator::{CostBreakdown, format_usd};
use crate::content::SiteContent;
use crate::page::WidgetStatus;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `label` left-aligned, `amount` right-aligned in a fixed-width row.
fn money_row(label: &str, amount: u32) -> String {
    format!("{}{:<20}{:>9}", indent(1), label, format_usd(amount))
}

/// `1 case`, `2 cases`.
fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("1 {singular}")
    } else {
        format!("{n} {plural}")
    }
}

pub fn format_estimate(b: &CostBreakdown) -> Vec<String> {
    vec![
        format!(
            "{}, {}, {}",
            b.treatment.label(),
            b.duration.label().to_lowercase(),
            b.complexity.label().to_lowercase()
        ),
        money_row("Treatment", b.base_price),
        money_row("Consultation", b.consultation_fee),
        money_row("X-rays and scans", b.imaging_fee),
        money_row("Retainers", b.retainer_fee),
        money_row("Total", b.subtotal),
        String::new(),
        money_row(&format!("Monthly ({} months)", b.financing_months), b.monthly_payment),
        money_row("Insurance (est.)", b.insurance_estimate),
        money_row("Your share", b.patient_responsibility),
    ]
}

pub fn print_estimate(b: &CostBreakdown) {
    for line in format_estimate(b) {
        println!("{line}");
    }
}

pub fn format_check_output(content: &SiteContent, status: &[WidgetStatus]) -> Vec<String> {
    let mut lines = vec![
        "Content".to_string(),
        format!(
            "{}{}, {}, {}, {}, {}",
            indent(1),
            count(content.testimonials.len(), "testimonial", "testimonials"),
            count(content.tour.len(), "tour slide", "tour slides"),
            count(content.faq.len(), "question", "questions"),
            count(content.cases.len(), "case", "cases"),
            count(content.posts.len(), "post", "posts"),
        ),
        String::new(),
        "Widgets".to_string(),
    ];
    let width = status.iter().map(|s| s.widget.len()).max().unwrap_or(0);
    for (i, s) in status.iter().enumerate() {
        let state = match &s.error {
            None => "mounted".to_string(),
            Some(reason) => format!("not mounted: {reason}"),
        };
        lines.push(format!(
            "{} {:<width$}    {}",
            format_index(i + 1),
            s.widget,
            state
        ));
    }
    let mounted = status.iter().filter(|s| s.is_mounted()).count();
    lines.push(String::new());
    lines.push(format!("{mounted} of {} widgets mounted", status.len()));
    lines
}

pub fn print_check_output(content: &SiteContent, status: &[WidgetStatus]) {
    for line in format_check_output(content, status) {
        println!("{line}");
    }
}
