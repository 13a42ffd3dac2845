//! Site content shared by markup rendering and document building.
//!
//! Content lives in a single `content.toml`. Every list is optional; an
//! empty list simply means the matching widget has nothing to mount on.
//!
//! ```toml
//! [[testimonials]]
//! author = "Sarah M."
//! text = "The whole team made me feel at home."
//! rating = 5
//! treatment = "invisalign"
//!
//! [[tour]]
//! label = "Reception"
//! image = "/images/tour/reception.avif"
//! alt = "Bright reception area with seating"
//!
//! [[faq]]
//! question = "Do you accept insurance?"
//! answer = "Yes, we work with most major providers."
//!
//! [[cases]]
//! title = "Crowding correction"
//! category = "invisalign"
//! months = 14
//! before = "/images/cases/01-before.avif"
//! after = "/images/cases/01-after.avif"
//!
//! [[posts]]
//! title = "Caring for your aligners"
//! category = "tips"
//! date = "2026-03-02"
//! excerpt = "Five **simple** habits that keep aligners clear."
//! ```
//!
//! An embedded sample ([`SiteContent::sample`]) backs the CLI when no
//! content file is given.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Content validation error: {0}")]
    Validation(String),
}

/// A patient testimonial slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Testimonial {
    pub author: String,
    pub text: String,
    /// Star rating, 1-5.
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
}

/// A labeled photo in the practice tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TourSlide {
    pub label: String,
    pub image: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

/// A before/after case in the results gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GalleryCase {
    pub title: String,
    /// Filter tag, matched exactly by the gallery filter.
    pub category: String,
    /// Treatment length in months.
    pub months: u32,
    pub before: String,
    pub after: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlogPost {
    pub title: String,
    pub category: String,
    /// ISO date, displayed as written.
    pub date: String,
    /// Markdown teaser.
    pub excerpt: String,
    #[serde(default)]
    pub author: String,
}

/// A headline number animated by a scroll counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stat {
    pub label: String,
    pub value: u64,
    #[serde(default)]
    pub suffix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteContent {
    pub testimonials: Vec<Testimonial>,
    pub tour: Vec<TourSlide>,
    pub faq: Vec<FaqItem>,
    pub cases: Vec<GalleryCase>,
    pub posts: Vec<BlogPost>,
    pub stats: Vec<Stat>,
    /// Options offered in the booking form's service select.
    pub services: Vec<String>,
}

const SAMPLE_CONTENT: &str = include_str!("../assets/sample-content.toml");

impl SiteContent {
    /// The sample content bundled with the crate.
    pub fn sample() -> Self {
        toml::from_str(SAMPLE_CONTENT).expect("bundled sample content must parse")
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        if let Some(t) = self.testimonials.iter().find(|t| !(1..=5).contains(&t.rating)) {
            return Err(ContentError::Validation(format!(
                "testimonial by {} has rating {}, expected 1-5",
                t.author, t.rating
            )));
        }
        if let Some(c) = self.cases.iter().find(|c| c.category.trim().is_empty()) {
            return Err(ContentError::Validation(format!(
                "case '{}' has an empty category",
                c.title
            )));
        }
        if let Some(p) = self.posts.iter().find(|p| p.category.trim().is_empty()) {
            return Err(ContentError::Validation(format!(
                "post '{}' has an empty category",
                p.title
            )));
        }
        if self.cases.iter().any(|c| c.category == crate::filter::ALL)
            || self.posts.iter().any(|p| p.category == crate::filter::ALL)
        {
            return Err(ContentError::Validation(format!(
                "'{}' is reserved and cannot be used as a category",
                crate::filter::ALL
            )));
        }
        Ok(())
    }

    /// Distinct case categories in first-seen order.
    pub fn case_categories(&self) -> Vec<&str> {
        distinct(self.cases.iter().map(|c| c.category.as_str()))
    }

    /// Distinct post categories in first-seen order.
    pub fn post_categories(&self) -> Vec<&str> {
        distinct(self.posts.iter().map(|p| p.category.as_str()))
    }
}

fn distinct<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Load and validate a content file.
pub fn load_content(path: &Path) -> Result<SiteContent, ContentError> {
    let raw = fs::read_to_string(path)?;
    let content: SiteContent = toml::from_str(&raw)?;
    content.validate()?;
    Ok(content)
}
