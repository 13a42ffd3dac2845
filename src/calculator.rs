//! Treatment cost estimator.
//!
//! The estimate is a table lookup followed by fixed arithmetic:
//!
//! ```text
//! base      = PRICES[treatment][duration][complexity]
//! subtotal  = base + consultation + imaging + retainers
//! monthly   = round(subtotal / financing_months)
//! insurance = round(subtotal * coverage%)
//! patient   = subtotal - insurance
//! ```
//!
//! Rounding is half-up, matching what visitors see in the browser. Fees,
//! financing length and coverage come from [`CalculatorConfig`].
//!
//! [`CostCalculator`] binds the estimator to the calculator form: three
//! selects, a calculate button, an error line and a result panel.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::config::CalculatorConfig;
use crate::dom::{Document, NodeId};
use crate::events::{Event, Propagation};
use crate::mount::{MountError, require_class, require_id};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculatorError {
    #[error("unknown treatment type: {0}")]
    UnknownTreatment(String),
    #[error("unknown duration: {0}")]
    UnknownDuration(String),
    #[error("unknown complexity: {0}")]
    UnknownComplexity(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Treatment {
    Invisalign,
    TraditionalBraces,
    CeramicBraces,
    LingualBraces,
}

impl Treatment {
    pub const ALL: [Treatment; 4] = [
        Treatment::Invisalign,
        Treatment::TraditionalBraces,
        Treatment::CeramicBraces,
        Treatment::LingualBraces,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Treatment::Invisalign => "invisalign",
            Treatment::TraditionalBraces => "traditional-braces",
            Treatment::CeramicBraces => "ceramic-braces",
            Treatment::LingualBraces => "lingual-braces",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Treatment::Invisalign => "Invisalign",
            Treatment::TraditionalBraces => "Traditional braces",
            Treatment::CeramicBraces => "Ceramic braces",
            Treatment::LingualBraces => "Lingual braces",
        }
    }

    /// Base prices indexed `[duration][complexity]`.
    fn prices(self) -> [[u32; 3]; 3] {
        match self {
            Treatment::Invisalign => {
                [[3500, 4000, 4500], [4500, 5000, 5500], [5500, 6000, 6500]]
            }
            Treatment::TraditionalBraces => {
                [[3000, 3500, 4000], [4000, 4500, 5000], [5000, 5500, 6000]]
            }
            Treatment::CeramicBraces => {
                [[3800, 4300, 4800], [4800, 5300, 5800], [5800, 6300, 6800]]
            }
            Treatment::LingualBraces => {
                [[6000, 6800, 7500], [7500, 8300, 9000], [9000, 9800, 10500]]
            }
        }
    }
}

impl FromStr for Treatment {
    type Err = CalculatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Treatment::ALL
            .into_iter()
            .find(|t| t.key() == s)
            .ok_or_else(|| CalculatorError::UnknownTreatment(s.to_string()))
    }
}

/// Treatment length bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationBucket {
    /// Up to 12 months.
    Short,
    /// 12-24 months.
    Medium,
    /// Over 24 months.
    Long,
}

impl DurationBucket {
    pub const ALL: [DurationBucket; 3] = [
        DurationBucket::Short,
        DurationBucket::Medium,
        DurationBucket::Long,
    ];

    pub fn key(self) -> &'static str {
        match self {
            DurationBucket::Short => "short",
            DurationBucket::Medium => "medium",
            DurationBucket::Long => "long",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationBucket::Short => "Up to 12 months",
            DurationBucket::Medium => "12 to 24 months",
            DurationBucket::Long => "More than 24 months",
        }
    }

    fn row(self) -> usize {
        self as usize
    }
}

impl FromStr for DurationBucket {
    type Err = CalculatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DurationBucket::ALL
            .into_iter()
            .find(|d| d.key() == s)
            .ok_or_else(|| CalculatorError::UnknownDuration(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [
        Complexity::Simple,
        Complexity::Moderate,
        Complexity::Complex,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Complexity::Simple => "Simple",
            Complexity::Moderate => "Moderate",
            Complexity::Complex => "Complex",
        }
    }

    fn column(self) -> usize {
        self as usize
    }
}

impl FromStr for Complexity {
    type Err = CalculatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Complexity::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| CalculatorError::UnknownComplexity(s.to_string()))
    }
}

/// Full price breakdown for one selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostBreakdown {
    pub treatment: Treatment,
    pub duration: DurationBucket,
    pub complexity: Complexity,
    pub base_price: u32,
    pub consultation_fee: u32,
    pub imaging_fee: u32,
    pub retainer_fee: u32,
    pub subtotal: u32,
    pub financing_months: u32,
    pub monthly_payment: u32,
    pub insurance_estimate: u32,
    pub patient_responsibility: u32,
}

/// `numerator / denominator`, rounded half-up.
fn div_round(numerator: u64, denominator: u64) -> u32 {
    ((numerator * 2 + denominator) / (denominator * 2)) as u32
}

/// Estimate the cost of a typed selection.
pub fn estimate(
    treatment: Treatment,
    duration: DurationBucket,
    complexity: Complexity,
    config: &CalculatorConfig,
) -> CostBreakdown {
    let base_price = treatment.prices()[duration.row()][complexity.column()];
    let subtotal = base_price + config.consultation_fee + config.imaging_fee + config.retainer_fee;
    let monthly_payment = div_round(subtotal as u64, config.financing_months.max(1) as u64);
    let insurance_estimate = div_round(
        subtotal as u64 * config.insurance_coverage_percent.min(100) as u64,
        100,
    );
    CostBreakdown {
        treatment,
        duration,
        complexity,
        base_price,
        consultation_fee: config.consultation_fee,
        imaging_fee: config.imaging_fee,
        retainer_fee: config.retainer_fee,
        subtotal,
        financing_months: config.financing_months,
        monthly_payment,
        insurance_estimate,
        patient_responsibility: subtotal - insurance_estimate,
    }
}

/// Estimate from the raw select values used in markup.
pub fn calculate_custom_cost(
    treatment: &str,
    duration: &str,
    complexity: &str,
    config: &CalculatorConfig,
) -> Result<CostBreakdown, CalculatorError> {
    Ok(estimate(
        treatment.parse()?,
        duration.parse()?,
        complexity.parse()?,
        config,
    ))
}

/// Format whole dollars as `$4,150`.
pub fn format_usd(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("${out}")
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}): {} or {}/month",
            self.treatment.label(),
            self.duration.label(),
            self.complexity.label(),
            format_usd(self.subtotal),
            format_usd(self.monthly_payment)
        )
    }
}

// ============================================================================
// DOM controller
// ============================================================================

/// Fields of the result panel, by `data-field` name.
const RESULT_FIELDS: [&str; 8] = [
    "base",
    "consultation",
    "imaging",
    "retainers",
    "subtotal",
    "monthly",
    "insurance",
    "patient",
];

#[derive(Debug)]
pub struct CostCalculator {
    treatment: NodeId,
    duration: NodeId,
    complexity: NodeId,
    button: NodeId,
    error: NodeId,
    result: NodeId,
    config: CalculatorConfig,
    last: Option<CostBreakdown>,
}

impl CostCalculator {
    pub fn mount(doc: &mut Document, config: &CalculatorConfig) -> Result<Self, MountError> {
        let form = require_id(doc, "cost-calculator")?;
        let calculator = Self {
            treatment: require_id(doc, "treatment-type")?,
            duration: require_id(doc, "treatment-duration")?,
            complexity: require_id(doc, "case-complexity")?,
            button: require_class(doc, form, "calculate-btn")?,
            error: require_class(doc, form, "calculator-error")?,
            result: require_id(doc, "cost-result")?,
            config: config.clone(),
            last: None,
        };
        doc.set_attr(calculator.error, "role", "alert");
        doc.set_flag(calculator.result, "aria-hidden", true);
        Ok(calculator)
    }

    /// Read the three selects and render either the missing-selection error
    /// or the breakdown.
    pub fn calculate(&mut self, doc: &mut Document) -> Option<&CostBreakdown> {
        let selections = [
            (self.treatment, "treatment type"),
            (self.duration, "treatment duration"),
            (self.complexity, "case complexity"),
        ];
        let missing: Vec<&str> = selections
            .iter()
            .filter(|(node, _)| doc.value(*node).is_empty())
            .map(|(_, name)| *name)
            .collect();
        if !missing.is_empty() {
            self.show_error(doc, &format!("Please select {}.", missing.join(", ")));
            return None;
        }

        let breakdown = match calculate_custom_cost(
            doc.value(self.treatment),
            doc.value(self.duration),
            doc.value(self.complexity),
            &self.config,
        ) {
            Ok(b) => b,
            Err(e) => {
                self.show_error(doc, &e.to_string());
                return None;
            }
        };

        doc.set_text(self.error, "");
        doc.remove_class(self.error, "show");
        let values = [
            breakdown.base_price,
            breakdown.consultation_fee,
            breakdown.imaging_fee,
            breakdown.retainer_fee,
            breakdown.subtotal,
            breakdown.monthly_payment,
            breakdown.insurance_estimate,
            breakdown.patient_responsibility,
        ];
        for node in doc.query_attr(self.result, "data-field") {
            let field = doc.data(node, "field").unwrap_or_default();
            if let Some(pos) = RESULT_FIELDS.iter().position(|f| *f == field) {
                doc.set_text(node, format_usd(values[pos]));
            }
        }
        doc.add_class(self.result, "show");
        doc.set_flag(self.result, "aria-hidden", false);
        self.last = Some(breakdown);
        self.last.as_ref()
    }

    fn show_error(&mut self, doc: &mut Document, message: &str) {
        doc.set_text(self.error, message);
        doc.add_class(self.error, "show");
        doc.remove_class(self.result, "show");
        doc.set_flag(self.result, "aria-hidden", true);
        self.last = None;
    }

    pub fn last_estimate(&self) -> Option<&CostBreakdown> {
        self.last.as_ref()
    }

    pub fn handle_event(&mut self, doc: &mut Document, event: &Event) -> Propagation {
        match event {
            Event::Click { target } if doc.contains(self.button, *target) => {
                self.calculate(doc);
                Propagation::PreventDefault
            }
            _ => Propagation::Ignored,
        }
    }
}
