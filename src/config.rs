//! Widget configuration module.
//!
//! Handles loading, validating, and merging `widgets.toml`. Stock defaults
//! are serialized to a TOML table and the user file is merged over it key by
//! key, so a config file only needs the values it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [carousel]
//! autoplay = true           # Start auto-advancing on mount
//! interval_ms = 5000        # Delay between automatic advances
//! transition_ms = 300       # Must match the CSS slide transition
//! swipe_threshold_px = 50.0 # Minimum horizontal travel for a swipe
//! pause_on_hover = true
//!
//! [calculator]
//! consultation_fee = 150
//! imaging_fee = 200
//! retainer_fee = 300
//! financing_months = 24
//! insurance_coverage_percent = 50
//!
//! [notifications]
//! timeout_ms = 5000         # Toast lifetime
//! announcement_ms = 1000    # Screen-reader announcement lifetime
//!
//! [forms]
//! submit_delay_ms = 1500    # Simulated network round trip
//!
//! [animations]
//! intersection_threshold = 0.1
//! counter_duration_ms = 2000
//! header_offset_px = 50.0
//!
//! [contact]
//! practice_name = "Bright Smile Orthodontics"
//! address = "123 Main Street, Springfield"
//! latitude = 40.7128
//! longitude = -74.006
//! zoom = 16
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Widget configuration loaded from `widgets.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetConfig {
    /// Testimonial and practice-tour sliders.
    pub carousel: CarouselConfig,
    /// Cost estimator fees and financing terms.
    pub calculator: CalculatorConfig,
    /// Toasts and live-region announcements.
    pub notifications: NotificationConfig,
    /// Booking and contact forms.
    pub forms: FormsConfig,
    /// Scroll-triggered effects.
    pub animations: AnimationConfig,
    /// Practice location for the contact map.
    pub contact: ContactConfig,
}

impl WidgetConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.carousel.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "carousel.interval_ms must be greater than 0".into(),
            ));
        }
        if self.carousel.swipe_threshold_px <= 0.0 {
            return Err(ConfigError::Validation(
                "carousel.swipe_threshold_px must be positive".into(),
            ));
        }
        if self.calculator.financing_months == 0 {
            return Err(ConfigError::Validation(
                "calculator.financing_months must be greater than 0".into(),
            ));
        }
        if self.calculator.insurance_coverage_percent > 100 {
            return Err(ConfigError::Validation(
                "calculator.insurance_coverage_percent must be 0-100".into(),
            ));
        }
        let threshold = self.animations.intersection_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Validation(
                "animations.intersection_threshold must be in (0, 1]".into(),
            ));
        }
        if !(1..=19).contains(&self.contact.zoom) {
            return Err(ConfigError::Validation(
                "contact.zoom must be 1-19".into(),
            ));
        }
        Ok(())
    }
}

/// Slider behavior shared by every carousel on the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    /// Start auto-advancing as soon as the carousel mounts.
    pub autoplay: bool,
    /// Delay between automatic advances, in milliseconds.
    pub interval_ms: u64,
    /// Length of the slide transition, in milliseconds. Navigation is
    /// rejected while a transition is running.
    pub transition_ms: u64,
    /// Minimum horizontal finger travel recognized as a swipe.
    pub swipe_threshold_px: f64,
    /// Hold autoplay while the pointer is over the carousel.
    pub pause_on_hover: bool,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            autoplay: true,
            interval_ms: 5000,
            transition_ms: 300,
            swipe_threshold_px: 50.0,
            pause_on_hover: true,
        }
    }
}

/// Fixed fees and split percentages applied by the cost estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalculatorConfig {
    pub consultation_fee: u32,
    /// X-rays and 3D scans.
    pub imaging_fee: u32,
    pub retainer_fee: u32,
    /// Number of monthly installments in the payment plan.
    pub financing_months: u32,
    /// Share of the subtotal typically covered by insurance.
    pub insurance_coverage_percent: u32,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            consultation_fee: 150,
            imaging_fee: 200,
            retainer_fee: 300,
            financing_months: 24,
            insurance_coverage_percent: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationConfig {
    /// How long a toast stays on screen.
    pub timeout_ms: u64,
    /// How long an announcement stays in a live region before it is cleared.
    pub announcement_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            announcement_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormsConfig {
    /// Delay before a submission without a completion signal is treated as
    /// delivered.
    pub submit_delay_ms: u64,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Visible fraction at which a reveal animation starts.
    pub intersection_threshold: f64,
    /// Time a counter takes to reach its target.
    pub counter_duration_ms: u64,
    /// Scroll offset after which the header is marked `scrolled`.
    pub header_offset_px: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            intersection_threshold: 0.1,
            counter_duration_ms: 2000,
            header_offset_px: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactConfig {
    pub practice_name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            practice_name: "Bright Smile Orthodontics".to_string(),
            address: "123 Main Street, Springfield".to_string(),
            latitude: 40.7128,
            longitude: -74.006,
            zoom: 16,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(WidgetConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `widgets.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `widgets.toml` exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("widgets.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<WidgetConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: WidgetConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `widgets.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<WidgetConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `widgets.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Clinic Widgets Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Carousels (testimonials, practice tour)
# ---------------------------------------------------------------------------
[carousel]
# Start auto-advancing as soon as the slider is on the page.
autoplay = true

# Milliseconds between automatic advances.
interval_ms = 5000

# Slide transition length. Keep in sync with the stylesheet; the generated
# --carousel-transition variable uses this value.
transition_ms = 300

# Minimum horizontal finger travel (px) that counts as a swipe.
swipe_threshold_px = 50.0

# Hold autoplay while the pointer rests on the slider.
pause_on_hover = true

# ---------------------------------------------------------------------------
# Cost estimator
# ---------------------------------------------------------------------------
[calculator]
consultation_fee = 150
# X-rays and 3D scans.
imaging_fee = 200
retainer_fee = 300
# Number of monthly installments shown in the payment plan.
financing_months = 24
# Typical insurance share of the subtotal (0-100).
insurance_coverage_percent = 50

# ---------------------------------------------------------------------------
# Notifications
# ---------------------------------------------------------------------------
[notifications]
# Toast lifetime.
timeout_ms = 5000
# Screen-reader announcement lifetime.
announcement_ms = 1000

# ---------------------------------------------------------------------------
# Forms
# ---------------------------------------------------------------------------
[forms]
# Simulated delivery delay for booking and contact submissions.
submit_delay_ms = 1500

# ---------------------------------------------------------------------------
# Scroll effects
# ---------------------------------------------------------------------------
[animations]
# Visible fraction (0-1] at which reveal animations start.
intersection_threshold = 0.1
# Counter count-up duration.
counter_duration_ms = 2000
# Scroll offset after which the header gets the "scrolled" class.
header_offset_px = 50.0

# ---------------------------------------------------------------------------
# Contact page map
# ---------------------------------------------------------------------------
[contact]
practice_name = "Bright Smile Orthodontics"
address = "123 Main Street, Springfield"
latitude = 40.7128
longitude = -74.006
# Map zoom level (1-19).
zoom = 16
"##
}

/// Generate CSS custom properties the widget stylesheet reads.
pub fn generate_theme_css(config: &WidgetConfig) -> String {
    format!(
        r#":root {{
    --carousel-transition: {transition}ms;
    --notification-lifetime: {toast}ms;
}}"#,
        transition = config.carousel.transition_ms,
        toast = config.notifications.timeout_ms,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_documented_values() {
        let config = WidgetConfig::default();
        assert!(config.carousel.autoplay);
        assert_eq!(config.carousel.interval_ms, 5000);
        assert_eq!(config.carousel.transition_ms, 300);
        assert_eq!(config.carousel.swipe_threshold_px, 50.0);
        assert_eq!(config.calculator.financing_months, 24);
        assert_eq!(config.notifications.timeout_ms, 5000);
        assert_eq!(config.notifications.announcement_ms, 1000);
    }

    #[test]
    fn stock_toml_parses_to_defaults() {
        let parsed: WidgetConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = WidgetConfig::default();
        assert_eq!(parsed.carousel.interval_ms, defaults.carousel.interval_ms);
        assert_eq!(
            parsed.calculator.retainer_fee,
            defaults.calculator.retainer_fee
        );
        assert_eq!(parsed.contact.zoom, defaults.contact.zoom);
        parsed.validate().unwrap();
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[carousel]
interval_ms = 8000
"#;
        let config: WidgetConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.carousel.interval_ms, 8000);
        // Defaults preserved
        assert_eq!(config.carousel.transition_ms, 300);
        assert_eq!(config.calculator.consultation_fee, 150);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
[carousel]
intervall_ms = 8000
"#;
        let result: Result<WidgetConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn merge_toml_overrides_nested_keys_only() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[calculator]\nretainer_fee = 450").unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(config.calculator.retainer_fee, 450);
        assert_eq!(config.calculator.imaging_fee, 200);
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = WidgetConfig::default();
        config.carousel.interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_coverage_over_100() {
        let mut config = WidgetConfig::default();
        config.calculator.insurance_coverage_percent = 120;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_threshold_and_zoom() {
        let mut config = WidgetConfig::default();
        config.animations.intersection_threshold = 0.0;
        assert!(config.validate().is_err());

        let mut config = WidgetConfig::default();
        config.contact.zoom = 22;
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.carousel.interval_ms, 5000);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("widgets.toml"),
            r#"
[carousel]
autoplay = false

[contact]
practice_name = "Lakeside Dental"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert!(!config.carousel.autoplay);
        assert_eq!(config.contact.practice_name, "Lakeside Dental");
        assert_eq!(config.contact.zoom, 16);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("widgets.toml"), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validation_failure_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("widgets.toml"),
            "[calculator]\nfinancing_months = 0\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn theme_css_carries_transition_duration() {
        let mut config = WidgetConfig::default();
        config.carousel.transition_ms = 450;
        let css = generate_theme_css(&config);
        assert!(css.contains("--carousel-transition: 450ms"));
        assert!(css.contains("--notification-lifetime: 5000ms"));
    }
}
