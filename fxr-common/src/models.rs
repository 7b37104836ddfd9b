//! Recipe record model
//!
//! A recipe is the set of in-camera settings described by one article.
//! Setting values are kept as the raw text the article used ("+2", "0 to +2",
//! "-4 (Soft)"); numeric views are computed on demand through [`StepValue`].

use crate::normalize::normalize_text;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One scraped recipe
///
/// `url` is the natural identity: saving a record whose URL already exists
/// replaces every stored field of that row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    /// Article title
    pub name: String,
    /// Sensor generation label (e.g. "X-Trans V")
    pub sensor: String,
    /// Source article URL (unique)
    pub url: String,
    pub film_simulation: Option<String>,
    pub dynamic_range: Option<String>,
    pub grain_effect: Option<String>,
    pub white_balance: Option<String>,
    pub highlight: Option<String>,
    pub shadow: Option<String>,
    pub color: Option<String>,
    pub sharpness: Option<String>,
    pub noise_reduction: Option<String>,
    pub clarity: Option<String>,
    pub iso: Option<String>,
    pub exposure_compensation: Option<String>,
    /// Red axis of the white balance shift, parsed from `white_balance`
    pub wb_shift_red: Option<i64>,
    /// Blue axis of the white balance shift, parsed from `white_balance`
    pub wb_shift_blue: Option<i64>,
    /// Settings with no fixed column (Color Chrome Effect, unknown keys)
    #[serde(default)]
    pub extra_settings: BTreeMap<String, String>,
}

impl RecipeRecord {
    /// Create a record carrying only its identity fields
    pub fn new(name: impl Into<String>, sensor: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sensor: sensor.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Raw text of a step field
    pub fn step_text(&self, field: StepField) -> Option<&str> {
        let value = match field {
            StepField::Highlight => &self.highlight,
            StepField::Shadow => &self.shadow,
            StepField::Color => &self.color,
            StepField::Sharpness => &self.sharpness,
            StepField::NoiseReduction => &self.noise_reduction,
            StepField::Clarity => &self.clarity,
        };
        value.as_deref()
    }

    /// Raw token plus lazily parsed number for a step field
    pub fn step(&self, field: StepField) -> Option<StepValue<'_>> {
        self.step_text(field).map(StepValue::new)
    }

    /// True when no setting beyond name/sensor/url was found
    pub fn is_bare(&self) -> bool {
        self.film_simulation.is_none()
            && self.dynamic_range.is_none()
            && self.grain_effect.is_none()
            && self.white_balance.is_none()
            && StepField::ALL.iter().all(|f| self.step_text(*f).is_none())
            && self.iso.is_none()
            && self.exposure_compensation.is_none()
            && self.extra_settings.is_empty()
    }
}

/// The six signed-step tone and detail settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepField {
    Highlight,
    Shadow,
    Color,
    Sharpness,
    NoiseReduction,
    Clarity,
}

impl StepField {
    /// All step fields in display order
    pub const ALL: [StepField; 6] = [
        StepField::Highlight,
        StepField::Shadow,
        StepField::Color,
        StepField::Sharpness,
        StepField::NoiseReduction,
        StepField::Clarity,
    ];

    /// Human-readable label as written in articles
    pub fn label(self) -> &'static str {
        match self {
            StepField::Highlight => "Highlight",
            StepField::Shadow => "Shadow",
            StepField::Color => "Color",
            StepField::Sharpness => "Sharpness",
            StepField::NoiseReduction => "Noise Reduction",
            StepField::Clarity => "Clarity",
        }
    }

    /// Column name in the recipes table
    pub fn column(self) -> &'static str {
        match self {
            StepField::Highlight => "highlight",
            StepField::Shadow => "shadow",
            StepField::Color => "color",
            StepField::Sharpness => "sharpness",
            StepField::NoiseReduction => "noise_reduction",
            StepField::Clarity => "clarity",
        }
    }

    /// Range the camera accepts for this setting
    pub fn range(self) -> (f64, f64) {
        match self {
            StepField::Clarity => (-5.0, 5.0),
            _ => (-4.0, 4.0),
        }
    }
}

impl fmt::Display for StepField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A step setting as written, with its numeric view parsed on demand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepValue<'a> {
    raw: &'a str,
}

impl<'a> StepValue<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    /// Original token, for display
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Comparable number (first number in the text, 0 when none)
    pub fn number(&self) -> f64 {
        normalize_text(self.raw)
    }

    /// Whether the parsed number lies inside the field's camera range
    pub fn is_within(&self, field: StepField) -> bool {
        let (lo, hi) = field.range();
        let n = self.number();
        n >= lo && n <= hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_no_settings() {
        let record = RecipeRecord::new("Kodachrome 64", "X-Trans IV", "https://example.com/a");
        assert!(record.is_bare());
        assert!(record.wb_shift_red.is_none());
        assert!(record.extra_settings.is_empty());
    }

    #[test]
    fn test_step_value_keeps_raw_and_parses_number() {
        let mut record = RecipeRecord::new("r", "s", "u");
        record.shadow = Some("-4 (Soft)".to_string());

        let value = record.step(StepField::Shadow).unwrap();
        assert_eq!(value.raw(), "-4 (Soft)");
        assert_eq!(value.number(), -4.0);
        assert!(value.is_within(StepField::Shadow));
        assert!(record.step(StepField::Highlight).is_none());
    }

    #[test]
    fn test_clarity_has_wider_range() {
        assert!(StepValue::new("-5").is_within(StepField::Clarity));
        assert!(!StepValue::new("-5").is_within(StepField::Highlight));
    }
}
