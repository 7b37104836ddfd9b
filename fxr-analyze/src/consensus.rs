//! Consensus scoring
//!
//! Builds the population-wide "consensus" recipe (the modal value of every
//! scored field) and ranks stored recipes by how many fields they share with
//! it.
//!
//! # Mode tie-break
//! Highest count wins. Among equally frequent values, numbers prefer the
//! smallest magnitude and then the smaller value (so -1 beats +1); labels
//! prefer the lexicographically smallest. The result never depends on the
//! order records were stored in.
//!
//! # Missing data
//! A field that no record sets has [`FieldConsensus::NoData`]. It is reported
//! as having no consensus and contributes nothing to any record's score.

use fxr_common::normalize::{categorical_key, dynamic_range_group};
use fxr_common::{RecipeRecord, StepField};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// A field that takes part in consensus scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoredField {
    FilmSimulation,
    DynamicRange,
    GrainEffect,
    Step(StepField),
    WbShiftRed,
    WbShiftBlue,
}

impl ScoredField {
    /// Default scoring fields; a perfect match scores 11
    pub const ALL: [ScoredField; 11] = [
        ScoredField::FilmSimulation,
        ScoredField::DynamicRange,
        ScoredField::GrainEffect,
        ScoredField::Step(StepField::Highlight),
        ScoredField::Step(StepField::Shadow),
        ScoredField::Step(StepField::Color),
        ScoredField::Step(StepField::Sharpness),
        ScoredField::Step(StepField::NoiseReduction),
        ScoredField::Step(StepField::Clarity),
        ScoredField::WbShiftRed,
        ScoredField::WbShiftBlue,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScoredField::FilmSimulation => "Film Simulation",
            ScoredField::DynamicRange => "Dynamic Range",
            ScoredField::GrainEffect => "Grain Effect",
            ScoredField::Step(step) => step.label(),
            ScoredField::WbShiftRed => "WB Shift Red",
            ScoredField::WbShiftBlue => "WB Shift Blue",
        }
    }

    /// Comparable value of this field in a record
    pub fn value_of(self, record: &RecipeRecord) -> Option<FieldValue> {
        match self {
            ScoredField::FilmSimulation => record
                .film_simulation
                .as_deref()
                .and_then(categorical_key)
                .map(FieldValue::Label),
            ScoredField::DynamicRange => record
                .dynamic_range
                .as_deref()
                .and_then(dynamic_range_group)
                .map(FieldValue::Label),
            ScoredField::GrainEffect => record
                .grain_effect
                .as_deref()
                .and_then(categorical_key)
                .map(FieldValue::Label),
            ScoredField::Step(step) => record
                .step(step)
                .map(|v| FieldValue::Number(v.number())),
            ScoredField::WbShiftRed => record.wb_shift_red.map(|v| FieldValue::Number(v as f64)),
            ScoredField::WbShiftBlue => record.wb_shift_blue.map(|v| FieldValue::Number(v as f64)),
        }
    }
}

impl fmt::Display for ScoredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized value of a scored field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Label(String),
}

impl FieldValue {
    /// Tie-break order among equally frequent values
    fn tie_order(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a
                .abs()
                .total_cmp(&b.abs())
                .then_with(|| a.total_cmp(b)),
            (FieldValue::Label(a), FieldValue::Label(b)) => a.cmp(b),
            (FieldValue::Number(_), FieldValue::Label(_)) => Ordering::Less,
            (FieldValue::Label(_), FieldValue::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => f.write_str(&format_signed(*n)),
            FieldValue::Label(s) => f.write_str(s),
        }
    }
}

/// "+2", "-1", "0", "+0.5"
pub fn format_signed(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 {
        format!("{:+}", n as i64)
    } else {
        format!("{:+}", n)
    }
}

/// Consensus for one field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldConsensus {
    /// Most frequent value, its count, and how many records set the field
    Modal {
        value: FieldValue,
        count: usize,
        support: usize,
    },
    /// No record sets this field
    NoData,
}

impl FieldConsensus {
    pub fn value(&self) -> Option<&FieldValue> {
        match self {
            FieldConsensus::Modal { value, .. } => Some(value),
            FieldConsensus::NoData => None,
        }
    }
}

/// Mode of a sequence of values, with the documented tie-break
pub fn mode<I>(values: I) -> FieldConsensus
where
    I: IntoIterator<Item = FieldValue>,
{
    let mut counts: Vec<(FieldValue, usize)> = Vec::new();
    let mut support = 0;

    for value in values {
        support += 1;
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    counts
        .into_iter()
        .min_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.tie_order(b)))
        .map(|(value, count)| FieldConsensus::Modal {
            value,
            count,
            support,
        })
        .unwrap_or(FieldConsensus::NoData)
}

/// One field's entry in the profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileEntry {
    pub field: ScoredField,
    pub consensus: FieldConsensus,
}

/// Per-field consensus over a set of recipes, in scoring-field order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusProfile {
    pub entries: Vec<ProfileEntry>,
}

impl ConsensusProfile {
    /// Compute the consensus of `fields` over `records`
    pub fn build(records: &[RecipeRecord], fields: &[ScoredField]) -> Self {
        let entries = fields
            .iter()
            .map(|&field| ProfileEntry {
                field,
                consensus: mode(records.iter().filter_map(|r| field.value_of(r))),
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, field: ScoredField) -> Option<&FieldConsensus> {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| &e.consensus)
    }

    /// Modal value of a field, when it has one
    pub fn modal(&self, field: ScoredField) -> Option<&FieldValue> {
        self.get(field).and_then(FieldConsensus::value)
    }

    /// Fields that no record sets
    pub fn missing_fields(&self) -> Vec<ScoredField> {
        self.entries
            .iter()
            .filter(|e| e.consensus == FieldConsensus::NoData)
            .map(|e| e.field)
            .collect()
    }

    /// Highest score a record can reach against this profile
    pub fn possible_score(&self) -> usize {
        self.entries.len() - self.missing_fields().len()
    }

    /// The synthesized recipe as (setting, value) rows
    ///
    /// Fields without consensus are listed with "n/a".
    pub fn consensus_recipe(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|e| {
                let value = e
                    .consensus
                    .value()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "n/a".to_string());
                (e.field.label().to_string(), value)
            })
            .collect()
    }

    /// Fields of `record` that equal the consensus
    pub fn matching_fields(&self, record: &RecipeRecord) -> Vec<ScoredField> {
        self.entries
            .iter()
            .filter(|e| match e.consensus.value() {
                Some(modal) => e.field.value_of(record).as_ref() == Some(modal),
                None => false,
            })
            .map(|e| e.field)
            .collect()
    }
}

/// A stored recipe with its consensus match count
#[derive(Debug, Clone, Serialize)]
pub struct RankedRecipe<'a> {
    pub record: &'a RecipeRecord,
    pub matches: usize,
    pub matched_fields: Vec<ScoredField>,
}

/// Profile plus recipes ranked by likeness to it
#[derive(Debug, Clone, Serialize)]
pub struct ConsensusReport<'a> {
    pub profile: ConsensusProfile,
    pub ranked: Vec<RankedRecipe<'a>>,
}

impl<'a> ConsensusReport<'a> {
    /// Existing recipe closest to the consensus
    pub fn closest(&self) -> Option<&RankedRecipe<'a>> {
        self.ranked.first()
    }
}

/// Score every record against the consensus of `fields`
///
/// Ranking is by descending match count; equal counts keep input order.
pub fn score<'a>(records: &'a [RecipeRecord], fields: &[ScoredField]) -> ConsensusReport<'a> {
    let profile = ConsensusProfile::build(records, fields);

    let mut ranked: Vec<RankedRecipe<'a>> = records
        .iter()
        .map(|record| {
            let matched_fields = profile.matching_fields(record);
            RankedRecipe {
                record,
                matches: matched_fields.len(),
                matched_fields,
            }
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.matches.cmp(&a.matches));

    debug!(
        records = records.len(),
        missing = profile.missing_fields().len(),
        "Consensus scored"
    );

    ConsensusReport { profile, ranked }
}
