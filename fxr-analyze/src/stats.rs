//! Descriptive statistics over stored recipes

use fxr_common::normalize::categorical_key;
use fxr_common::{RecipeRecord, StepField, StepValue};
use serde::Serialize;
use std::collections::BTreeMap;

/// Spread of one step field's normalized values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepDistribution {
    Values {
        count: usize,
        mean: f64,
        min: f64,
        max: f64,
        /// Values outside the camera's adjustable range
        out_of_range: usize,
        /// (value, count) sorted by value
        histogram: Vec<(f64, usize)>,
    },
    NoData,
}

/// Distribution of every step field, in [`StepField::ALL`] order
pub fn step_distributions(records: &[RecipeRecord]) -> Vec<(StepField, StepDistribution)> {
    StepField::ALL
        .iter()
        .map(|&field| {
            let values: Vec<StepValue<'_>> =
                records.iter().filter_map(|r| r.step(field)).collect();
            (field, distribution(field, &values))
        })
        .collect()
}

fn distribution(field: StepField, steps: &[StepValue<'_>]) -> StepDistribution {
    if steps.is_empty() {
        return StepDistribution::NoData;
    }

    let out_of_range = steps.iter().filter(|s| !s.is_within(field)).count();
    let values: Vec<f64> = steps.iter().map(StepValue::number).collect();
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sorted = values;
    sorted.sort_by(f64::total_cmp);
    let mut histogram: Vec<(f64, usize)> = Vec::new();
    for v in sorted {
        match histogram.last_mut() {
            Some((last, n)) if *last == v => *n += 1,
            _ => histogram.push((v, 1)),
        }
    }

    StepDistribution::Values {
        count,
        mean,
        min,
        max,
        out_of_range,
        histogram,
    }
}

/// A label with its number of occurrences
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Frequency table of a text field, most common first
///
/// Labels are compared after whitespace cleanup. Ties are broken
/// alphabetically. `limit` keeps only the first N rows.
pub fn label_frequencies<'a, F>(
    records: impl IntoIterator<Item = &'a RecipeRecord>,
    accessor: F,
    limit: Option<usize>,
) -> Vec<LabelCount>
where
    F: Fn(&RecipeRecord) -> Option<&str>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        if let Some(key) = accessor(record).and_then(categorical_key) {
            *counts.entry(key).or_default() += 1;
        }
    }

    let mut table: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    // BTreeMap order is alphabetical, and sort_by is stable
    table.sort_by(|a, b| b.count.cmp(&a.count));
    table.truncate(limit.unwrap_or(usize::MAX));
    table
}

/// Film simulation frequencies for each sensor
///
/// Every requested sensor gets an entry, empty when it has no recipes.
pub fn top_by_sensor(
    records: &[RecipeRecord],
    sensors: &[String],
    limit: Option<usize>,
) -> BTreeMap<String, Vec<LabelCount>> {
    sensors
        .iter()
        .map(|sensor| {
            let table = label_frequencies(
                records.iter().filter(|r| &r.sensor == sensor),
                |r| r.film_simulation.as_deref(),
                limit,
            );
            (sensor.clone(), table)
        })
        .collect()
}

/// Overall direction of white balance shifts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Warmer,
    Cooler,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhiteBalanceTrend {
    /// Records with a red shift
    pub samples: usize,
    pub avg_red: f64,
    /// Average blue over those records that also have a blue shift
    pub avg_blue: Option<f64>,
    pub tone: Tone,
}

/// Average white balance shift over records with a red shift set
pub fn white_balance_trend(records: &[RecipeRecord]) -> Option<WhiteBalanceTrend> {
    let with_red: Vec<&RecipeRecord> = records
        .iter()
        .filter(|r| r.wb_shift_red.is_some())
        .collect();
    if with_red.is_empty() {
        return None;
    }

    let reds: Vec<f64> = with_red
        .iter()
        .filter_map(|r| r.wb_shift_red)
        .map(|v| v as f64)
        .collect();
    let blues: Vec<f64> = with_red
        .iter()
        .filter_map(|r| r.wb_shift_blue)
        .map(|v| v as f64)
        .collect();

    let avg_red = reds.iter().sum::<f64>() / reds.len() as f64;
    let avg_blue = (!blues.is_empty()).then(|| blues.iter().sum::<f64>() / blues.len() as f64);

    let blue = avg_blue.unwrap_or(0.0);
    let tone = if avg_red > 0.0 && blue < 0.0 {
        Tone::Warmer
    } else if avg_red < 0.0 && blue > 0.0 {
        Tone::Cooler
    } else {
        Tone::Neutral
    };

    Some(WhiteBalanceTrend {
        samples: with_red.len(),
        avg_red,
        avg_blue,
        tone,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, sensor: &str) -> RecipeRecord {
        RecipeRecord::new(url, sensor, url)
    }

    #[test]
    fn test_step_distribution_values() {
        let mut a = record("a", "s");
        a.highlight = Some("-2".into());
        let mut b = record("b", "s");
        b.highlight = Some("+1".into());
        let mut c = record("c", "s");
        c.highlight = Some("-2 (Soft)".into());
        let mut d = record("d", "s");
        d.highlight = Some("+5".into());

        let dists = step_distributions(&[a, b, c, d]);
        let (field, highlight) = &dists[0];
        assert_eq!(*field, StepField::Highlight);
        assert_eq!(
            highlight,
            &StepDistribution::Values {
                count: 4,
                mean: 0.5,
                min: -2.0,
                max: 5.0,
                out_of_range: 1,
                histogram: vec![(-2.0, 2), (1.0, 1), (5.0, 1)],
            }
        );
    }

    #[test]
    fn test_out_of_range_follows_each_field_range() {
        let mut a = record("a", "s");
        a.clarity = Some("-5".into());
        a.highlight = Some("-5 (Hard)".into());

        let dists = step_distributions(&[a]);
        let out_of_range = |field: StepField| {
            let (_, dist) = dists.iter().find(|(f, _)| *f == field).unwrap();
            match dist {
                StepDistribution::Values { out_of_range, .. } => *out_of_range,
                StepDistribution::NoData => panic!("{} has no data", field),
            }
        };
        assert_eq!(out_of_range(StepField::Clarity), 0);
        assert_eq!(out_of_range(StepField::Highlight), 1);
    }

    #[test]
    fn test_step_distribution_without_values() {
        let dists = step_distributions(&[record("a", "s")]);
        assert_eq!(dists.len(), StepField::ALL.len());
        assert!(dists.iter().all(|(_, d)| *d == StepDistribution::NoData));
    }

    #[test]
    fn test_label_frequencies_order_and_limit() {
        let sims = ["Velvia", "Classic Chrome", "Velvia", "Acros", "Classic Chrome", "Eterna"];
        let records: Vec<RecipeRecord> = sims
            .iter()
            .enumerate()
            .map(|(i, sim)| {
                let mut r = record(&i.to_string(), "s");
                r.film_simulation = Some(sim.to_string());
                r
            })
            .collect();

        let table = label_frequencies(&records, |r| r.film_simulation.as_deref(), Some(3));
        let labels: Vec<(&str, usize)> = table
            .iter()
            .map(|l| (l.label.as_str(), l.count))
            .collect();
        assert_eq!(labels, vec![("Classic Chrome", 2), ("Velvia", 2), ("Acros", 1)]);
    }

    #[test]
    fn test_top_by_sensor_includes_empty_sensors() {
        let mut a = record("a", "X-Trans V");
        a.film_simulation = Some("Classic Negative".into());
        let sensors = vec!["X-Trans IV".to_string(), "X-Trans V".to_string()];

        let top = top_by_sensor(&[a], &sensors, Some(5));
        assert!(top["X-Trans IV"].is_empty());
        assert_eq!(
            top["X-Trans V"],
            vec![LabelCount {
                label: "Classic Negative".into(),
                count: 1
            }]
        );
    }

    #[test]
    fn test_white_balance_trend() {
        let mut a = record("a", "s");
        a.wb_shift_red = Some(2);
        a.wb_shift_blue = Some(-4);
        let mut b = record("b", "s");
        b.wb_shift_red = Some(0);
        b.wb_shift_blue = Some(-2);
        let mut c = record("c", "s");
        c.wb_shift_blue = Some(9);

        let trend = white_balance_trend(&[a, b, c]).unwrap();
        assert_eq!(trend.samples, 2);
        assert_eq!(trend.avg_red, 1.0);
        assert_eq!(trend.avg_blue, Some(-3.0));
        assert_eq!(trend.tone, Tone::Warmer);
    }

    #[test]
    fn test_white_balance_trend_cooler_and_empty() {
        let mut a = record("a", "s");
        a.wb_shift_red = Some(-1);
        a.wb_shift_blue = Some(3);
        assert_eq!(white_balance_trend(&[a]).unwrap().tone, Tone::Cooler);

        assert_eq!(white_balance_trend(&[record("b", "s")]), None);
    }
}
