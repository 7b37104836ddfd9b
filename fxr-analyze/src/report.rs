//! Plain-text report rendering
//!
//! Everything renders to markdown so reports can be pasted into notes or
//! piped to a file.

use crate::consensus::{ConsensusProfile, ConsensusReport, FieldConsensus};
use crate::db::queries::CountRow;
use crate::stats::{LabelCount, StepDistribution, Tone, WhiteBalanceTrend};
use fxr_common::StepField;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Render a markdown table
pub fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "| {} |", headers.join(" | "));
    let _ = writeln!(
        out,
        "|{}|",
        headers.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    );
    for row in rows {
        let _ = writeln!(out, "| {} |", row.join(" | "));
    }
    out
}

fn count_rows(table: &[LabelCount]) -> Vec<Vec<String>> {
    table
        .iter()
        .map(|l| vec![l.label.clone(), l.count.to_string()])
        .collect()
}

fn format_mean(n: f64) -> String {
    format!("{:.2}", n)
}

/// Overall trend summary
pub fn render_trends(
    total: i64,
    per_sensor: &[CountRow],
    top_sims: &[LabelCount],
    by_sensor: &BTreeMap<String, Vec<LabelCount>>,
    wb: Option<&WhiteBalanceTrend>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Recipe trends\n");
    let _ = writeln!(out, "Total recipes: {}\n", total);

    let _ = writeln!(out, "## Recipes per sensor\n");
    let rows: Vec<Vec<String>> = per_sensor
        .iter()
        .map(|r| vec![r.label.clone(), r.count.to_string()])
        .collect();
    out.push_str(&markdown_table(&["Sensor", "Recipes"], &rows));

    let _ = writeln!(out, "\n## Top film simulations\n");
    out.push_str(&markdown_table(&["Film Simulation", "Count"], &count_rows(top_sims)));

    for (sensor, table) in by_sensor {
        let _ = writeln!(out, "\n## Top film simulations: {}\n", sensor);
        if table.is_empty() {
            let _ = writeln!(out, "No recipes.");
        } else {
            out.push_str(&markdown_table(&["Film Simulation", "Count"], &count_rows(table)));
        }
    }

    let _ = writeln!(out, "\n## White balance shift\n");
    match wb {
        Some(trend) => {
            let blue = trend
                .avg_blue
                .map(format_mean)
                .unwrap_or_else(|| "n/a".to_string());
            let tone = match trend.tone {
                Tone::Warmer => "warmer (red/amber)",
                Tone::Cooler => "cooler (blue)",
                Tone::Neutral => "neutral or mixed",
            };
            let _ = writeln!(
                out,
                "Average over {} recipes: red {}, blue {}. Trend: {}.",
                trend.samples,
                format_mean(trend.avg_red),
                blue,
                tone
            );
        }
        None => {
            let _ = writeln!(out, "No white balance shift data.");
        }
    }

    out
}

/// Step field summary table plus per-field histograms
pub fn render_step_distributions(dists: &[(StepField, StepDistribution)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Tone and detail settings\n");

    let rows: Vec<Vec<String>> = dists
        .iter()
        .map(|(field, dist)| match dist {
            StepDistribution::Values {
                count,
                mean,
                min,
                max,
                out_of_range,
                ..
            } => vec![
                field.label().to_string(),
                count.to_string(),
                format_mean(*mean),
                min.to_string(),
                max.to_string(),
                out_of_range.to_string(),
            ],
            StepDistribution::NoData => vec![
                field.label().to_string(),
                "0".to_string(),
                "-".to_string(),
                "-".to_string(),
                "-".to_string(),
                "-".to_string(),
            ],
        })
        .collect();
    out.push_str(&markdown_table(
        &["Setting", "Recipes", "Mean", "Min", "Max", "Out of range"],
        &rows,
    ));

    for (field, dist) in dists {
        if let StepDistribution::Values { histogram, .. } = dist {
            let _ = writeln!(out, "\n## {}\n", field.label());
            let rows: Vec<Vec<String>> = histogram
                .iter()
                .map(|(value, count)| vec![value.to_string(), count.to_string()])
                .collect();
            out.push_str(&markdown_table(&["Value", "Count"], &rows));
        }
    }

    out
}

/// Consensus profile followed by the top `top` ranked recipes
pub fn render_consensus(report: &ConsensusReport<'_>, top: usize) -> String {
    let mut out = String::new();
    let profile = &report.profile;

    let _ = writeln!(out, "# Consensus profile\n");
    let rows: Vec<Vec<String>> = profile
        .entries
        .iter()
        .map(|e| match &e.consensus {
            FieldConsensus::Modal {
                value,
                count,
                support,
            } => vec![
                e.field.label().to_string(),
                value.to_string(),
                format!("{}/{}", count, support),
            ],
            FieldConsensus::NoData => vec![
                e.field.label().to_string(),
                "no consensus".to_string(),
                "0/0".to_string(),
            ],
        })
        .collect();
    out.push_str(&markdown_table(&["Field", "Consensus", "Share"], &rows));

    let _ = writeln!(out, "\n# Closest existing recipes\n");
    if report.ranked.is_empty() {
        let _ = writeln!(out, "No recipes stored.");
        return out;
    }

    let possible = profile.possible_score();
    for (i, ranked) in report.ranked.iter().take(top).enumerate() {
        let _ = writeln!(
            out,
            "{}. {} ({}) {}/{} {}",
            i + 1,
            ranked.record.name,
            ranked.record.sensor,
            ranked.matches,
            possible,
            ranked.record.url
        );
    }

    out
}

/// The synthesized "average" recipe as a Setting / Value card
pub fn render_recipe_card(profile: &ConsensusProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# The consensus recipe\n");
    let rows: Vec<Vec<String>> = profile
        .consensus_recipe()
        .into_iter()
        .map(|(setting, value)| vec![setting, value])
        .collect();
    out.push_str(&markdown_table(&["Setting", "Value"], &rows));
    out
}

/// Consensus report as pretty JSON
pub fn consensus_json(report: &ConsensusReport<'_>, top: usize) -> serde_json::Result<String> {
    let ranked: Vec<_> = report.ranked.iter().take(top).collect();
    serde_json::to_string_pretty(&serde_json::json!({
        "profile": report.profile,
        "possible_score": report.profile.possible_score(),
        "ranked": ranked,
    }))
}
