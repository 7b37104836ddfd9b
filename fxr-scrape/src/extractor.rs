//! Record extraction
//!
//! Turns the text blocks of one recipe article into a [`RecipeRecord`].
//! Articles list settings as free-form `Key: Value` lines; recognized keys
//! fill the fixed fields, other short keys go to the overflow map, and long
//! "keys" (sentences that happen to contain a colon) are dropped.
//!
//! Extraction never fails. The worst case is a record carrying only its
//! name, sensor and URL.

use fxr_common::RecipeRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Keys at least this long are treated as prose, not settings
pub const MAX_OVERFLOW_KEY_CHARS: usize = 50;

static WB_RED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([+-]?\d+)\s*R(?:ed)?").expect("red shift pattern"));

static WB_BLUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([+-]?\d+)\s*B(?:lue)?").expect("blue shift pattern"));

/// Where a recognized key lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    FilmSimulation,
    DynamicRange,
    GrainEffect,
    WhiteBalance,
    Highlight,
    Shadow,
    Color,
    Sharpness,
    NoiseReduction,
    Clarity,
    Iso,
    ExposureCompensation,
    /// Recognized, but the schema has no column for it
    Overflow,
}

/// Canonical labels, compared case-insensitively against article keys
const ALIASES: &[(&str, Target)] = &[
    ("Film Simulation", Target::FilmSimulation),
    ("Dynamic Range", Target::DynamicRange),
    ("Grain Effect", Target::GrainEffect),
    ("White Balance", Target::WhiteBalance),
    ("Highlight", Target::Highlight),
    ("Shadow", Target::Shadow),
    ("Color", Target::Color),
    ("Sharpness", Target::Sharpness),
    ("Noise Reduction", Target::NoiseReduction),
    ("Clarity", Target::Clarity),
    ("ISO", Target::Iso),
    ("Exposure Compensation", Target::ExposureCompensation),
    ("Color Chrome Effect", Target::Overflow),
    ("Color Chrome FX Blue", Target::Overflow),
];

fn lookup(key: &str) -> Option<Target> {
    ALIASES
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(key))
        .map(|(_, target)| *target)
}

fn slot<'r>(record: &'r mut RecipeRecord, target: Target) -> Option<&'r mut Option<String>> {
    let slot = match target {
        Target::FilmSimulation => &mut record.film_simulation,
        Target::DynamicRange => &mut record.dynamic_range,
        Target::GrainEffect => &mut record.grain_effect,
        Target::WhiteBalance => &mut record.white_balance,
        Target::Highlight => &mut record.highlight,
        Target::Shadow => &mut record.shadow,
        Target::Color => &mut record.color,
        Target::Sharpness => &mut record.sharpness,
        Target::NoiseReduction => &mut record.noise_reduction,
        Target::Clarity => &mut record.clarity,
        Target::Iso => &mut record.iso,
        Target::ExposureCompensation => &mut record.exposure_compensation,
        Target::Overflow => return None,
    };
    Some(slot)
}

/// Replace non-breaking spaces and trim
fn clean_text(text: &str) -> String {
    text.replace('\u{a0}', " ").trim().to_string()
}

/// Split a settings line into trimmed key and value at the first colon
fn split_setting(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    Some((key.trim(), value.trim()))
}

/// Build a record from an article's title and body blocks
///
/// Blocks may contain embedded line breaks; each line is scanned on its own.
/// A key seen twice keeps its last value. Fixed fields with an empty value
/// stay unset.
pub fn extract<S: AsRef<str>>(title: &str, blocks: &[S], sensor: &str, url: &str) -> RecipeRecord {
    let mut record = RecipeRecord::new(clean_text(title), sensor, url);

    for block in blocks {
        for raw_line in block.as_ref().lines() {
            let line = clean_text(raw_line);
            let Some((key, value)) = split_setting(&line) else {
                continue;
            };
            if key.is_empty() {
                continue;
            }

            match lookup(key) {
                Some(target) => match slot(&mut record, target) {
                    Some(field) => {
                        if !value.is_empty() {
                            *field = Some(value.to_string());
                        }
                    }
                    None => {
                        record
                            .extra_settings
                            .insert(key.to_string(), value.to_string());
                    }
                },
                None if key.chars().count() < MAX_OVERFLOW_KEY_CHARS => {
                    record
                        .extra_settings
                        .insert(key.to_string(), value.to_string());
                }
                None => {
                    debug!(url = %url, "Discarding long key: {:.40}...", key);
                }
            }
        }
    }

    if let Some(wb) = record.white_balance.as_deref() {
        let (red, blue) = parse_wb_shift(wb);
        record.wb_shift_red = red;
        record.wb_shift_blue = blue;
    }

    debug!(
        url = %url,
        film_simulation = ?record.film_simulation,
        extra = record.extra_settings.len(),
        "Extracted recipe"
    );

    record
}

/// Red and blue shifts written in a white balance descriptor
///
/// "Auto, -1 Red & -3 Blue" gives `(Some(-1), Some(-3))`; a descriptor with
/// no shift tokens gives `(None, None)`.
pub fn parse_wb_shift(white_balance: &str) -> (Option<i64>, Option<i64>) {
    let capture = |re: &Regex| {
        re.captures(white_balance)
            .and_then(|caps| caps[1].parse::<i64>().ok())
    };
    (capture(&WB_RED_RE), capture(&WB_BLUE_RE))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://fujixweekly.com/2023/05/12/test-recipe/";

    fn extract_body(body: &str) -> RecipeRecord {
        extract("Test Recipe", &[body], "X-Trans V", URL)
    }

    #[test]
    fn test_known_keys_fill_fixed_fields() {
        let record = extract_body(
            "Film Simulation: Classic Chrome\nHighlight: -2\nRandom Sentence: this is not really a key",
        );

        assert_eq!(record.name, "Test Recipe");
        assert_eq!(record.sensor, "X-Trans V");
        assert_eq!(record.url, URL);
        assert_eq!(record.film_simulation.as_deref(), Some("Classic Chrome"));
        assert_eq!(record.highlight.as_deref(), Some("-2"));
        assert_eq!(
            record.extra_settings.get("Random Sentence").map(String::as_str),
            Some("this is not really a key")
        );
    }

    #[test]
    fn test_overflow_key_length_boundary() {
        let short_key = "k".repeat(MAX_OVERFLOW_KEY_CHARS - 1);
        let long_key = "k".repeat(MAX_OVERFLOW_KEY_CHARS);
        let body = format!("{}: kept\n{}: dropped", short_key, long_key);

        let record = extract_body(&body);

        assert_eq!(record.extra_settings.get(&short_key).map(String::as_str), Some("kept"));
        assert!(!record.extra_settings.contains_key(&long_key));
        assert_eq!(record.extra_settings.len(), 1);
    }

    #[test]
    fn test_long_sentence_with_colon_is_discarded() {
        let record = extract_body(
            "When I went out to photograph the coast last autumn I noticed something: the light was soft",
        );
        assert!(record.is_bare());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let record = extract_body("FILM SIMULATION: Eterna\nnoise reduction: -4\niso: Auto, up to ISO 6400");
        assert_eq!(record.film_simulation.as_deref(), Some("Eterna"));
        assert_eq!(record.noise_reduction.as_deref(), Some("-4"));
        assert_eq!(record.iso.as_deref(), Some("Auto, up to ISO 6400"));
    }

    #[test]
    fn test_color_chrome_keys_go_to_overflow() {
        let record = extract_body("Color Chrome Effect: Strong\nColor Chrome FX Blue: Weak\nColor: +2");

        assert_eq!(record.color.as_deref(), Some("+2"));
        assert_eq!(
            record.extra_settings.get("Color Chrome Effect").map(String::as_str),
            Some("Strong")
        );
        assert_eq!(
            record.extra_settings.get("Color Chrome FX Blue").map(String::as_str),
            Some("Weak")
        );
    }

    #[test]
    fn test_value_splits_on_first_colon_only() {
        let record = extract_body("Exposure Compensation: +1/3 to +1 (typically) : varies");
        assert_eq!(
            record.exposure_compensation.as_deref(),
            Some("+1/3 to +1 (typically) : varies")
        );
    }

    #[test]
    fn test_non_breaking_spaces_are_normalized() {
        let record = extract_body("Grain\u{a0}Effect:\u{a0}Strong, Small\u{a0}");
        assert_eq!(record.grain_effect.as_deref(), Some("Strong, Small"));
    }

    #[test]
    fn test_lines_without_colon_and_empty_body_are_skipped() {
        let record = extract("Empty", &[] as &[&str], "X-Trans IV", URL);
        assert!(record.is_bare());

        let record = extract_body("Just some prose\n\nwithout settings");
        assert!(record.is_bare());
    }

    #[test]
    fn test_blocks_are_scanned_in_order() {
        let blocks = ["Film Simulation: Velvia\nShadow: +1", "Shadow: -1\nSharpness: -2"];
        let record = extract("Two Blocks", &blocks, "X-Trans IV", URL);

        assert_eq!(record.film_simulation.as_deref(), Some("Velvia"));
        assert_eq!(record.shadow.as_deref(), Some("-1"));
        assert_eq!(record.sharpness.as_deref(), Some("-2"));
    }

    #[test]
    fn test_empty_value_leaves_field_unset() {
        let record = extract_body("Clarity:\nDynamic Range: DR400");
        assert_eq!(record.clarity, None);
        assert_eq!(record.dynamic_range.as_deref(), Some("DR400"));
    }

    #[test]
    fn test_white_balance_shift_is_parsed() {
        let record = extract_body("White Balance: Auto, -1 Red & -3 Blue");
        assert_eq!(record.wb_shift_red, Some(-1));
        assert_eq!(record.wb_shift_blue, Some(-3));
    }

    #[test]
    fn test_white_balance_without_shift_leaves_both_unset() {
        let record = extract_body("White Balance: Auto");
        assert_eq!(record.white_balance.as_deref(), Some("Auto"));
        assert_eq!(record.wb_shift_red, None);
        assert_eq!(record.wb_shift_blue, None);
    }

    #[test]
    fn test_wb_shift_compact_and_zero_forms() {
        assert_eq!(parse_wb_shift("Auto, +2R -5B"), (Some(2), Some(-5)));
        assert_eq!(parse_wb_shift("Daylight, 0 Red & -4 Blue"), (Some(0), Some(-4)));
        assert_eq!(parse_wb_shift("5200K, +3 Red"), (Some(3), None));
    }
}
