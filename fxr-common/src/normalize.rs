//! Field normalization
//!
//! Turns free-text setting values into comparable forms. Articles write step
//! values inconsistently ("+2", "0 to +2", "-4 (Soft)"), so the numeric view
//! is a best effort:
//!
//! - the first signed number in the text wins (a range "0 to +2" becomes 0)
//! - text without any number means "no shift" and becomes 0
//! - an absent field stays absent, which is distinct from 0

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[+-]?\d+(?:\.\d+)?").expect("number pattern"));

static DR_VALUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(100|200|400)(?:\D|$)").expect("dynamic range pattern"));

// Group 1 is set when the priority is switched off
static DR_PRIORITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:D-RANGE PRIORITY|\bDR-P(?:RIORITY)?\b)(?:\s*[:(]?\s*(OFF)\b)?")
        .expect("dynamic range priority pattern")
});

/// Numeric view of an optional setting value
///
/// `None` stays `None`; present text always yields a number.
pub fn normalize(raw: Option<&str>) -> Option<f64> {
    raw.map(normalize_text)
}

/// Numeric view of a present setting value (0 when the text has no number)
pub fn normalize_text(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);

    NUMBER_RE
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Group a dynamic range descriptor for comparison
///
/// "DR400", "DR 400" and "400%" all land in `DR400`. "D-Range Priority" or
/// "DR-P" lands in `DR-P` unless followed by "Off". "Auto" lands in
/// `DR-Auto`. An explicit percentage wins over any priority mention.
/// Anything else is kept as written (whitespace collapsed).
pub fn dynamic_range_group(raw: &str) -> Option<String> {
    let key = categorical_key(raw)?;
    let upper = key.to_uppercase();

    if let Some(caps) = DR_VALUE_RE.captures(&upper) {
        return Some(format!("DR{}", &caps[1]));
    }
    let priority_on = DR_PRIORITY_RE
        .captures_iter(&upper)
        .any(|caps| caps.get(1).is_none());
    if priority_on {
        return Some("DR-P".to_string());
    }
    if upper.contains("AUTO") {
        return Some("DR-Auto".to_string());
    }
    Some(key)
}

/// Comparable form of a label such as a film simulation name
///
/// Trims and collapses internal whitespace; empty text has no key.
pub fn categorical_key(raw: &str) -> Option<String> {
    let key = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_sign_is_stripped() {
        assert_eq!(normalize(Some("+2")), Some(2.0));
        assert_eq!(normalize(Some("  +1 ")), Some(1.0));
    }

    #[test]
    fn test_number_followed_by_text() {
        assert_eq!(normalize(Some("-4 (Soft)")), Some(-4.0));
        assert_eq!(normalize(Some("Strong, Small")), Some(0.0));
    }

    #[test]
    fn test_absent_is_distinct_from_zero() {
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some("0")), Some(0.0));
    }

    #[test]
    fn test_text_without_number_falls_back_to_zero() {
        assert_eq!(normalize(Some("n/a")), Some(0.0));
        assert_eq!(normalize(Some("")), Some(0.0));
    }

    #[test]
    fn test_range_resolves_to_first_number() {
        assert_eq!(normalize(Some("0 to +2")), Some(0.0));
        assert_eq!(normalize(Some("-1 to -2")), Some(-1.0));
    }

    #[test]
    fn test_half_steps_and_embedded_numbers() {
        assert_eq!(normalize(Some("+1.5")), Some(1.5));
        assert_eq!(normalize(Some("Soft -0.5")), Some(-0.5));
        assert_eq!(normalize(Some("+2/3 to +1")), Some(2.0));
    }

    #[test]
    fn test_dynamic_range_groups() {
        assert_eq!(dynamic_range_group("DR400").as_deref(), Some("DR400"));
        assert_eq!(dynamic_range_group("DR 200").as_deref(), Some("DR200"));
        assert_eq!(dynamic_range_group("400%").as_deref(), Some("DR400"));
        assert_eq!(dynamic_range_group("DR-Auto").as_deref(), Some("DR-Auto"));
        assert_eq!(
            dynamic_range_group("D-Range Priority Auto").as_deref(),
            Some("DR-P")
        );
        assert_eq!(dynamic_range_group("DR-P Auto").as_deref(), Some("DR-P"));
        assert_eq!(dynamic_range_group("DR-P Weak").as_deref(), Some("DR-P"));
        assert_eq!(dynamic_range_group("Off").as_deref(), Some("Off"));
        assert_eq!(dynamic_range_group("   "), None);
    }

    #[test]
    fn test_dynamic_range_priority_off_is_not_priority() {
        assert_eq!(
            dynamic_range_group("DR400 (D-Range Priority Off)").as_deref(),
            Some("DR400")
        );
        assert_eq!(
            dynamic_range_group("DR-Auto, D-Range Priority: Off").as_deref(),
            Some("DR-Auto")
        );
        assert_eq!(
            dynamic_range_group("D-Range Priority Off").as_deref(),
            Some("D-Range Priority Off")
        );
    }

    #[test]
    fn test_categorical_key_collapses_whitespace() {
        assert_eq!(
            categorical_key("  Classic   Chrome ").as_deref(),
            Some("Classic Chrome")
        );
        assert_eq!(categorical_key(""), None);
    }
}
