//! Single-constraint checks.
//!
//! Each function takes the optional bounds it cares about and returns `None` when they are
//! consistent, or one human-readable message when they are not. An absent bound never
//! produces an error. Callers compose several of these to check a whole type descriptor.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use regex::Regex;

/// The only accepted textual date layout.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Most fractional digits an `f64` can meaningfully display.
pub const MAX_DECIMALS: i32 = 17;

/// Parse a strict `YYYY-MM-DD` date: no sign, no surrounding whitespace.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 {
        return None;
    }
    let shaped = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Render `date` with a strftime pattern, or `None` if the pattern cannot format a bare date.
pub fn format_date(date: NaiveDate, format: &str) -> Option<String> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return None;
    }
    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}

pub fn check_numeric_range(min: Option<f64>, max: Option<f64>) -> Option<String> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Some("Max must be ≥ min".to_string()),
        _ => None,
    }
}

pub fn check_step(step: Option<f64>) -> Option<String> {
    match step {
        Some(step) if step <= 0.0 => Some("Step must be positive".to_string()),
        _ => None,
    }
}

pub fn check_decimals(decimals: Option<i32>) -> Option<String> {
    match decimals {
        Some(d) if d < 0 => Some("Decimals must be non-negative".to_string()),
        Some(d) if d > MAX_DECIMALS => Some(format!("Decimals must be at most {}", MAX_DECIMALS)),
        _ => None,
    }
}

/// A display pattern is usable when it renders a calendar date without needing a time or zone.
pub fn check_date_format(format: Option<&str>) -> Option<String> {
    let format = format?;
    let sample = NaiveDate::from_ymd_opt(2000, 1, 31)?;
    let broken = format.trim().is_empty() || format_date(sample, format).is_none();
    broken.then(|| "Invalid date format pattern".to_string())
}

pub fn check_date(date: Option<&str>) -> Option<String> {
    let date = date?;
    match parse_date(date) {
        Some(_) => None,
        None => Some("Invalid date (use YYYY-MM-DD)".to_string()),
    }
}

/// Unparseable bounds are skipped here; [`check_date`] reports them.
pub fn check_date_range(min_date: Option<&str>, max_date: Option<&str>) -> Option<String> {
    let min = parse_date(min_date?)?;
    let max = parse_date(max_date?)?;
    (min > max).then(|| "Max date must be ≥ min date".to_string())
}

pub fn check_max_length(max_length: Option<i64>) -> Option<String> {
    match max_length {
        Some(n) if n <= 0 => Some("Max length must be positive".to_string()),
        _ => None,
    }
}

pub fn check_min_length(min_length: Option<i64>) -> Option<String> {
    match min_length {
        Some(n) if n < 0 => Some("Min length must be non-negative".to_string()),
        _ => None,
    }
}

pub fn check_length_range(min_length: Option<i64>, max_length: Option<i64>) -> Option<String> {
    match (min_length, max_length) {
        (Some(min), Some(max)) if min > max => Some("Max length must be ≥ min length".to_string()),
        _ => None,
    }
}

pub fn check_min_selections(min_selections: Option<i64>) -> Option<String> {
    match min_selections {
        Some(n) if n < 0 => Some("Min selections must be non-negative".to_string()),
        _ => None,
    }
}

pub fn check_max_selections(max_selections: Option<i64>) -> Option<String> {
    match max_selections {
        Some(n) if n <= 0 => Some("Max selections must be positive".to_string()),
        _ => None,
    }
}

pub fn check_selection_range(min_selections: Option<i64>, max_selections: Option<i64>) -> Option<String> {
    match (min_selections, max_selections) {
        (Some(min), Some(max)) if min > max => Some("Max selections must be ≥ min selections".to_string()),
        _ => None,
    }
}

pub fn check_pattern(pattern: Option<&str>) -> Option<String> {
    let pattern = pattern?;
    Regex::new(pattern).err().map(|_| "Invalid pattern".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_bounds_never_fail() {
        assert_eq!(check_numeric_range(None, None), None);
        assert_eq!(check_numeric_range(Some(5.0), None), None);
        assert_eq!(check_step(None), None);
        assert_eq!(check_decimals(None), None);
        assert_eq!(check_date_format(None), None);
        assert_eq!(check_date(None), None);
        assert_eq!(check_date_range(Some("2024-01-01"), None), None);
        assert_eq!(check_max_length(None), None);
        assert_eq!(check_min_length(None), None);
        assert_eq!(check_length_range(None, Some(3)), None);
        assert_eq!(check_min_selections(None), None);
        assert_eq!(check_max_selections(None), None);
        assert_eq!(check_selection_range(Some(1), None), None);
        assert_eq!(check_pattern(None), None);
    }

    #[test]
    fn test_numeric_bounds() {
        assert_eq!(check_numeric_range(Some(10.0), Some(1.0)).as_deref(), Some("Max must be ≥ min"));
        assert_eq!(check_numeric_range(Some(1.0), Some(1.0)), None);
        assert_eq!(check_step(Some(0.0)).as_deref(), Some("Step must be positive"));
        assert_eq!(check_step(Some(0.5)), None);
        assert_eq!(check_decimals(Some(-1)).as_deref(), Some("Decimals must be non-negative"));
        assert_eq!(check_decimals(Some(0)), None);
        assert_eq!(check_decimals(Some(17)), None);
        assert_eq!(check_decimals(Some(i32::MAX)).as_deref(), Some("Decimals must be at most 17"));
    }

    #[test]
    fn test_dates() {
        assert_eq!(check_date(Some("2024-02-29")), None);
        assert_eq!(check_date(Some("2023-02-29")).as_deref(), Some("Invalid date (use YYYY-MM-DD)"));
        assert_eq!(check_date(Some("01/02/2024")).as_deref(), Some("Invalid date (use YYYY-MM-DD)"));
        assert_eq!(check_date(Some("2024-1-5")).as_deref(), Some("Invalid date (use YYYY-MM-DD)"));
        for loose in ["-999-01-01", "+999-01-01", " 2024-01-01", "2024-01-01 ", "2024/01/01"] {
            assert_eq!(parse_date(loose), None, "{:?} should not parse", loose);
            assert_eq!(check_date(Some(loose)).as_deref(), Some("Invalid date (use YYYY-MM-DD)"));
        }

        assert_eq!(
            check_date_range(Some("2024-06-01"), Some("2024-01-01")).as_deref(),
            Some("Max date must be ≥ min date")
        );
        assert_eq!(check_date_range(Some("2024-01-01"), Some("2024-01-01")), None);
        // A broken bound is reported by check_date, not twice.
        assert_eq!(check_date_range(Some("garbage"), Some("2024-01-01")), None);
    }

    #[test]
    fn test_date_format_pattern() {
        assert_eq!(check_date_format(Some("%d/%m/%Y")), None);
        assert_eq!(check_date_format(Some("%Q")).as_deref(), Some("Invalid date format pattern"));
        assert_eq!(check_date_format(Some("")).as_deref(), Some("Invalid date format pattern"));
        // Valid strftime, but a bare date has no time or offset to render.
        assert_eq!(check_date_format(Some("%H:%M")).as_deref(), Some("Invalid date format pattern"));
        assert_eq!(check_date_format(Some("%Y %z")).as_deref(), Some("Invalid date format pattern"));
        assert_eq!(check_date_format(Some("%A %e %B")), None);
    }

    #[test]
    fn test_lengths() {
        assert_eq!(check_max_length(Some(0)).as_deref(), Some("Max length must be positive"));
        assert_eq!(check_min_length(Some(-1)).as_deref(), Some("Min length must be non-negative"));
        assert_eq!(check_min_length(Some(0)), None);
        assert_eq!(check_length_range(Some(5), Some(2)).as_deref(), Some("Max length must be ≥ min length"));
    }

    #[test]
    fn test_selections() {
        assert_eq!(check_min_selections(Some(-2)).as_deref(), Some("Min selections must be non-negative"));
        assert_eq!(check_max_selections(Some(0)).as_deref(), Some("Max selections must be positive"));
        assert_eq!(
            check_selection_range(Some(3), Some(2)).as_deref(),
            Some("Max selections must be ≥ min selections")
        );
    }

    #[test]
    fn test_pattern() {
        assert_eq!(check_pattern(Some("^[A-Z]{3}-\\d+$")), None);
        assert_eq!(check_pattern(Some("([a-z")).as_deref(), Some("Invalid pattern"));
    }
}
