//! Date heuristics for folder-organized photo trees.
//!
//! Photo libraries rarely carry reliable dates in a database; the date is
//! usually in the folder names (`2022/2022-05-01 Beach/IMG_0001.jpg`,
//! `Scans/1998_07/...`). Everything in this module is a pure, total function
//! over strings: no I/O, no panics, and malformed input degrades to "no date"
//! rather than an error.
//!
//! ## Functions
//!
//! | Function | Input | Output |
//! |---|---|---|
//! | [`infer_path_date_hint`] | relative path | human label such as `2022-05-01` or `2022` |
//! | [`extract_date_value`] | relative path | sortable `YYYYMMDD` integer |
//! | [`parse_date_label`] | free text | calendar date |
//! | [`format_display_date`] | free text | `"May 1, 2022"` |
//! | [`format_date_value`] | `YYYYMMDD` integer | `"May 1, 2022"` |
//!
//! ## Date values
//!
//! A date value packs year, month and day into one integer so that numeric
//! order equals chronological order. Missing components are zero:
//! `2022/05` → `20220500`, `2022` → `20220000`.

use chrono::NaiveDate;

/// Textual "Month Day, Year" layouts accepted by [`parse_date_label`], tried in order.
const TEXTUAL_FORMATS: &[&str] = &[
    "%B %d %Y",
    "%b %d %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Guess a short date label from the path segments, leaf first.
///
/// A segment qualifies when it is a bare four-digit year (`2019`), or when it
/// is at least eight characters long, starts with four digits and contains at
/// least two separators once `_` is normalized to `-` (`2019_07_04` →
/// `2019-07-04`). The first qualifying segment from the leaf wins.
///
/// - `2022-05-01/a.jpg` → `Some("2022-05-01")`
/// - `2019/trip/a.jpg` → `Some("2019")`
/// - `misc/c.jpg` → `None`
pub fn infer_path_date_hint(relative_path: &str) -> Option<String> {
    for segment in relative_path.rsplit('/').filter(|s| !s.is_empty()) {
        let normalized = segment.replace('-', "_");
        if normalized.len() == 4 && normalized.bytes().all(|b| b.is_ascii_digit()) {
            return Some(normalized);
        }
        if normalized.len() >= 8 && normalized.as_bytes()[..4].iter().all(u8::is_ascii_digit) {
            let cleaned = normalized.replace('_', "-");
            if cleaned.matches('-').count() >= 2 {
                return Some(cleaned);
            }
        }
    }
    None
}

/// Extract a sortable `YYYYMMDD` value from anywhere in a path.
///
/// The path is split into runs of ASCII digits. The first four-digit run that
/// starts with `19` or `20` is the year. If the next run is exactly two digits
/// and a valid month it is consumed, and likewise a following two-digit day
/// (only looked at once a month was found). Missing parts are `00`.
///
/// Returns `None` when no year-like run exists.
pub fn extract_date_value(relative_path: &str) -> Option<u32> {
    let tokens: Vec<&str> = relative_path
        .split(|c: char| !c.is_ascii_digit())
        .filter(|t| !t.is_empty())
        .collect();

    let idx = tokens
        .iter()
        .position(|t| t.len() == 4 && (t.starts_with("19") || t.starts_with("20")))?;
    let year: u32 = tokens[idx].parse().ok()?;

    let two_digit = |i: usize, range: std::ops::RangeInclusive<u32>| {
        tokens
            .get(i)
            .filter(|t| t.len() == 2)
            .and_then(|t| t.parse::<u32>().ok())
            .filter(|v| range.contains(v))
    };

    let month = two_digit(idx + 1, 1..=12);
    let day = month.and_then(|_| two_digit(idx + 2, 1..=31));

    Some(year * 10_000 + month.unwrap_or(0) * 100 + day.unwrap_or(0))
}

/// Parse a folder name or free-form label as a calendar date.
///
/// Tried in order:
/// 1. `YYYY-M-D` after normalizing `_`, `/` and `.` to `-`. A label of this
///    shape that is not a real date yields `None` without trying further.
/// 2. The first eight digits anywhere in the text as `YYYYMMDD`.
/// 3. Textual layouts like `May 1 2022`, `May 1, 2022` or `1 May 2022`.
pub fn parse_date_label(text: &str) -> Option<NaiveDate> {
    let normalized = text.trim();
    if normalized.is_empty() {
        return None;
    }

    let cleaned = normalized.replace(['_', '/', '.'], "-");
    if let Some((year, month, day)) = split_iso_like(&cleaned) {
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let digits: String = normalized.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 8
        && let (Ok(year), Ok(month), Ok(day)) = (
            digits[..4].parse::<i32>(),
            digits[4..6].parse::<u32>(),
            digits[6..8].parse::<u32>(),
        )
        && let Some(date) = NaiveDate::from_ymd_opt(year, month, day)
    {
        return Some(date);
    }

    TEXTUAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(normalized, fmt).ok())
}

/// Match `DDDD-D{1,2}-D{1,2}` exactly.
fn split_iso_like(text: &str) -> Option<(i32, u32, u32)> {
    let mut parts = text.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if year.len() != 4 || !all_digits(year) {
        return None;
    }
    if !(1..=2).contains(&month.len()) || !all_digits(month) {
        return None;
    }
    if !(1..=2).contains(&day.len()) || !all_digits(day) {
        return None;
    }
    Some((year.parse().ok()?, month.parse().ok()?, day.parse().ok()?))
}

/// Render a date as `"Month D, YYYY"` (no zero padding on the day).
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Parse `label` with [`parse_date_label`] and render it for display.
pub fn format_display_date(label: &str) -> Option<String> {
    parse_date_label(label).map(format_date)
}

/// Render a packed `YYYYMMDD` value for display.
///
/// Returns `None` for zero and for values whose month or day is `00` or
/// otherwise not a real calendar date.
pub fn format_date_value(value: u32) -> Option<String> {
    if value == 0 {
        return None;
    }
    let year = (value / 10_000) as i32;
    let month = (value % 10_000) / 100;
    let day = value % 100;
    NaiveDate::from_ymd_opt(year, month, day).map(format_date)
}
