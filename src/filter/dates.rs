//! Pure date-range predicate over string date values.
//!
//! Values arrive as strings in whatever shape the remote stored them;
//! comparison is on the normalized calendar date with time-of-day ignored.

use chrono::{NaiveDate, NaiveDateTime};

use super::DateRange;

/// Date-only formats tried first, then datetime formats whose time part
/// is discarded. `%Y-%m-%d` is canonical; for ambiguous slash dates,
/// day-first wins over month-first.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a date value tolerantly. Returns `None` rather than erroring on
/// unparseable input.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Is `value` within the inclusive `[start, end]` range?
///
/// Either bound may be absent, meaning unbounded on that side. A value that
/// fails to parse as a date is not in range — never an error. A range with
/// `start > end` is always empty by definition; it is never auto-swapped.
pub fn in_range(value: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return false;
        }
    }

    let date = match parse_date(value) {
        Some(d) => d,
        None => return false,
    };

    if let Some(s) = start {
        if date < s {
            return false;
        }
    }
    if let Some(e) = end {
        if date > e {
            return false;
        }
    }
    true
}

/// Convenience wrapper over [`in_range`] for a [`DateRange`].
pub fn matches_range(value: &str, range: &DateRange) -> bool {
    in_range(value, range.start, range.end)
}
