//! Resolution of named relative-date presets into concrete date ranges.
//!
//! Preset ids follow the `<tense>.<unit>` grammar of the remote's
//! relative-date option group (`this.month`, `last.fiscal_year`, ...) plus
//! the bare `today` / `yesterday` / `tomorrow` shorthands. The empty id is
//! the "any" preset: a valid no-op selection with both bounds unbounded,
//! distinct from an unresolved state.

use chrono::{Datelike, Duration, Local, NaiveDate};

use super::DateRange;
use crate::error::{AcquireError, Result};
use crate::types::CalendarParams;

/// Resolve `preset_id` against `calendar`, relative to the local date.
///
/// Both bounds of the result are inclusive. An id outside the recognized
/// grammar is an [`AcquireError::InvalidFilterPreset`].
pub fn resolve(preset_id: &str, calendar: &CalendarParams) -> Result<DateRange> {
    resolve_on(preset_id, calendar, Local::now().date_naive())
}

fn resolve_on(preset_id: &str, calendar: &CalendarParams, today: NaiveDate) -> Result<DateRange> {
    let id = preset_id.trim();
    if id.is_empty() {
        return Ok(DateRange::unbounded());
    }

    match id {
        "today" => return Ok(day(today)),
        "yesterday" => return Ok(day(today - Duration::days(1))),
        "tomorrow" => return Ok(day(today + Duration::days(1))),
        _ => {}
    }

    let (tense, unit) = id
        .split_once('.')
        .ok_or_else(|| AcquireError::InvalidFilterPreset(id.to_string()))?;
    let shift: i32 = match tense {
        "this" => 0,
        "last" => -1,
        "next" => 1,
        _ => return Err(AcquireError::InvalidFilterPreset(id.to_string())),
    };

    let range = match unit {
        "day" => day(today + Duration::days(shift as i64)),
        "week" => week(today, calendar.week_starts_on, shift),
        "month" => {
            let (y, m) = add_months(today.year(), today.month(), shift);
            month_span(y, m, 1)
        }
        "quarter" => {
            let quarter_month = (today.month0() / 3) * 3 + 1;
            let (y, m) = add_months(today.year(), quarter_month, shift * 3);
            month_span(y, m, 3)
        }
        "year" => {
            let y = today.year() + shift;
            DateRange {
                start: Some(ymd(y, 1, 1)),
                end: Some(ymd(y, 12, 31)),
            }
        }
        "fiscal_year" => fiscal_year(today, calendar.fiscal_year_start_month, shift),
        _ => return Err(AcquireError::InvalidFilterPreset(id.to_string())),
    };

    Ok(range)
}

fn day(date: NaiveDate) -> DateRange {
    DateRange {
        start: Some(date),
        end: Some(date),
    }
}

fn week(today: NaiveDate, week_starts_on: u8, shift: i32) -> DateRange {
    let week_start = u32::from(week_starts_on.min(6));
    let weekday = today.weekday().num_days_from_sunday();
    let days_back = i64::from((weekday + 7 - week_start) % 7);
    let start = today - Duration::days(days_back) + Duration::days(7 * i64::from(shift));
    DateRange {
        start: Some(start),
        end: Some(start + Duration::days(6)),
    }
}

fn fiscal_year(today: NaiveDate, start_month: u8, shift: i32) -> DateRange {
    let start_month = u32::from(start_month.clamp(1, 12));
    let base_year = if today.month() >= start_month {
        today.year()
    } else {
        today.year() - 1
    } + shift;
    DateRange {
        start: Some(ymd(base_year, start_month, 1)),
        end: Some(ymd(base_year + 1, start_month, 1) - Duration::days(1)),
    }
}

/// Span of `months` whole months starting at (year, month).
fn month_span(year: i32, month: u32, months: i32) -> DateRange {
    let (end_y, end_m) = add_months(year, month, months);
    DateRange {
        start: Some(ymd(year, month, 1)),
        end: Some(ymd(end_y, end_m, 1) - Duration::days(1)),
    }
}

fn add_months(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let zero_based = year * 12 + month as i32 - 1 + delta;
    (zero_based.div_euclid(12), zero_based.rem_euclid(12) as u32 + 1)
}

/// Month and day arguments are pre-clamped by the callers above.
fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::dates::in_range;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn cal(week: u8, fiscal: u8) -> CalendarParams {
        CalendarParams {
            week_starts_on: week,
            fiscal_year_start_month: fiscal,
        }
    }

    #[test]
    fn empty_preset_is_the_any_selection() {
        let range = resolve_on("", &cal(0, 1), d(2026, 8, 30)).unwrap();
        assert!(range.is_unbounded());
        assert!(in_range("1900-01-01", range.start, range.end));
        assert!(in_range("2999-12-31", range.start, range.end));
    }

    #[test]
    fn this_month_spans_the_calendar_month() {
        let range = resolve_on("this.month", &cal(0, 1), d(2026, 2, 14)).unwrap();
        assert_eq!(range.start, Some(d(2026, 2, 1)));
        assert_eq!(range.end, Some(d(2026, 2, 28)));
    }

    #[test]
    fn last_month_handles_year_boundary() {
        let range = resolve_on("last.month", &cal(0, 1), d(2026, 1, 5)).unwrap();
        assert_eq!(range.start, Some(d(2025, 12, 1)));
        assert_eq!(range.end, Some(d(2025, 12, 31)));
    }

    #[test]
    fn this_week_honors_week_start() {
        // 2026-08-26 is a Wednesday.
        let wednesday = d(2026, 8, 26);
        let sunday_start = resolve_on("this.week", &cal(0, 1), wednesday).unwrap();
        assert_eq!(sunday_start.start, Some(d(2026, 8, 23)));
        assert_eq!(sunday_start.end, Some(d(2026, 8, 29)));

        let monday_start = resolve_on("this.week", &cal(1, 1), wednesday).unwrap();
        assert_eq!(monday_start.start, Some(d(2026, 8, 24)));
        assert_eq!(monday_start.end, Some(d(2026, 8, 30)));
    }

    #[test]
    fn last_week_is_seven_days_earlier() {
        let range = resolve_on("last.week", &cal(1, 1), d(2026, 8, 26)).unwrap();
        assert_eq!(range.start, Some(d(2026, 8, 17)));
        assert_eq!(range.end, Some(d(2026, 8, 23)));
    }

    #[test]
    fn fiscal_year_honors_start_month() {
        // April-start fiscal year, queried in August: FY began this April.
        let range = resolve_on("this.fiscal_year", &cal(0, 4), d(2026, 8, 30)).unwrap();
        assert_eq!(range.start, Some(d(2026, 4, 1)));
        assert_eq!(range.end, Some(d(2027, 3, 31)));

        // Queried in February: FY began last April.
        let range = resolve_on("this.fiscal_year", &cal(0, 4), d(2026, 2, 10)).unwrap();
        assert_eq!(range.start, Some(d(2025, 4, 1)));
        assert_eq!(range.end, Some(d(2026, 3, 31)));
    }

    #[test]
    fn last_fiscal_year_shifts_back_one() {
        let range = resolve_on("last.fiscal_year", &cal(0, 7), d(2026, 8, 30)).unwrap();
        assert_eq!(range.start, Some(d(2025, 7, 1)));
        assert_eq!(range.end, Some(d(2026, 6, 30)));
    }

    #[test]
    fn this_quarter_spans_three_months() {
        let range = resolve_on("this.quarter", &cal(0, 1), d(2026, 8, 30)).unwrap();
        assert_eq!(range.start, Some(d(2026, 7, 1)));
        assert_eq!(range.end, Some(d(2026, 9, 30)));
    }

    #[test]
    fn this_year_is_january_through_december() {
        let range = resolve_on("this.year", &cal(0, 1), d(2026, 8, 30)).unwrap();
        assert_eq!(range.start, Some(d(2026, 1, 1)));
        assert_eq!(range.end, Some(d(2026, 12, 31)));
    }

    #[test]
    fn bare_day_shorthands() {
        let today = d(2026, 3, 1);
        assert_eq!(
            resolve_on("yesterday", &cal(0, 1), today).unwrap().start,
            Some(d(2026, 2, 28))
        );
        assert_eq!(
            resolve_on("tomorrow", &cal(0, 1), today).unwrap().end,
            Some(d(2026, 3, 2))
        );
    }

    #[test]
    fn unknown_presets_are_rejected() {
        for id in ["bogus", "this.decade", "soon.month", "this"] {
            let err = resolve_on(id, &cal(0, 1), d(2026, 8, 30)).unwrap_err();
            assert!(matches!(err, AcquireError::InvalidFilterPreset(_)), "{id}");
        }
    }
}
