// Copyright 2026 Pivotfeed Contributors
// SPDX-License-Identifier: Apache-2.0

//! Wire and domain types shared across the acquisition pipeline.
//!
//! Everything here is serde-derived so it can travel over the remote API
//! and through the progress event stream unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical date format used everywhere dates are rendered as strings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ordered list of field names, fixed for the lifetime of a session.
///
/// Defines the positional-to-named mapping for [`RawRow`] values.
pub type Header = Vec<String>;

/// One row as returned by the remote source: ordered scalar values,
/// one per header position.
pub type RawRow = Vec<Value>;

/// A materialized row: field name → scalar value. Produced one-to-one
/// from a [`RawRow`] via the session [`Header`].
pub type Record = serde_json::Map<String, Value>;

/// Opaque position in the remote dataset's ordering.
///
/// `from_key = None` with `page = 0` denotes the start of a sequence.
/// The remote source supplies the next cursor on every page; an empty or
/// absent `from_key` on that cursor denotes end-of-sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Key the next page should start from.
    pub from_key: Option<String>,
    /// Upper key bound carried through the whole walk.
    pub to_key: Option<String>,
    /// Zero-based page index.
    pub page: u32,
}

impl Cursor {
    /// Cursor pointing at the start of a sequence bounded by `bounds`.
    pub fn start(bounds: &FilterBounds) -> Self {
        Self {
            from_key: bounds.from.clone(),
            to_key: bounds.to.clone(),
            page: 0,
        }
    }

    /// Whether this cursor still points at more data.
    ///
    /// The remote signals end-of-sequence with an empty or absent next key.
    pub fn has_more(&self) -> bool {
        self.from_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Key-range bounds applied to a load. Both sides optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterBounds {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl FilterBounds {
    /// True when neither side restricts the load.
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// One page of raw data from the remote source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Positional rows for this page.
    pub rows: Vec<RawRow>,
    /// Cursor for the next page; `None` or an empty `from_key` means done.
    pub next_cursor: Option<Cursor>,
}

impl Page {
    /// The cursor to continue with, or `None` at end-of-sequence.
    pub fn advance(&self) -> Option<Cursor> {
        self.next_cursor.clone().filter(Cursor::has_more)
    }
}

/// Locale-sensitive calendar parameters, sourced once from remote
/// configuration and immutable for the session's lifetime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalendarParams {
    /// First day of the week: 0 = Sunday .. 6 = Saturday.
    pub week_starts_on: u8,
    /// First month of the fiscal year: 1 = January .. 12 = December.
    pub fiscal_year_start_month: u8,
}

impl Default for CalendarParams {
    fn default() -> Self {
        Self {
            week_starts_on: 0,
            fiscal_year_start_month: 1,
        }
    }
}

/// A named relative-date shorthand ("this month", "last fiscal year").
///
/// The enumerated set is fetched once per session in [`EntityMetadata`]
/// and is immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeFilterPreset {
    /// Machine id, e.g. `this.month`.
    pub id: String,
    /// Human label, e.g. "This month".
    pub label: String,
}

/// Per-entity metadata fetched once at session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Field names in remote positional order.
    pub header: Header,
    /// Names of fields carrying date values.
    pub date_fields: Vec<String>,
    /// Enumerated relative-date presets the remote admits.
    pub relative_filter_presets: Vec<RelativeFilterPreset>,
    /// Calendar parameters for week/fiscal resolution.
    pub calendar: CalendarParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_cursor_carries_bounds() {
        let bounds = FilterBounds {
            from: Some("A".into()),
            to: Some("M".into()),
        };
        let cursor = Cursor::start(&bounds);
        assert_eq!(cursor.from_key.as_deref(), Some("A"));
        assert_eq!(cursor.to_key.as_deref(), Some("M"));
        assert_eq!(cursor.page, 0);
    }

    #[test]
    fn empty_next_key_ends_sequence() {
        let page = Page {
            rows: vec![],
            next_cursor: Some(Cursor {
                from_key: Some(String::new()),
                to_key: None,
                page: 3,
            }),
        };
        assert!(page.advance().is_none());

        let page = Page {
            rows: vec![],
            next_cursor: None,
        };
        assert!(page.advance().is_none());
    }

    #[test]
    fn nonempty_next_key_continues() {
        let page = Page {
            rows: vec![],
            next_cursor: Some(Cursor {
                from_key: Some("K2".into()),
                to_key: None,
                page: 1,
            }),
        };
        let next = page.advance().unwrap();
        assert_eq!(next.from_key.as_deref(), Some("K2"));
        assert_eq!(next.page, 1);
    }

    #[test]
    fn cursor_roundtrips_through_json() {
        let cursor = Cursor {
            from_key: Some("K9".into()),
            to_key: None,
            page: 4,
        };
        let json = serde_json::to_string(&cursor).unwrap();
        let parsed: Cursor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cursor);
    }
}
