//! Date filtering: range matching, relative presets, input defaults.

pub mod dates;
pub mod defaults;
pub mod relative;

use chrono::NaiveDate;

use crate::types::{FilterBounds, DATE_FORMAT};

/// An inclusive date range. A `None` bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Range with no restriction on either side — the "any" selection.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// True when neither side restricts matching.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Render as key-range bounds in the canonical date format.
    pub fn to_bounds(&self) -> FilterBounds {
        FilterBounds {
            from: self.start.map(|d| d.format(DATE_FORMAT).to_string()),
            to: self.end.map(|d| d.format(DATE_FORMAT).to_string()),
        }
    }
}
