//! Threshold-gated load strategy selection.

use serde::{Deserialize, Serialize};

/// How a session should acquire its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStrategy {
    /// Load everything immediately.
    Auto,
    /// Require a bounding filter before any page fetch begins.
    Filtered,
}

/// Pick a strategy from the a-priori count and the configured threshold.
///
/// A threshold of zero means "no gate". Pure decision; callers re-evaluate
/// whenever the count changes rather than caching the result.
pub fn select_strategy(total_expected: u64, threshold: u64) -> LoadStrategy {
    if threshold == 0 || total_expected <= threshold {
        LoadStrategy::Auto
    } else {
        LoadStrategy::Filtered
    }
}
