//! Common comparison helpers shared by all rule modules
//!
//! "Approximately equal" is measured in price units: the bar's range scaled
//! by a tolerance fraction. A bar with no range gets a zero threshold, so the
//! comparison degrades to exact equality.

use crate::{DerivedBar, Lookback};

/// Absolute allowance for approximate comparisons on one bar
#[inline]
pub fn tolerance_threshold(range: f64, tolerance: f64) -> f64 {
    range * tolerance
}

/// `|a - b| <= threshold`
#[inline]
pub fn approx_eq(a: f64, b: f64, threshold: f64) -> bool {
    (a - b).abs() <= threshold
}

/// True iff `bars` is non-empty and `lookback - 1 <= index < bars.len()`
#[inline]
pub fn has_enough_data(bars: &[DerivedBar], index: usize, lookback: Lookback) -> bool {
    !bars.is_empty() && index >= lookback.first_index() && index < bars.len()
}
