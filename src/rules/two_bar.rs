//! Two-bar candlestick rules: Engulfing and Harami
//!
//! Both compare body extents of `bars[index - 1]` (prev) and `bars[index]`
//! (curr). Containment is inclusive, size comparison strict. No tolerance is
//! involved.

use super::Variant;
use crate::{DerivedBar, Lookback, PatternRule, Tolerance};

// ============================================================
// PREDICATES
// ============================================================

/// Signature shared by all two-bar predicates
pub type PairPredicate = fn(&DerivedBar, &DerivedBar) -> bool;

/// curr body contains prev body (inclusive) and is strictly larger
#[inline]
fn engulfs(prev: &DerivedBar, curr: &DerivedBar) -> bool {
    curr.bottom_of_body() <= prev.bottom_of_body()
        && curr.top_of_body() >= prev.top_of_body()
        && curr.body_range() > prev.body_range()
}

/// curr body lies inside prev body (inclusive) and is strictly smaller
#[inline]
fn inside(prev: &DerivedBar, curr: &DerivedBar) -> bool {
    curr.bottom_of_body() >= prev.bottom_of_body()
        && curr.top_of_body() <= prev.top_of_body()
        && curr.body_range() < prev.body_range()
}

/// Bearish bar followed by a larger bullish bar that contains its body
pub fn is_bullish_engulfing(prev: &DerivedBar, curr: &DerivedBar) -> bool {
    prev.is_bearish() && curr.is_bullish() && engulfs(prev, curr)
}

/// Bullish bar followed by a larger bearish bar that contains its body
pub fn is_bearish_engulfing(prev: &DerivedBar, curr: &DerivedBar) -> bool {
    prev.is_bullish() && curr.is_bearish() && engulfs(prev, curr)
}

pub fn is_engulfing(prev: &DerivedBar, curr: &DerivedBar) -> bool {
    is_bullish_engulfing(prev, curr) || is_bearish_engulfing(prev, curr)
}

/// Bearish bar followed by a smaller bullish bar inside its body
pub fn is_bullish_harami(prev: &DerivedBar, curr: &DerivedBar) -> bool {
    prev.is_bearish() && curr.is_bullish() && inside(prev, curr)
}

/// Bullish bar followed by a smaller bearish bar inside its body
pub fn is_bearish_harami(prev: &DerivedBar, curr: &DerivedBar) -> bool {
    prev.is_bullish() && curr.is_bearish() && inside(prev, curr)
}

pub fn is_harami(prev: &DerivedBar, curr: &DerivedBar) -> bool {
    is_bullish_harami(prev, curr) || is_bearish_harami(prev, curr)
}

// ============================================================
// RULES
// ============================================================

/// Engulfing (generic, bullish or bearish)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngulfingRule {
    pub variant: Variant,
}

impl EngulfingRule {
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }
}

impl PatternRule for EngulfingRule {
    fn name(&self) -> &'static str {
        self.variant
            .select("Engulfing", "Bullish Engulfing", "Bearish Engulfing")
    }

    fn lookback(&self) -> Lookback {
        Lookback::PAIR
    }

    fn tolerance(&self) -> Tolerance {
        Tolerance::ZERO
    }

    fn matches(&self, bars: &[DerivedBar], index: usize) -> bool {
        if !self.has_enough_data(bars, index) {
            return false;
        }
        let (prev, curr) = (&bars[index - 1], &bars[index]);
        let test = self
            .variant
            .select::<PairPredicate>(is_engulfing, is_bullish_engulfing, is_bearish_engulfing);
        test(prev, curr)
    }
}

/// Harami (generic, bullish or bearish)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HaramiRule {
    pub variant: Variant,
}

impl HaramiRule {
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }
}

impl PatternRule for HaramiRule {
    fn name(&self) -> &'static str {
        self.variant
            .select("Harami", "Bullish Harami", "Bearish Harami")
    }

    fn lookback(&self) -> Lookback {
        Lookback::PAIR
    }

    fn tolerance(&self) -> Tolerance {
        Tolerance::ZERO
    }

    fn matches(&self, bars: &[DerivedBar], index: usize) -> bool {
        if !self.has_enough_data(bars, index) {
            return false;
        }
        let (prev, curr) = (&bars[index - 1], &bars[index]);
        let test = self
            .variant
            .select::<PairPredicate>(is_harami, is_bullish_harami, is_bearish_harami);
        test(prev, curr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawBar;
    use chrono::NaiveDate;

    fn pair(first: (f64, f64), second: (f64, f64)) -> Vec<DerivedBar> {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        [first, second]
            .iter()
            .zip(date.iter_days())
            .map(|(&(o, c), d)| {
                DerivedBar::from_raw(RawBar::new(d, o, o.max(c) + 1.0, o.min(c) - 1.0, c, 10))
            })
            .collect()
    }

    #[test]
    fn test_bullish_engulfing() {
        let bars = pair((100.0, 90.0), (85.0, 110.0));
        assert!(is_bullish_engulfing(&bars[0], &bars[1]));
        assert!(is_engulfing(&bars[0], &bars[1]));
        assert!(!is_bearish_engulfing(&bars[0], &bars[1]));
        assert!(EngulfingRule::new(Variant::Bullish).matches(&bars, 1));
        assert!(!EngulfingRule::new(Variant::Bearish).matches(&bars, 1));
    }

    #[test]
    fn test_bearish_engulfing() {
        let bars = pair((90.0, 100.0), (105.0, 85.0));
        assert!(is_bearish_engulfing(&bars[0], &bars[1]));
        assert!(EngulfingRule::default().matches(&bars, 1));
    }

    #[test]
    fn test_engulfing_boundaries() {
        // shared bottom edge is allowed
        let shared = pair((100.0, 90.0), (90.0, 101.0));
        assert!(is_bullish_engulfing(&shared[0], &shared[1]));

        // identical body extents are not strictly larger
        let equal = pair((100.0, 90.0), (90.0, 100.0));
        assert!(!is_engulfing(&equal[0], &equal[1]));

        // same direction never engulfs
        let same = pair((90.0, 100.0), (85.0, 110.0));
        assert!(!is_engulfing(&same[0], &same[1]));
    }

    #[test]
    fn test_bearish_harami() {
        let bars = pair((80.0, 120.0), (105.0, 95.0));
        assert!(is_bearish_harami(&bars[0], &bars[1]));
        assert!(is_harami(&bars[0], &bars[1]));
        assert!(!is_bullish_harami(&bars[0], &bars[1]));
        assert!(HaramiRule::new(Variant::Bearish).matches(&bars, 1));
    }

    #[test]
    fn test_bullish_harami() {
        let bars = pair((120.0, 80.0), (95.0, 105.0));
        assert!(is_bullish_harami(&bars[0], &bars[1]));
        assert!(HaramiRule::new(Variant::Bullish).matches(&bars, 1));
        assert!(!HaramiRule::new(Variant::Bearish).matches(&bars, 1));
    }

    #[test]
    fn test_harami_boundaries() {
        // touching the top edge is still inside
        let touching = pair((80.0, 120.0), (120.0, 100.0));
        assert!(is_bearish_harami(&touching[0], &touching[1]));

        // neutral second bar is neither variant
        let neutral = pair((80.0, 120.0), (100.0, 100.0));
        assert!(!is_harami(&neutral[0], &neutral[1]));

        // identical body extents are not strictly smaller
        let equal = pair((80.0, 120.0), (120.0, 80.0));
        assert!(!is_harami(&equal[0], &equal[1]));
        assert!(!is_bearish_harami(&equal[0], &equal[1]));
        assert!(!HaramiRule::default().matches(&equal, 1));

        // one tick inside on the bottom edge is enough
        let smaller = pair((80.0, 120.0), (120.0, 80.5));
        assert!(is_bearish_harami(&smaller[0], &smaller[1]));
    }

    #[test]
    fn test_two_bar_rules_need_history() {
        let bars = pair((100.0, 90.0), (85.0, 110.0));
        assert!(!EngulfingRule::default().matches(&bars, 0));
        assert!(!HaramiRule::default().matches(&bars, 0));
        assert!(!EngulfingRule::default().matches(&bars, 2));
        assert!(!EngulfingRule::default().matches(&bars[..1], 0));
    }

    #[test]
    fn test_metadata() {
        let rule = HaramiRule::new(Variant::Bullish);
        assert_eq!(rule.name(), "Bullish Harami");
        assert_eq!(rule.lookback(), Lookback::PAIR);
        assert_eq!(rule.tolerance(), Tolerance::ZERO);
        assert_eq!(EngulfingRule::default().name(), "Engulfing");
    }
}
