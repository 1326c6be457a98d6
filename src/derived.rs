//! Derived candle anatomy
//!
//! A [`DerivedBar`] is a [`RawBar`] together with its measured anatomy
//! (range, body extents, tails, direction) and the single-candle flags
//! computed once at a given tolerance. It is never mutated after
//! construction; use [`DerivedBar::with_tolerance`] or
//! [`DerivedBar::flags_at`] to look at a different tolerance.

use chrono::NaiveDate;

use crate::{
    rules::helpers::{approx_eq, tolerance_threshold},
    Direction, OHLCVExt, RawBar, Tolerance, OHLCV,
};

// ============================================================
// SINGLE-CANDLE FLAGS
// ============================================================

/// Single-candle pattern flags at one tolerance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CandleFlags {
    pub doji: bool,
    pub dragonfly_doji: bool,
    pub gravestone_doji: bool,
    pub marubozu: bool,
    pub marubozu_bullish: bool,
    pub marubozu_bearish: bool,
    pub hammer: bool,
    pub hammer_bullish: bool,
    pub hammer_bearish: bool,
    pub inverted_hammer: bool,
    pub inverted_hammer_bullish: bool,
    pub inverted_hammer_bearish: bool,
}

impl CandleFlags {
    /// Compute every flag for `bar` at `tolerance`.
    ///
    /// Total over real inputs: a bar with `high == low` gets a zero threshold
    /// and fails every rule that requires a range or a body.
    pub fn compute<T: OHLCV>(bar: &T, tolerance: Tolerance) -> Self {
        let open = bar.open();
        let high = bar.high();
        let low = bar.low();
        let close = bar.close();

        let body = bar.body_range();
        let upper = bar.upper_tail();
        let lower = bar.lower_tail();
        let direction = bar.direction();
        let threshold = tolerance_threshold(bar.range(), tolerance.get());
        let has_range = high > low;

        // Doji family: body collapsed to (approximately) a line
        let doji = approx_eq(open, close, threshold) && has_range;
        let dragonfly_doji = doji && approx_eq(open, high, threshold) && low < high;
        let gravestone_doji = doji && approx_eq(open, low, threshold) && has_range;

        // Marubozu is strict whatever the tolerance
        let marubozu_bullish = open == low && close == high && has_range;
        let marubozu_bearish = open == high && close == low && has_range;

        let hammer = approx_eq(bar.top_of_body(), high, threshold)
            && upper <= threshold
            && lower > 2.0 * body
            && body > 0.0;
        let inverted_hammer = approx_eq(bar.bottom_of_body(), low, threshold)
            && lower <= threshold
            && upper > 2.0 * body
            && body > 0.0;

        Self {
            doji,
            dragonfly_doji,
            gravestone_doji,
            marubozu: marubozu_bullish || marubozu_bearish,
            marubozu_bullish,
            marubozu_bearish,
            hammer,
            hammer_bullish: hammer && direction.is_bullish(),
            hammer_bearish: hammer && direction.is_bearish(),
            inverted_hammer,
            inverted_hammer_bullish: inverted_hammer && direction.is_bullish(),
            inverted_hammer_bearish: inverted_hammer && direction.is_bearish(),
        }
    }
}

// ============================================================
// DERIVED BAR
// ============================================================

/// A raw bar plus its anatomy and single-candle flags
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct DerivedBar {
    raw: RawBar,
    direction: Direction,
    range: f64,
    top_of_body: f64,
    bottom_of_body: f64,
    body_range: f64,
    upper_tail: f64,
    lower_tail: f64,
    tolerance: Tolerance,
    flags: CandleFlags,
}

impl DerivedBar {
    /// Derive anatomy and flags from `raw` at `tolerance`
    pub fn new(raw: RawBar, tolerance: Tolerance) -> Self {
        Self {
            raw,
            direction: raw.direction(),
            range: raw.range(),
            top_of_body: raw.top_of_body(),
            bottom_of_body: raw.bottom_of_body(),
            body_range: raw.body_range(),
            upper_tail: raw.upper_tail(),
            lower_tail: raw.lower_tail(),
            tolerance,
            flags: CandleFlags::compute(&raw, tolerance),
        }
    }

    /// Derive at the default tolerance (2%)
    pub fn from_raw(raw: RawBar) -> Self {
        Self::new(raw, Tolerance::default())
    }

    /// Re-derive the same raw bar at another tolerance
    pub fn with_tolerance(&self, tolerance: Tolerance) -> Self {
        Self::new(self.raw, tolerance)
    }

    pub fn raw(&self) -> &RawBar {
        &self.raw
    }

    pub fn date(&self) -> NaiveDate {
        self.raw.date
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.direction.is_bullish()
    }

    #[inline]
    pub fn is_bearish(&self) -> bool {
        self.direction.is_bearish()
    }

    #[inline]
    pub fn is_neutral(&self) -> bool {
        self.direction.is_neutral()
    }

    #[inline]
    pub fn range(&self) -> f64 {
        self.range
    }

    #[inline]
    pub fn top_of_body(&self) -> f64 {
        self.top_of_body
    }

    #[inline]
    pub fn bottom_of_body(&self) -> f64 {
        self.bottom_of_body
    }

    #[inline]
    pub fn body_range(&self) -> f64 {
        self.body_range
    }

    #[inline]
    pub fn upper_tail(&self) -> f64 {
        self.upper_tail
    }

    #[inline]
    pub fn lower_tail(&self) -> f64 {
        self.lower_tail
    }

    /// Tolerance the cached flags were computed at
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Price-unit allowance for approximate comparisons on this bar
    pub fn tolerance_threshold(&self) -> f64 {
        tolerance_threshold(self.range, self.tolerance.get())
    }

    /// Flags at the construction tolerance
    #[inline]
    pub fn flags(&self) -> &CandleFlags {
        &self.flags
    }

    /// Flags at `tolerance`: the cached set when it matches, else recomputed
    #[inline]
    pub fn flags_at(&self, tolerance: Tolerance) -> CandleFlags {
        if tolerance == self.tolerance {
            self.flags
        } else {
            CandleFlags::compute(&self.raw, tolerance)
        }
    }

    pub fn is_doji(&self) -> bool {
        self.flags.doji
    }

    pub fn is_dragonfly_doji(&self) -> bool {
        self.flags.dragonfly_doji
    }

    pub fn is_gravestone_doji(&self) -> bool {
        self.flags.gravestone_doji
    }

    pub fn is_marubozu(&self) -> bool {
        self.flags.marubozu
    }

    pub fn is_marubozu_bullish(&self) -> bool {
        self.flags.marubozu_bullish
    }

    pub fn is_marubozu_bearish(&self) -> bool {
        self.flags.marubozu_bearish
    }

    pub fn is_hammer(&self) -> bool {
        self.flags.hammer
    }

    pub fn is_hammer_bullish(&self) -> bool {
        self.flags.hammer_bullish
    }

    pub fn is_hammer_bearish(&self) -> bool {
        self.flags.hammer_bearish
    }

    pub fn is_inverted_hammer(&self) -> bool {
        self.flags.inverted_hammer
    }

    pub fn is_inverted_hammer_bullish(&self) -> bool {
        self.flags.inverted_hammer_bullish
    }

    pub fn is_inverted_hammer_bearish(&self) -> bool {
        self.flags.inverted_hammer_bearish
    }
}

impl From<RawBar> for DerivedBar {
    fn from(raw: RawBar) -> Self {
        Self::from_raw(raw)
    }
}

impl OHLCV for DerivedBar {
    fn open(&self) -> f64 {
        self.raw.open
    }

    fn high(&self) -> f64 {
        self.raw.high
    }

    fn low(&self) -> f64 {
        self.raw.low
    }

    fn close(&self) -> f64 {
        self.raw.close
    }

    fn volume(&self) -> u64 {
        self.raw.volume
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.raw.date)
    }
}

/// Derive a whole sequence at one tolerance, preserving order
pub fn derive_all(bars: &[RawBar], tolerance: Tolerance) -> Vec<DerivedBar> {
    bars.iter().map(|&raw| DerivedBar::new(raw, tolerance)).collect()
}

// ============================================================
// TESTS
// ============================================================
