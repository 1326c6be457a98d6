//! Single-bar candlestick rules
//!
//! Families: Doji, Dragonfly Doji, Gravestone Doji, Marubozu, Hammer,
//! Inverted Hammer. Each rule reads the flags of `bars[index]` at its own
//! tolerance: the bar's cached flags when the tolerances agree, otherwise a
//! fresh computation (see [`DerivedBar::flags_at`]).

use super::Variant;
use crate::{
    catalogue::{DOJI_TOLERANCE, HAMMER_TOLERANCE, MARUBOZU_TOLERANCE},
    derived::CandleFlags,
    DerivedBar, Lookback, PatternRule, Tolerance,
};

/// Generate a tolerance-driven single-bar rule family.
///
/// `$test` receives the bar's flags at the rule tolerance, the bar itself and
/// the rule variant.
macro_rules! single_bar_rules {
    ($(
        $(#[$doc:meta])*
        $rule:ident {
            tolerance: $tolerance:expr,
            names: [$generic:literal, $bullish:literal, $bearish:literal],
            test: |$flags:ident, $bar:ident, $variant:ident| $test:expr $(,)?
        }
    )*) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq)]
            pub struct $rule {
                pub variant: Variant,
                pub tolerance: Tolerance,
            }

            impl $rule {
                pub fn new(variant: Variant, tolerance: Tolerance) -> Self {
                    Self { variant, tolerance }
                }

                pub fn generic() -> Self {
                    Self::new(Variant::Any, Tolerance::new_const($tolerance))
                }

                pub fn bullish() -> Self {
                    Self::new(Variant::Bullish, Tolerance::new_const($tolerance))
                }

                pub fn bearish() -> Self {
                    Self::new(Variant::Bearish, Tolerance::new_const($tolerance))
                }
            }

            impl Default for $rule {
                fn default() -> Self {
                    Self::generic()
                }
            }

            impl PatternRule for $rule {
                fn name(&self) -> &'static str {
                    self.variant.select($generic, $bullish, $bearish)
                }

                fn lookback(&self) -> Lookback {
                    Lookback::SINGLE
                }

                fn tolerance(&self) -> Tolerance {
                    self.tolerance
                }

                fn matches(&self, bars: &[DerivedBar], index: usize) -> bool {
                    if !self.has_enough_data(bars, index) {
                        return false;
                    }
                    let $bar: &DerivedBar = &bars[index];
                    let $flags: CandleFlags = $bar.flags_at(self.tolerance);
                    let $variant: Variant = self.variant;
                    $test
                }
            }
        )*
    };
}

single_bar_rules! {
    /// Doji: open and close approximately equal on a bar with range
    DojiRule {
        tolerance: DOJI_TOLERANCE,
        names: ["Doji", "Bullish Doji", "Bearish Doji"],
        test: |flags, bar, variant| flags.doji && variant.admits(bar.direction()),
    }

    /// Dragonfly Doji: doji with the body at the high
    DragonflyDojiRule {
        tolerance: DOJI_TOLERANCE,
        names: ["Dragonfly Doji", "Bullish Dragonfly Doji", "Bearish Dragonfly Doji"],
        test: |flags, bar, variant| flags.dragonfly_doji && variant.admits(bar.direction()),
    }

    /// Gravestone Doji: doji with the body at the low
    GravestoneDojiRule {
        tolerance: DOJI_TOLERANCE,
        names: ["Gravestone Doji", "Bullish Gravestone Doji", "Bearish Gravestone Doji"],
        test: |flags, bar, variant| flags.gravestone_doji && variant.admits(bar.direction()),
    }

    /// Hammer: body at the top, lower tail more than twice the body
    HammerRule {
        tolerance: HAMMER_TOLERANCE,
        names: ["Hammer", "Bullish Hammer", "Bearish Hammer"],
        test: |flags, _bar, variant| {
            variant.select(flags.hammer, flags.hammer_bullish, flags.hammer_bearish)
        },
    }

    /// Inverted Hammer: body at the bottom, upper tail more than twice the body
    InvertedHammerRule {
        tolerance: HAMMER_TOLERANCE,
        names: ["Inverted Hammer", "Bullish Inverted Hammer", "Bearish Inverted Hammer"],
        test: |flags, _bar, variant| {
            variant.select(
                flags.inverted_hammer,
                flags.inverted_hammer_bullish,
                flags.inverted_hammer_bearish,
            )
        },
    }
}

// ============================================================
// MARUBOZU
// ============================================================

/// Marubozu: no tails at all. Always strict, so it carries no tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarubozuRule {
    pub variant: Variant,
}

impl MarubozuRule {
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }

    pub fn generic() -> Self {
        Self::new(Variant::Any)
    }

    pub fn bullish() -> Self {
        Self::new(Variant::Bullish)
    }

    pub fn bearish() -> Self {
        Self::new(Variant::Bearish)
    }
}

impl PatternRule for MarubozuRule {
    fn name(&self) -> &'static str {
        self.variant
            .select("Marubozu", "Bullish Marubozu", "Bearish Marubozu")
    }

    fn lookback(&self) -> Lookback {
        Lookback::SINGLE
    }

    fn tolerance(&self) -> Tolerance {
        Tolerance::new_const(MARUBOZU_TOLERANCE)
    }

    fn matches(&self, bars: &[DerivedBar], index: usize) -> bool {
        if !self.has_enough_data(bars, index) {
            return false;
        }
        // Tolerance-independent, so the cached flags are always valid
        let bar = &bars[index];
        self.variant.select(
            bar.is_marubozu(),
            bar.is_marubozu_bullish(),
            bar.is_marubozu_bearish(),
        )
    }
}
