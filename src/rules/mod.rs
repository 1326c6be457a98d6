//! Candlestick pattern rules
//!
//! # Rule Families
//!
//! - **Single-bar (18)**: Doji, Dragonfly Doji, Gravestone Doji, Marubozu,
//!   Hammer, Inverted Hammer; each as generic, bullish and bearish.
//! - **Two-bar (6)**: Engulfing and Harami; each as generic, bullish and bearish.

pub mod helpers;
pub mod single_bar;
pub mod two_bar;

pub use helpers::*;
pub use single_bar::*;
pub use two_bar::*;

use crate::Direction;

/// Which direction(s) a rule accepts within its family
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Variant {
    /// Any direction
    #[default]
    Any,
    Bullish,
    Bearish,
}

impl Variant {
    /// Catalogue order within a family
    pub const ALL: [Variant; 3] = [Variant::Any, Variant::Bullish, Variant::Bearish];

    /// Pick the value belonging to this variant
    #[inline]
    pub fn select<T>(self, any: T, bullish: T, bearish: T) -> T {
        match self {
            Variant::Any => any,
            Variant::Bullish => bullish,
            Variant::Bearish => bearish,
        }
    }

    /// True if a candle of `direction` satisfies this variant
    #[inline]
    pub fn admits(self, direction: Direction) -> bool {
        match self {
            Variant::Any => true,
            Variant::Bullish => direction.is_bullish(),
            Variant::Bearish => direction.is_bearish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_select() {
        assert_eq!(Variant::Any.select(1, 2, 3), 1);
        assert_eq!(Variant::Bullish.select(1, 2, 3), 2);
        assert_eq!(Variant::Bearish.select(1, 2, 3), 3);
    }

    #[test]
    fn test_variant_admits() {
        assert!(Variant::Any.admits(Direction::Neutral));
        assert!(Variant::Bullish.admits(Direction::Bullish));
        assert!(!Variant::Bullish.admits(Direction::Neutral));
        assert!(!Variant::Bearish.admits(Direction::Bullish));
    }
}
