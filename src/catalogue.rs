//! Rule catalogue and tolerance table
//!
//! The builtin catalogue has a fixed order: six single-bar families
//! (Doji, Dragonfly Doji, Gravestone Doji, Marubozu, Hammer, Inverted Hammer)
//! followed by the two two-bar families (Engulfing, Harami). Every family
//! contributes a generic, a bullish and a bearish rule, in that order.
//!
//! | family          | lookback | tolerance          |
//! |-----------------|----------|--------------------|
//! | Doji (all three)| 1        | 0.02 (configurable)|
//! | Marubozu        | 1        | 0.0 (always)       |
//! | Hammer (both)   | 1        | 0.01 (configurable)|
//! | Engulfing/Harami| 2        | none (0.0)         |

use crate::{
    rules::{
        DojiRule, DragonflyDojiRule, EngulfingRule, GravestoneDojiRule, HammerRule, HaramiRule,
        InvertedHammerRule, MarubozuRule, Variant,
    },
    BuiltinRule, Tolerance,
};

/// Tolerance used to derive bars when none is given
pub const DEFAULT_TOLERANCE: f64 = 0.02;
/// Doji, Dragonfly Doji and Gravestone Doji
pub const DOJI_TOLERANCE: f64 = 0.02;
/// Marubozu is always strict
pub const MARUBOZU_TOLERANCE: f64 = 0.0;
/// Hammer and Inverted Hammer
pub const HAMMER_TOLERANCE: f64 = 0.01;

/// Number of rules in the default catalogue
pub const CATALOGUE_SIZE: usize = 24;

/// Configurable family tolerances. Marubozu and the two-bar families have none.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FamilyTolerances {
    /// Doji, Dragonfly Doji, Gravestone Doji
    pub doji: Tolerance,
    /// Hammer, Inverted Hammer
    pub hammer: Tolerance,
}

impl Default for FamilyTolerances {
    fn default() -> Self {
        Self {
            doji: Tolerance::new_const(DOJI_TOLERANCE),
            hammer: Tolerance::new_const(HAMMER_TOLERANCE),
        }
    }
}

/// Build the 24 builtin rules in catalogue order
pub fn default_catalogue(tolerances: &FamilyTolerances) -> Vec<BuiltinRule> {
    let doji = tolerances.doji;
    let hammer = tolerances.hammer;

    let mut rules = Vec::with_capacity(CATALOGUE_SIZE);
    let mut family = |make: &dyn Fn(Variant) -> BuiltinRule| rules.extend(Variant::ALL.map(make));

    family(&|v| BuiltinRule::Doji(DojiRule::new(v, doji)));
    family(&|v| BuiltinRule::DragonflyDoji(DragonflyDojiRule::new(v, doji)));
    family(&|v| BuiltinRule::GravestoneDoji(GravestoneDojiRule::new(v, doji)));
    family(&|v| BuiltinRule::Marubozu(MarubozuRule::new(v)));
    family(&|v| BuiltinRule::Hammer(HammerRule::new(v, hammer)));
    family(&|v| BuiltinRule::InvertedHammer(InvertedHammerRule::new(v, hammer)));
    family(&|v| BuiltinRule::Engulfing(EngulfingRule::new(v)));
    family(&|v| BuiltinRule::Harami(HaramiRule::new(v)));

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PatternRule;

    #[test]
    fn test_default_catalogue_table() {
        let expected: [(&str, usize, f64); CATALOGUE_SIZE] = [
            ("Doji", 1, 0.02),
            ("Bullish Doji", 1, 0.02),
            ("Bearish Doji", 1, 0.02),
            ("Dragonfly Doji", 1, 0.02),
            ("Bullish Dragonfly Doji", 1, 0.02),
            ("Bearish Dragonfly Doji", 1, 0.02),
            ("Gravestone Doji", 1, 0.02),
            ("Bullish Gravestone Doji", 1, 0.02),
            ("Bearish Gravestone Doji", 1, 0.02),
            ("Marubozu", 1, 0.0),
            ("Bullish Marubozu", 1, 0.0),
            ("Bearish Marubozu", 1, 0.0),
            ("Hammer", 1, 0.01),
            ("Bullish Hammer", 1, 0.01),
            ("Bearish Hammer", 1, 0.01),
            ("Inverted Hammer", 1, 0.01),
            ("Bullish Inverted Hammer", 1, 0.01),
            ("Bearish Inverted Hammer", 1, 0.01),
            ("Engulfing", 2, 0.0),
            ("Bullish Engulfing", 2, 0.0),
            ("Bearish Engulfing", 2, 0.0),
            ("Harami", 2, 0.0),
            ("Bullish Harami", 2, 0.0),
            ("Bearish Harami", 2, 0.0),
        ];

        let rules = default_catalogue(&FamilyTolerances::default());
        assert_eq!(rules.len(), CATALOGUE_SIZE);
        for (rule, (name, lookback, tolerance)) in rules.iter().zip(expected) {
            assert_eq!(rule.name(), name);
            assert_eq!(rule.lookback().get(), lookback, "{name}");
            assert_eq!(rule.tolerance().get(), tolerance, "{name}");
        }
    }

    #[test]
    fn test_family_tolerances_apply() {
        let tolerances = FamilyTolerances {
            doji: Tolerance::new(0.05),
            hammer: Tolerance::new(0.03),
        };
        let rules = default_catalogue(&tolerances);

        assert_eq!(rules[0].tolerance().get(), 0.05);
        assert_eq!(rules[8].tolerance().get(), 0.05);
        // Marubozu stays strict
        assert_eq!(rules[9].tolerance(), Tolerance::ZERO);
        assert_eq!(rules[12].tolerance().get(), 0.03);
        assert_eq!(rules[17].tolerance().get(), 0.03);
        assert_eq!(rules[23].tolerance(), Tolerance::ZERO);
    }

    #[test]
    fn test_family_tolerances_serde() {
        let parsed: FamilyTolerances = serde_json::from_str(r#"{ "doji": 0.1 }"#).unwrap();
        assert_eq!(parsed.doji.get(), 0.1);
        assert_eq!(parsed.hammer.get(), HAMMER_TOLERANCE);

        let clamped: FamilyTolerances = serde_json::from_str(r#"{ "hammer": -1.0 }"#).unwrap();
        assert_eq!(clamped.hammer, Tolerance::ZERO);
    }
}
