//! # candle-recognizer
//!
//! Derived-candle anatomy and single/two-bar candlestick pattern recognition.
//!
//! Raw OHLCV bars are turned into [`DerivedBar`]s (ranges, body extents, tails
//! and single-candle flags), then a [`RecognitionEngine`] evaluates a fixed
//! catalogue of 24 rules over the whole sequence and caches the matching
//! indices per rule.
//!
//! ## Quick Start
//!
//! ```rust
//! use candle_recognizer::prelude::*;
//! use chrono::NaiveDate;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let bars = vec![
//!     RawBar::new(day(1), 100.0, 101.0, 89.0, 90.0, 1_000),
//!     RawBar::new(day(2), 85.0, 111.0, 84.0, 110.0, 1_500),
//! ];
//!
//! let mut engine = RecognitionEngine::new();
//! let analysis = engine.analyze(&derive_all(&bars, Tolerance::default()));
//! assert_eq!(analysis.matches_by_name("bullish engulfing"), &[1]);
//! ```

pub mod catalogue;
pub mod derived;
pub mod rules;

pub mod prelude {
    pub use crate::{
        // Parallel
        analyze_parallel,
        // Catalogue
        catalogue::{default_catalogue, FamilyTolerances, CATALOGUE_SIZE, DEFAULT_TOLERANCE},
        // Derived bars
        derived::{derive_all, CandleFlags, DerivedBar},
        // Rules
        rules::*,
        validate_bars,
        Analysis,
        BarMatches,
        BarMatchesIter,
        BuiltinRule,
        Direction,
        EngineBuilder,
        EngineConfig,
        EngineState,
        InstrumentAnalysis,
        InstrumentError,
        Lookback,
        OHLCVExt,
        // Errors
        PatternError,
        // Core traits
        PatternRule,
        RawBar,
        RecognitionEngine,
        Result,
        RuleCategory,
        RuleMetadata,
        Tolerance,
        OHLCV,
    };
}

use chrono::NaiveDate;
use tracing::{debug, trace, warn};

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors raised at the edges of the engine (input validation, configuration).
///
/// Recognition itself never fails: out-of-range queries and degenerate bars
/// simply produce no matches.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Fraction of a bar's range allowed for "approximately equal" comparisons.
///
/// Always `>= 0`: negative and NaN inputs are clamped to zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Tolerance(f64);

impl Tolerance {
    /// Strict comparisons (approximate equality degrades to `==`)
    pub const ZERO: Self = Self(0.0);

    /// Create a tolerance, clamping to a minimum of 0
    pub fn new(value: f64) -> Self {
        if value.is_nan() || value < 0.0 {
            Self(0.0)
        } else {
            Self(value)
        }
    }

    /// Like [`Tolerance::new`] but rejects NaN and infinite values
    pub fn checked(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(PatternError::InvalidValue(
                "Tolerance cannot be NaN or infinite",
            ));
        }
        Ok(Self::new(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(catalogue::DEFAULT_TOLERANCE)
    }
}

impl serde::Serialize for Tolerance {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Tolerance {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Tolerance::checked(value).map_err(serde::de::Error::custom)
    }
}

/// Number of trailing bars (current one included) a rule examines. Never 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Lookback(usize);

impl Lookback {
    pub const SINGLE: Self = Self(1);
    pub const PAIR: Self = Self(2);

    /// Create a lookback, clamping to a minimum of 1
    pub fn new(value: usize) -> Self {
        Self(value.max(1))
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    /// First index at which a rule with this lookback can match
    #[inline]
    pub fn first_index(self) -> usize {
        self.0 - 1
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self::SINGLE
    }
}

impl serde::Serialize for Lookback {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Lookback {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        usize::deserialize(d).map(Lookback::new)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> u64;

    fn date(&self) -> Option<NaiveDate> {
        None
    }
}

/// Extension trait with candle anatomy for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn top_of_body(&self) -> f64 {
        self.open().max(self.close())
    }

    #[inline]
    fn bottom_of_body(&self) -> f64 {
        self.open().min(self.close())
    }

    #[inline]
    fn body_range(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn upper_tail(&self) -> f64 {
        self.high() - self.top_of_body()
    }

    #[inline]
    fn lower_tail(&self) -> f64 {
        self.bottom_of_body() - self.low()
    }

    #[inline]
    fn direction(&self) -> Direction {
        if self.close() > self.open() {
            Direction::Bullish
        } else if self.open() > self.close() {
            Direction::Bearish
        } else {
            Direction::Neutral
        }
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        let prices = [self.open(), self.high(), self.low(), self.close()];
        if prices.iter().any(|p| p.is_nan()) {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if prices.iter().any(|p| p.is_infinite()) {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if self.high() < self.low() {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "high < low",
            });
        }
        if self.top_of_body() > self.high() {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "open/close above high",
            });
        }
        if self.bottom_of_body() < self.low() {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "open/close below low",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// Validate a whole sequence, reporting the index of the first bad bar.
pub fn validate_bars<T: OHLCV>(bars: &[T]) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            PatternError::InvalidOHLCV { reason, .. } => {
                PatternError::InvalidOHLCV { index: i, reason }
            }
            other => other,
        })?;
    }
    Ok(())
}

// ============================================================
// RAW BAR
// ============================================================

/// One OHLCV observation, as produced by a loader
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl RawBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl OHLCV for RawBar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> u64 {
        self.volume
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

/// Direction of a single candle body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Bullish,
    Neutral,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }

    #[inline]
    pub fn is_neutral(self) -> bool {
        matches!(self, Direction::Neutral)
    }
}

pub use derived::DerivedBar;

// ============================================================
// PATTERN RULE TRAIT
// ============================================================

/// Category of rule by number of bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum RuleCategory {
    SingleBar,
    TwoBar,
    /// Lookback of 3 or more. Only custom rules land here; every builtin
    /// rule is single- or two-bar.
    MultiBar,
}

/// Read-only description of a rule, for presentation binding
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RuleMetadata {
    pub name: &'static str,
    pub lookback: Lookback,
    pub tolerance: Tolerance,
    pub category: RuleCategory,
}

/// A named predicate over `(sequence, index)`.
///
/// Implementations must call [`PatternRule::has_enough_data`] first and
/// return `false` when it fails; insufficient history is a non-match, never
/// an error.
pub trait PatternRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn lookback(&self) -> Lookback;
    fn tolerance(&self) -> Tolerance;
    fn matches(&self, bars: &[DerivedBar], index: usize) -> bool;

    #[inline]
    fn has_enough_data(&self, bars: &[DerivedBar], index: usize) -> bool {
        rules::has_enough_data(bars, index, self.lookback())
    }

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            name: self.name(),
            lookback: self.lookback(),
            tolerance: self.tolerance(),
            category: match self.lookback().get() {
                1 => RuleCategory::SingleBar,
                2 => RuleCategory::TwoBar,
                _ => RuleCategory::MultiBar,
            },
        }
    }
}

// ============================================================
// BUILTIN RULES - generated via macro
// ============================================================

use rules::*;

/// Macro to generate BuiltinRule enum without boilerplate
macro_rules! define_builtin_rules {
    (
        $(
            $variant:ident($rule:ty)
        ),* $(,)?
    ) => {
        /// All builtin rule families - fast path via enum dispatch
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub enum BuiltinRule {
            $($variant($rule)),*
        }

        impl PatternRule for BuiltinRule {
            #[inline]
            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(r) => PatternRule::name(r)),*
                }
            }

            #[inline]
            fn lookback(&self) -> Lookback {
                match self {
                    $(Self::$variant(r) => PatternRule::lookback(r)),*
                }
            }

            #[inline]
            fn tolerance(&self) -> Tolerance {
                match self {
                    $(Self::$variant(r) => PatternRule::tolerance(r)),*
                }
            }

            #[inline]
            fn matches(&self, bars: &[DerivedBar], index: usize) -> bool {
                match self {
                    $(Self::$variant(r) => PatternRule::matches(r, bars, index)),*
                }
            }
        }
    };
}

define_builtin_rules! {
    // Single bar
    Doji(DojiRule),
    DragonflyDoji(DragonflyDojiRule),
    GravestoneDoji(GravestoneDojiRule),
    Marubozu(MarubozuRule),
    Hammer(HammerRule),
    InvertedHammer(InvertedHammerRule),

    // Two bar
    Engulfing(EngulfingRule),
    Harami(HaramiRule),
}

// ============================================================
// ENGINE CONFIG
// ============================================================

/// Engine configuration, fixed once the engine is built
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tolerance used when deriving bars from raw input
    pub bar_tolerance: Tolerance,
    /// Per-family tolerances for the default catalogue
    pub tolerances: catalogue::FamilyTolerances,
    /// Evaluate rules on the rayon thread pool
    pub parallel: bool,
    /// Validate raw bars before deriving them
    pub validate_data: bool,
}

// ============================================================
// ANALYSIS SNAPSHOT
// ============================================================

/// Immutable result of one analysis run: the analyzed bars plus, for every
/// rule ordinal, the ascending list of matching indices.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    bars: Vec<DerivedBar>,
    rules: Vec<RuleMetadata>,
    matches: Vec<Vec<usize>>,
}

impl Analysis {
    /// Match list for rule ordinal `k`; empty if `k` is out of range
    pub fn matches(&self, k: usize) -> &[usize] {
        self.matches.get(k).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Case-insensitive lookup by rule name; empty if unknown
    pub fn matches_by_name(&self, name: &str) -> &[usize] {
        self.ordinal_of(name)
            .map(|k| self.matches(k))
            .unwrap_or(&[])
    }

    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .position(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn derived_at(&self, index: usize) -> Option<&DerivedBar> {
        self.bars.get(index)
    }

    pub fn bars(&self) -> &[DerivedBar] {
        &self.bars
    }

    pub fn rules(&self) -> &[RuleMetadata] {
        &self.rules
    }

    /// Number of analyzed bars
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn total_matches(&self) -> usize {
        self.matches.iter().map(Vec::len).sum()
    }

    /// Bar spans to annotate for rule `k`: `(first, last)` inclusive.
    /// Single-bar matches give `(i, i)`, two-bar matches `(i - 1, i)`.
    pub fn marker_spans(&self, k: usize) -> Vec<(usize, usize)> {
        let Some(rule) = self.rules.get(k) else {
            return Vec::new();
        };
        let back = rule.lookback.first_index();
        self.matches(k).iter().map(|&i| (i - back, i)).collect()
    }

    /// Names of every rule that matched at `index`, in catalogue order
    pub fn rules_at(&self, index: usize) -> Vec<&'static str> {
        self.ordinals_at(index)
            .into_iter()
            .map(|k| self.rules[k].name)
            .collect()
    }

    fn ordinals_at(&self, index: usize) -> Vec<usize> {
        self.matches
            .iter()
            .enumerate()
            .filter(|(_, m)| m.binary_search(&index).is_ok())
            .map(|(k, _)| k)
            .collect()
    }

    /// Iterate over every bar with the rule ordinals matching there
    pub fn iter(&self) -> BarMatchesIter<'_> {
        BarMatchesIter {
            analysis: self,
            current: 0,
        }
    }
}

/// Rules matched at a specific bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarMatches {
    pub index: usize,
    pub ordinals: Vec<usize>,
}

/// Iterator over bars with their matching rule ordinals
pub struct BarMatchesIter<'a> {
    analysis: &'a Analysis,
    current: usize,
}

impl<'a> Iterator for BarMatchesIter<'a> {
    type Item = BarMatches;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.analysis.len() {
            return None;
        }

        let index = self.current;
        self.current += 1;

        Some(BarMatches {
            index,
            ordinals: self.analysis.ordinals_at(index),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.analysis.len().saturating_sub(self.current);
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for BarMatchesIter<'a> {}

// ============================================================
// RECOGNITION ENGINE
// ============================================================

/// Whether the engine has analyzed anything yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Empty,
    Analyzed,
}

/// Owns the rule catalogue and the latest analysis snapshot
pub struct RecognitionEngine {
    builtin: Vec<BuiltinRule>,
    custom: Vec<Box<dyn PatternRule>>,
    config: EngineConfig,
    analysis: Option<Analysis>,
}

impl Default for RecognitionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecognitionEngine {
    /// Engine with the default 24-rule catalogue and default config
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine with the default catalogue built from `config`'s tolerances
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            builtin: catalogue::default_catalogue(&config.tolerances),
            custom: Vec::new(),
            config,
            analysis: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        match self.analysis {
            Some(_) => EngineState::Analyzed,
            None => EngineState::Empty,
        }
    }

    // ===========================================
    // Catalogue
    // ===========================================

    pub fn rule_count(&self) -> usize {
        self.builtin.len() + self.custom.len()
    }

    /// Rule at ordinal `k`: builtins first, then custom rules
    pub fn rule(&self, k: usize) -> Option<&dyn PatternRule> {
        match self.builtin.get(k) {
            Some(r) => Some(r as &dyn PatternRule),
            None => self
                .custom
                .get(k - self.builtin.len())
                .map(|r| r.as_ref()),
        }
    }

    /// Metadata of every rule in catalogue order
    pub fn rule_catalogue(&self) -> Vec<RuleMetadata> {
        self.builtin
            .iter()
            .map(|r| r.metadata())
            .chain(self.custom.iter().map(|r| r.metadata()))
            .collect()
    }

    // ===========================================
    // Analysis
    // ===========================================

    /// Evaluate every rule over `bars` without touching engine state.
    pub fn evaluate(&self, bars: &[DerivedBar]) -> Analysis {
        self.evaluate_owned(bars.to_vec())
    }

    /// Derive `bars` at the configured bar tolerance and evaluate them.
    /// Validates first when `validate_data` is set.
    pub fn evaluate_raw(&self, bars: &[RawBar]) -> Result<Analysis> {
        if self.config.validate_data {
            if let Err(e) = validate_bars(bars) {
                warn!(error = %e, "rejected raw bars");
                return Err(e);
            }
        }
        let derived = derived::derive_all(bars, self.config.bar_tolerance);
        Ok(self.evaluate_owned(derived))
    }

    /// Replace the cached results with a fresh analysis of `bars`
    pub fn analyze(&mut self, bars: &[DerivedBar]) -> &Analysis {
        let analysis = self.evaluate(bars);
        self.analysis.insert(analysis)
    }

    /// [`RecognitionEngine::analyze`] over raw bars
    pub fn analyze_raw(&mut self, bars: &[RawBar]) -> Result<&Analysis> {
        let analysis = self.evaluate_raw(bars)?;
        let analysis = &*self.analysis.insert(analysis);
        Ok(analysis)
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    /// Cached matches of rule ordinal `k`; empty before any analysis
    pub fn matches_by_index(&self, k: usize) -> &[usize] {
        self.analysis.as_ref().map(|a| a.matches(k)).unwrap_or(&[])
    }

    /// Cached matches by case-insensitive rule name
    pub fn matches_by_name(&self, name: &str) -> &[usize] {
        self.analysis
            .as_ref()
            .map(|a| a.matches_by_name(name))
            .unwrap_or(&[])
    }

    pub fn derived_at(&self, index: usize) -> Option<&DerivedBar> {
        self.analysis.as_ref().and_then(|a| a.derived_at(index))
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn evaluate_owned(&self, bars: Vec<DerivedBar>) -> Analysis {
        debug!(
            bars = bars.len(),
            rules = self.rule_count(),
            parallel = self.config.parallel,
            "analyzing sequence"
        );

        let matches: Vec<Vec<usize>> = if self.config.parallel {
            let mut matches: Vec<Vec<usize>> = self
                .builtin
                .par_iter()
                .map(|r| scan_rule(r, &bars))
                .collect();
            matches.par_extend(self.custom.par_iter().map(|r| scan_rule(r.as_ref(), &bars)));
            matches
        } else {
            // Fast path: builtin rules (enum dispatch, no vtable)
            self.builtin
                .iter()
                .map(|r| scan_rule(r, &bars))
                .chain(self.custom.iter().map(|r| scan_rule(r.as_ref(), &bars)))
                .collect()
        };

        let analysis = Analysis {
            bars,
            rules: self.rule_catalogue(),
            matches,
        };
        for (rule, found) in analysis.rules.iter().zip(&analysis.matches) {
            trace!(rule = rule.name, matches = found.len(), "rule evaluated");
        }
        debug!(total = analysis.total_matches(), "analysis complete");
        analysis
    }
}

/// Ascending indices at which `rule` matches
fn scan_rule<R: PatternRule + ?Sized>(rule: &R, bars: &[DerivedBar]) -> Vec<usize> {
    (rule.lookback().first_index()..bars.len())
        .filter(|&i| rule.matches(bars, i))
        .collect()
}

// ============================================================
// BUILDER
// ============================================================

/// Builtin slot recorded by the builder, resolved in [`EngineBuilder::build`]
#[derive(Debug, Clone, Copy)]
enum BuiltinEntry {
    DefaultCatalogue,
    Rule(BuiltinRule),
}

/// Builder for creating RecognitionEngine instances
pub struct EngineBuilder {
    builtin: Vec<BuiltinEntry>,
    custom: Vec<Box<dyn PatternRule>>,
    config: EngineConfig,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            builtin: Vec::new(),
            custom: Vec::new(),
            config: EngineConfig::default(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Append the 24 default rules. They are built from the final
    /// configuration's family tolerances, whatever the call order.
    pub fn with_default_catalogue(mut self) -> Self {
        self.builtin.push(BuiltinEntry::DefaultCatalogue);
        self
    }

    /// Add a builtin rule
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, rule: BuiltinRule) -> Self {
        self.builtin.push(BuiltinEntry::Rule(rule));
        self
    }

    /// Add a custom rule (slow path, ordinals follow the builtins)
    pub fn add_custom<R: PatternRule + 'static>(mut self, rule: R) -> Self {
        self.custom.push(Box::new(rule));
        self
    }

    /// Enable/disable rayon evaluation
    pub fn parallel(mut self, enable: bool) -> Self {
        self.config.parallel = enable;
        self
    }

    /// Enable/disable raw data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Tolerance used when deriving raw bars
    pub fn bar_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.config.bar_tolerance = tolerance;
        self
    }

    /// Build the engine. Rule names must be unique (case-insensitive).
    pub fn build(self) -> Result<RecognitionEngine> {
        let tolerances = self.config.tolerances;
        let builtin: Vec<BuiltinRule> = self
            .builtin
            .into_iter()
            .flat_map(|entry| match entry {
                BuiltinEntry::DefaultCatalogue => catalogue::default_catalogue(&tolerances),
                BuiltinEntry::Rule(rule) => vec![rule],
            })
            .collect();

        let names: Vec<&'static str> = builtin
            .iter()
            .map(|r| r.name())
            .chain(self.custom.iter().map(|r| r.name()))
            .collect();

        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(PatternError::InvalidConfig(format!(
                    "rule at ordinal {i} has an empty name"
                )));
            }
            if names[..i].iter().any(|n| n.eq_ignore_ascii_case(name)) {
                return Err(PatternError::InvalidConfig(format!(
                    "duplicate rule name '{name}'"
                )));
            }
        }

        Ok(RecognitionEngine {
            builtin,
            custom: self.custom,
            config: self.config,
            analysis: None,
        })
    }
}

// ============================================================
// PARALLEL ANALYSIS
// ============================================================

use rayon::prelude::*;

/// Result of analyzing a single instrument
#[derive(Debug)]
pub struct InstrumentAnalysis {
    pub symbol: String,
    pub analysis: Analysis,
}

/// Error from analyzing a single instrument
#[derive(Debug)]
pub struct InstrumentError {
    pub symbol: String,
    pub error: PatternError,
}

/// Parallel analysis of multiple instruments with one engine
pub fn analyze_parallel<'a, I>(
    engine: &RecognitionEngine,
    instruments: I,
) -> (Vec<InstrumentAnalysis>, Vec<InstrumentError>)
where
    I: IntoParallelIterator<Item = (&'a str, &'a [RawBar])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .evaluate_raw(bars)
                .map(|analysis| InstrumentAnalysis {
                    symbol: symbol.to_string(),
                    analysis,
                })
                .map_err(|error| InstrumentError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
