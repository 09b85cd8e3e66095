//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during screening
//! - exported to JSON/CSV
//! - asserted on directly in tests without capturing terminal output

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One observation for one ticker in one fiscal period.
///
/// `price` and `trailing_metric` are either finite or `None`; rows that fail
/// numeric coercion never become a `Record`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub identifier: String,
    pub period: String,
    pub price: Option<f64>,
    /// Trailing twelve-month EPS.
    pub trailing_metric: Option<f64>,
    /// Every other source column, untouched, in header order.
    pub attributes: Vec<(String, String)>,
}

impl Record {
    /// Price over trailing EPS, `None` when either side is missing or EPS is zero.
    pub fn ratio(&self) -> Option<f64> {
        let price = self.price?;
        let metric = self.trailing_metric?;
        if metric == 0.0 {
            return None;
        }
        Some(price / metric)
    }
}

/// Source column names for the four fields the screen relies on.
///
/// Defaults follow the Compustat quarterly export (`tic`, `datafqtr`, `prccq`, `epsf12`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub identifier: String,
    pub period: String,
    pub price: String,
    pub trailing_metric: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            identifier: "tic".to_string(),
            period: "datafqtr".to_string(),
            price: "prccq".to_string(),
            trailing_metric: "epsf12".to_string(),
        }
    }
}

/// Open interval `(lower, upper)` a P/E must fall into to pass the screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioBand {
    pub lower: f64,
    pub upper: f64,
}

impl RatioBand {
    pub fn contains(&self, ratio: f64) -> bool {
        ratio > self.lower && ratio < self.upper
    }
}

impl Default for RatioBand {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 20.0,
        }
    }
}

/// Favorable PEG cutoff used when none is configured.
pub const DEFAULT_PEG_THRESHOLD: f64 = 1.0;

/// Resolved run configuration (CLI + environment).
#[derive(Debug, Clone)]
pub struct ScreenConfig {
    pub input: PathBuf,
    pub period: String,
    pub peg_threshold: f64,
    pub band: RatioBand,
    pub columns: ColumnMap,
    pub bars: bool,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("healthcare.csv"),
            period: "2016Q1".to_string(),
            peg_threshold: DEFAULT_PEG_THRESHOLD,
            band: RatioBand::default(),
            columns: ColumnMap::default(),
            bars: true,
            export_csv: None,
            export_json: None,
        }
    }
}

/// A record that passed the P/E screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenedStock {
    pub identifier: String,
    pub ratio: f64,
    pub price: f64,
    pub trailing_metric: f64,
}

/// Why in-period records were rejected, counted in precedence order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBreakdown {
    pub total_in_period: usize,
    pub missing_price: usize,
    pub missing_metric: usize,
    pub zero_metric: usize,
    pub negative_ratio: usize,
    pub high_ratio: usize,
    pub accepted: usize,
}

/// Spread of the positive P/E ratios computed for a period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioDistribution {
    pub lowest: f64,
    pub highest: f64,
    pub below_10: usize,
    pub from_10_to_20: usize,
    pub from_20_to_30: usize,
    pub from_30_to_50: usize,
    pub above_50: usize,
}

/// Raw inputs of an in-period record, kept for the diagnostic preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub identifier: String,
    pub price: Option<f64>,
    pub trailing_metric: Option<f64>,
}

impl SampleRow {
    pub fn ratio(&self) -> Option<f64> {
        match (self.price, self.trailing_metric) {
            (Some(p), Some(m)) if m != 0.0 => Some(p / m),
            _ => None,
        }
    }
}

/// Full output of a P/E screen over one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screening {
    pub period: String,
    pub band: RatioBand,
    /// Accepted stocks, ascending by ratio.
    pub stocks: Vec<ScreenedStock>,
    pub breakdown: ScreenBreakdown,
    pub distribution: Option<RatioDistribution>,
    pub sample: Vec<SampleRow>,
}

/// Why a PEG ratio has no numeric value even though the pair was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    NegativeGrowth,
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndefinedReason::NegativeGrowth => write!(f, "Undefined (negative growth)"),
        }
    }
}

/// Growth-adjusted P/E: a number, or an explicit undefined marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AdjustedRatio {
    Value(f64),
    Undefined(UndefinedReason),
}

impl AdjustedRatio {
    pub fn value(&self) -> Option<f64> {
        match self {
            AdjustedRatio::Value(v) => Some(*v),
            AdjustedRatio::Undefined(_) => None,
        }
    }

    /// True only for a numeric PEG strictly below `threshold`.
    pub fn is_below(&self, threshold: f64) -> bool {
        self.value().is_some_and(|v| v < threshold)
    }
}

impl fmt::Display for AdjustedRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustedRatio::Value(v) => write!(f, "{v:.2}"),
            AdjustedRatio::Undefined(reason) => write!(f, "{reason}"),
        }
    }
}

/// Year-over-year PEG breakdown for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PegResult {
    pub identifier: String,
    pub current_period: String,
    pub previous_period: String,
    pub current_metric: f64,
    pub previous_metric: f64,
    /// EPS growth in percent.
    pub growth_pct: f64,
    pub ratio: f64,
    pub adjusted: AdjustedRatio,
}

/// Diagnostic returned when a PEG cannot be computed.
///
/// This is data, not a failure of the run: batch callers report it and move on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PegUnavailable {
    NotFound { identifier: String, period: String },
    PriceMissing { identifier: String },
    MetricUnavailable { identifier: String },
    InvalidPeriod { period: String },
    PriorMetricNonPositive { identifier: String, previous: Option<f64> },
}

impl fmt::Display for PegUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PegUnavailable::NotFound { identifier, period } => {
                write!(f, "No data found for {identifier} in {period}")
            }
            PegUnavailable::PriceMissing { identifier } => {
                write!(f, "Cannot calculate P/E for {identifier} - price is missing")
            }
            PegUnavailable::MetricUnavailable { identifier } => {
                write!(f, "Cannot calculate P/E for {identifier} - TTM EPS is zero or missing")
            }
            PegUnavailable::InvalidPeriod { period } => {
                write!(f, "Cannot derive the prior-year period from '{period}'")
            }
            PegUnavailable::PriorMetricNonPositive { identifier, previous } => match previous {
                Some(v) => write!(f, "Cannot calculate growth for {identifier} - previous TTM EPS is {v}"),
                None => write!(f, "Cannot calculate growth for {identifier} - previous TTM EPS is missing"),
            },
        }
    }
}

/// Outcome of a single PEG query.
pub type PegOutcome = Result<PegResult, PegUnavailable>;

/// PEG outcomes for every screened stock plus the favorable subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PegBatch {
    pub threshold: f64,
    /// One entry per screened stock, in screen order.
    pub results: Vec<(String, PegOutcome)>,
    pub favorable: Vec<String>,
}
