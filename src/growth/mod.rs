//! Year-over-year EPS growth and PEG ratios.
//!
//! A PEG query pairs a ticker's record for one period with the same sub-period a
//! year earlier. Every way the pair can fail to produce a number is returned as a
//! `PegUnavailable` value rather than an error.

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{AdjustedRatio, PegBatch, PegOutcome, PegResult, PegUnavailable, Period, Record, Screening, UndefinedReason};

pub mod index;

pub use index::RecordIndex;

/// First record for `(identifier, period)` in scan order.
pub fn find_record<'a>(records: &'a [Record], identifier: &str, period: &str) -> Option<&'a Record> {
    records
        .iter()
        .find(|r| r.identifier == identifier && r.period == period)
}

/// The same sub-period one year before `period`, e.g. `2016Q1` -> `2015Q1`.
pub fn previous_period(period: &str) -> Option<String> {
    Period::parse(period)
        .ok()?
        .previous_year()
        .map(|p| p.to_string())
}

/// Compute the PEG ratio of `identifier` in `current_period` with a linear scan.
pub fn peg(records: &[Record], identifier: &str, current_period: &str) -> PegOutcome {
    peg_with(identifier, current_period, |id, period| find_record(records, id, period))
}

/// Same as [`peg`], resolving records through a prebuilt index.
pub fn peg_indexed(index: &RecordIndex<'_>, identifier: &str, current_period: &str) -> PegOutcome {
    peg_with(identifier, current_period, |id, period| index.get(id, period))
}

fn peg_with<'a, F>(identifier: &str, current_period: &str, lookup: F) -> PegOutcome
where
    F: Fn(&str, &str) -> Option<&'a Record>,
{
    let current = lookup(identifier, current_period).ok_or_else(|| PegUnavailable::NotFound {
        identifier: identifier.to_string(),
        period: current_period.to_string(),
    })?;

    let current_metric = match current.trailing_metric {
        Some(m) if m != 0.0 => m,
        _ => {
            return Err(PegUnavailable::MetricUnavailable {
                identifier: identifier.to_string(),
            });
        }
    };
    let price = current.price.ok_or_else(|| PegUnavailable::PriceMissing {
        identifier: identifier.to_string(),
    })?;
    let ratio = price / current_metric;

    let previous_period = previous_period(current_period).ok_or_else(|| PegUnavailable::InvalidPeriod {
        period: current_period.to_string(),
    })?;

    let previous = lookup(identifier, &previous_period).ok_or_else(|| PegUnavailable::NotFound {
        identifier: identifier.to_string(),
        period: previous_period.clone(),
    })?;

    let previous_metric = match previous.trailing_metric {
        Some(m) if m > 0.0 => m,
        other => {
            return Err(PegUnavailable::PriorMetricNonPositive {
                identifier: identifier.to_string(),
                previous: other,
            });
        }
    };

    let growth_pct = (current_metric - previous_metric) / previous_metric * 100.0;
    let adjusted = if growth_pct <= 0.0 {
        AdjustedRatio::Undefined(UndefinedReason::NegativeGrowth)
    } else {
        AdjustedRatio::Value(ratio / growth_pct)
    };

    Ok(PegResult {
        identifier: identifier.to_string(),
        current_period: current_period.to_string(),
        previous_period,
        current_metric,
        previous_metric,
        growth_pct,
        ratio,
        adjusted,
    })
}

/// Run [`peg`] for every screened stock and collect those with PEG below `threshold`.
///
/// Queries are independent reads over `records`, so they run on the rayon pool;
/// results come back in screen order.
pub fn evaluate_screen(records: &[Record], screening: &Screening, threshold: f64) -> PegBatch {
    let results: Vec<(String, PegOutcome)> = screening
        .stocks
        .par_iter()
        .map(|s| (s.identifier.clone(), peg(records, &s.identifier, &screening.period)))
        .collect();

    collect_batch(results, threshold)
}

/// Indexed variant of [`evaluate_screen`] for large datasets.
pub fn evaluate_screen_indexed(index: &RecordIndex<'_>, screening: &Screening, threshold: f64) -> PegBatch {
    let results: Vec<(String, PegOutcome)> = screening
        .stocks
        .par_iter()
        .map(|s| (s.identifier.clone(), peg_indexed(index, &s.identifier, &screening.period)))
        .collect();

    collect_batch(results, threshold)
}

fn collect_batch(results: Vec<(String, PegOutcome)>, threshold: f64) -> PegBatch {
    let favorable: Vec<String> = results
        .iter()
        .filter(|(_, outcome)| {
            outcome
                .as_ref()
                .is_ok_and(|r| r.adjusted.is_below(threshold))
        })
        .map(|(id, _)| id.clone())
        .collect();

    debug!(evaluated = results.len(), favorable = favorable.len(), threshold, "PEG batch complete");

    PegBatch {
        threshold,
        results,
        favorable,
    }
}
