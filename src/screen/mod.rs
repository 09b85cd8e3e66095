//! P/E screen: pick the records of one period whose price/EPS ratio falls inside a band.
//!
//! The screen applies its rejection rules in a fixed precedence (missing price,
//! missing EPS, zero EPS, non-positive ratio, ratio above band) and counts each one,
//! so the breakdown always sums to the number of records in the period.

use tracing::debug;

use crate::domain::{RatioBand, RatioDistribution, Record, SampleRow, ScreenBreakdown, ScreenedStock, Screening};

/// In-period records kept for the diagnostic preview.
pub const SAMPLE_SIZE: usize = 10;

/// Screen `records` for `target_period`, returning accepted stocks sorted by ascending P/E.
pub fn screen(records: &[Record], target_period: &str, band: &RatioBand) -> Screening {
    let mut breakdown = ScreenBreakdown::default();
    let mut stocks = Vec::new();
    let mut ratios = Vec::new();
    let mut sample = Vec::new();

    for r in records.iter().filter(|r| r.period == target_period) {
        breakdown.total_in_period += 1;

        if sample.len() < SAMPLE_SIZE {
            sample.push(SampleRow {
                identifier: r.identifier.clone(),
                price: r.price,
                trailing_metric: r.trailing_metric,
            });
        }

        let Some(price) = r.price else {
            breakdown.missing_price += 1;
            continue;
        };
        let Some(metric) = r.trailing_metric else {
            breakdown.missing_metric += 1;
            continue;
        };
        if metric == 0.0 {
            breakdown.zero_metric += 1;
            continue;
        }

        let ratio = price / metric;
        ratios.push(ratio);

        if !band.contains(ratio) {
            if ratio <= band.lower {
                breakdown.negative_ratio += 1;
            } else {
                breakdown.high_ratio += 1;
            }
            continue;
        }

        stocks.push(ScreenedStock {
            identifier: r.identifier.clone(),
            ratio,
            price,
            trailing_metric: metric,
        });
    }

    // `sort_by` is stable, so equal ratios keep file order.
    stocks.sort_by(|a, b| a.ratio.total_cmp(&b.ratio));
    breakdown.accepted = stocks.len();

    debug!(
        period = target_period,
        total = breakdown.total_in_period,
        accepted = breakdown.accepted,
        "screen complete"
    );

    Screening {
        period: target_period.to_string(),
        band: *band,
        stocks,
        breakdown,
        distribution: ratio_distribution(&ratios),
        sample,
    }
}

/// Summarize the positive ratios; `None` when there are none.
pub fn ratio_distribution(ratios: &[f64]) -> Option<RatioDistribution> {
    let positive: Vec<f64> = ratios.iter().copied().filter(|r| *r > 0.0).collect();
    if positive.is_empty() {
        return None;
    }

    let count = |lo: f64, hi: f64| positive.iter().filter(|r| **r >= lo && **r < hi).count();

    Some(RatioDistribution {
        lowest: positive.iter().copied().fold(f64::INFINITY, f64::min),
        highest: positive.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        below_10: positive.iter().filter(|r| **r < 10.0).count(),
        from_10_to_20: count(10.0, 20.0),
        from_20_to_30: count(20.0, 30.0),
        from_30_to_50: count(30.0, 50.0),
        above_50: positive.iter().filter(|r| **r >= 50.0).count(),
    })
}
