//! ASCII bar chart of the P/E distribution buckets.
//!
//! Fixed-width and deterministic so the output can be asserted on in tests.

use crate::domain::RatioDistribution;
use crate::report::format::distribution_buckets;

/// Render one bar per bucket, scaled so the largest bucket spans `width` columns.
pub fn render_distribution_bars(d: &RatioDistribution, width: usize) -> String {
    let width = width.max(10);
    let buckets = distribution_buckets(d);
    let max = buckets.iter().map(|(_, n)| *n).max().unwrap_or(0);

    let mut out = String::from("P/E buckets:\n");
    for (label, count) in buckets {
        let len = if max == 0 {
            0
        } else {
            // Non-empty buckets always get at least one mark.
            ((count * width + max - 1) / max).min(width)
        };
        let bar = "#".repeat(len);
        let line = format!("  {label:>6} |{bar} {count}");
        out.push_str(&line);
        out.push('\n');
    }
    out
}
