//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the screening/PEG code stays pure and testable
//! - output changes are localized

use std::fmt::Write as _;

use crate::domain::{PegBatch, PegOutcome, RatioDistribution, Record, ScreenedStock, Screening};
use crate::io::ingest::LoadedData;

/// Records shown in the load preview.
const LOAD_PREVIEW: usize = 3;
/// Sample rows shown in the screen breakdown.
const SCREEN_PREVIEW: usize = 5;
const RULE: &str = "------------------------------------------------------------";

/// Loaded/skipped counts plus a preview of the first records.
pub fn format_load_summary(loaded: &LoadedData, source: &str) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Loaded {} records from {source}", loaded.records.len());
    if loaded.skipped() > 0 {
        let _ = writeln!(out, "Skipped {} rows due to data issues", loaded.skipped());
    }

    let _ = writeln!(out, "\nSample of first {LOAD_PREVIEW} records:");
    for (i, r) in loaded.records.iter().take(LOAD_PREVIEW).enumerate() {
        let _ = writeln!(out, "Row {}: {}", i + 1, describe_record(r));
    }

    out
}

fn describe_record(r: &Record) -> String {
    format!(
        "ticker={}, quarter={}, price={}, eps_ttm={}",
        r.identifier,
        r.period,
        fmt_opt(r.price),
        fmt_opt(r.trailing_metric)
    )
}

/// Per-period rejection counts, a short sample of raw inputs, and the ratio distribution.
pub fn format_screen_breakdown(screening: &Screening) -> String {
    let mut out = String::new();
    let b = &screening.breakdown;
    let band = &screening.band;
    let period = &screening.period;

    let _ = writeln!(out, "Analyzing data for {period} using TTM EPS...");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Total stocks in {period}: {}", b.total_in_period);
    let _ = writeln!(out, "Missing price data: {}", b.missing_price);
    let _ = writeln!(out, "Missing TTM EPS data: {}", b.missing_metric);
    let _ = writeln!(out, "Zero TTM EPS (can't calculate P/E): {}", b.zero_metric);
    let _ = writeln!(out, "P/E <= {} (below band): {}", fmt_bound(band.lower), b.negative_ratio);
    let _ = writeln!(out, "P/E >= {} (too high): {}", fmt_bound(band.upper), b.high_ratio);
    let _ = writeln!(
        out,
        "Valid stocks with {} < P/E < {}: {}",
        fmt_bound(band.lower),
        fmt_bound(band.upper),
        b.accepted
    );

    if !screening.sample.is_empty() {
        let _ = writeln!(out, "\nSample of data in {period} (using TTM EPS):");
        for s in screening.sample.iter().take(SCREEN_PREVIEW) {
            let pe = s.ratio().map(|v| format!("{v:.2}")).unwrap_or_else(|| "N/A".to_string());
            let _ = writeln!(
                out,
                "  {}: Price={}, TTM_EPS={}, P/E={pe}",
                s.identifier,
                fmt_opt(s.price),
                fmt_opt(s.trailing_metric)
            );
        }
    }

    if let Some(d) = &screening.distribution {
        out.push('\n');
        out.push_str(&format_distribution(d));
    }

    out
}

fn format_distribution(d: &RatioDistribution) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "P/E ratio distribution (positive ratios only):");
    let _ = writeln!(out, "  Lowest P/E: {:.2}", d.lowest);
    let _ = writeln!(out, "  Highest P/E: {:.2}", d.highest);
    for (label, count) in distribution_buckets(d) {
        let _ = writeln!(out, "  Number with P/E {label}: {count}");
    }
    out
}

/// `(label, count)` for each distribution bucket, low to high.
pub fn distribution_buckets(d: &RatioDistribution) -> [(&'static str, usize); 5] {
    [
        ("< 10", d.below_10),
        ("10-20", d.from_10_to_20),
        ("20-30", d.from_20_to_30),
        ("30-50", d.from_30_to_50),
        ("> 50", d.above_50),
    ]
}

/// Table of every stock that passed the screen, lowest P/E first.
pub fn format_screen_table(screening: &Screening) -> String {
    let mut out = String::new();

    if screening.stocks.is_empty() {
        out.push_str("No stocks found meeting P/E criteria\n");
        return out;
    }

    let _ = writeln!(out, "All stocks with P/E < {}:", fmt_bound(screening.band.upper));
    push_line(&mut out, format!("{:<8} {:<10} {:<10} {:<10}", "Ticker", "P/E Ratio", "Price", "TTM_EPS"));
    push_line(&mut out, "-".repeat(42));
    for s in &screening.stocks {
        push_line(&mut out, format_stock_row(s));
    }

    out
}

fn format_stock_row(s: &ScreenedStock) -> String {
    format!(
        "{:<8} {:<10.2} {:<10.2} {:<10.2}",
        truncate(&s.identifier, 8),
        s.ratio,
        s.price,
        s.trailing_metric
    )
}

/// PEG table for the screened stocks followed by the favorable list.
pub fn format_peg_batch(batch: &PegBatch) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Calculating PEG ratios for stocks...");
    let _ = writeln!(out, "{RULE}");

    push_line(
        &mut out,
        format!("{:<8} {:>8} {:>10} {:>10}  {}", "Ticker", "P/E", "Growth%", "PEG", "Note"),
    );
    push_line(&mut out, format!("{:-<8} {:-<8} {:-<10} {:-<10}  {:-<4}", "", "", "", "", ""));

    for (ticker, outcome) in &batch.results {
        let line = match outcome {
            Ok(r) => {
                let (peg, note) = match r.adjusted.value() {
                    Some(v) => (format!("{v:.2}"), String::new()),
                    None => ("-".to_string(), r.adjusted.to_string()),
                };
                format!(
                    "{:<8} {:>8.2} {:>10.1} {:>10}  {note}",
                    truncate(ticker, 8),
                    r.ratio,
                    r.growth_pct,
                    peg
                )
            }
            Err(d) => format!("{:<8} {:>8} {:>10} {:>10}  Error: {d}", truncate(ticker, 8), "-", "-", "-"),
        };
        push_line(&mut out, line);
    }

    let _ = writeln!(out, "\n{}", format_favorable(batch));
    out
}

/// `Stocks with good PEG ratios (PEG < 1): A, B`
pub fn format_favorable(batch: &PegBatch) -> String {
    format!(
        "Stocks with good PEG ratios (PEG < {}): {}",
        fmt_bound(batch.threshold),
        batch.favorable.join(", ")
    )
}

/// Detail view for a single PEG query.
pub fn format_peg_result(outcome: &PegOutcome) -> String {
    let r = match outcome {
        Ok(r) => r,
        Err(d) => return format!("Error: {d}\n"),
    };

    let mut out = String::new();
    let _ = writeln!(out, "PEG analysis for {}", r.identifier);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Current quarter:   {}", r.current_period);
    let _ = writeln!(out, "Previous quarter:  {}", r.previous_period);
    let _ = writeln!(out, "Current TTM EPS:   {:.2}", r.current_metric);
    let _ = writeln!(out, "Previous TTM EPS:  {:.2}", r.previous_metric);
    let _ = writeln!(out, "EPS growth:        {:.1}%", r.growth_pct);
    let _ = writeln!(out, "P/E ratio:         {:.2}", r.ratio);
    let _ = writeln!(out, "PEG ratio:         {}", r.adjusted);
    out
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "N/A".to_string())
}

/// Thresholds print without trailing zeros (`20`, `0`, `1.5`).
fn fmt_bound(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        v.to_string()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AdjustedRatio, PegResult, PegUnavailable, RatioBand, UndefinedReason};
    use crate::screen::screen;

    fn rec(id: &str, period: &str, price: Option<f64>, eps: Option<f64>) -> Record {
        Record {
            identifier: id.to_string(),
            period: period.to_string(),
            price,
            trailing_metric: eps,
            attributes: Vec::new(),
        }
    }

    fn peg_result(id: &str, adjusted: AdjustedRatio) -> PegResult {
        PegResult {
            identifier: id.to_string(),
            current_period: "2016Q1".to_string(),
            previous_period: "2015Q1".to_string(),
            current_metric: 2.0,
            previous_metric: 1.0,
            growth_pct: 100.0,
            ratio: 5.0,
            adjusted,
        }
    }

    #[test]
    fn load_summary_reports_skips_and_preview() {
        let loaded = LoadedData {
            records: vec![rec("ABC", "2016Q1", Some(10.0), None)],
            row_errors: vec![crate::io::ingest::RowError {
                line: 3,
                id: None,
                message: "bad".to_string(),
            }],
            rows_read: 2,
        };
        let text = format_load_summary(&loaded, "fundamentals.csv");
        assert!(text.contains("Loaded 1 records from fundamentals.csv"));
        assert!(text.contains("Skipped 1 rows due to data issues"));
        assert!(text.contains("Row 1: ticker=ABC, quarter=2016Q1, price=10, eps_ttm=N/A"));
    }

    #[test]
    fn breakdown_lists_every_counter() {
        let data = vec![
            rec("A", "2016Q1", Some(10.0), Some(2.0)),
            rec("B", "2016Q1", Some(10.0), Some(0.0)),
        ];
        let text = format_screen_breakdown(&screen(&data, "2016Q1", &RatioBand::default()));
        assert!(text.contains("Total stocks in 2016Q1: 2"));
        assert!(text.contains("Zero TTM EPS (can't calculate P/E): 1"));
        assert!(text.contains("Valid stocks with 0 < P/E < 20: 1"));
        assert!(text.contains("  B: Price=10, TTM_EPS=0, P/E=N/A"));
        assert!(text.contains("Lowest P/E: 5.00"));
    }

    #[test]
    fn below_band_label_follows_the_lower_bound() {
        let data = vec![
            rec("A", "2016Q1", Some(10.0), Some(2.0)),
            rec("B", "2016Q1", Some(10.0), Some(-1.0)),
        ];
        let band = RatioBand { lower: 8.0, upper: 20.0 };
        let text = format_screen_breakdown(&screen(&data, "2016Q1", &band));
        assert!(text.contains("P/E <= 8 (below band): 2"));
        assert!(!text.contains("negative earnings"));
    }

    #[test]
    fn screen_table_rows_are_trimmed() {
        let data = vec![rec("ABC", "2016Q1", Some(10.0), Some(2.0))];
        let text = format_screen_table(&screen(&data, "2016Q1", &RatioBand::default()));
        assert!(text.starts_with("All stocks with P/E < 20:\n"));
        assert!(text.contains("ABC      5.00       10.00      2.00\n"));
        assert!(text.lines().all(|l| l == l.trim_end()));
    }

    #[test]
    fn empty_screen_table() {
        let text = format_screen_table(&screen(&[], "2016Q1", &RatioBand::default()));
        assert_eq!(text, "No stocks found meeting P/E criteria\n");
    }

    #[test]
    fn favorable_line_joins_tickers() {
        let batch = PegBatch {
            threshold: 1.0,
            results: vec![
                ("ABC".to_string(), Ok(peg_result("ABC", AdjustedRatio::Value(0.05)))),
                (
                    "DEF".to_string(),
                    Ok(peg_result("DEF", AdjustedRatio::Undefined(UndefinedReason::NegativeGrowth))),
                ),
                (
                    "ZZZ".to_string(),
                    Err(PegUnavailable::NotFound {
                        identifier: "ZZZ".to_string(),
                        period: "2015Q1".to_string(),
                    }),
                ),
            ],
            favorable: vec!["ABC".to_string()],
        };
        let text = format_peg_batch(&batch);
        assert!(text.contains("Stocks with good PEG ratios (PEG < 1): ABC"));
        assert!(text.contains("Undefined (negative growth)"));
        assert!(text.contains("Error: No data found for ZZZ in 2015Q1"));
    }

    #[test]
    fn single_peg_detail() {
        let text = format_peg_result(&Ok(peg_result("ABC", AdjustedRatio::Value(0.05))));
        assert!(text.contains("Previous quarter:  2015Q1"));
        assert!(text.contains("PEG ratio:         0.05"));

        let err: PegOutcome = Err(PegUnavailable::MetricUnavailable {
            identifier: "ABC".to_string(),
        });
        assert_eq!(
            format_peg_result(&err),
            "Error: Cannot calculate P/E for ABC - TTM EPS is zero or missing\n"
        );
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("ABCDEFGHIJ", 8), "ABCDEFG.");
        assert_eq!(truncate("ABC", 8), "ABC");
    }
}
