//! Export screen results to CSV and JSON.
//!
//! The CSV is meant to be easy to consume in spreadsheets; the JSON document carries
//! the full breakdown (counts, distribution, PEG diagnostics) for downstream scripts.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::pipeline::AnalysisOutput;
use crate::domain::{
    PegOutcome, RatioBand, RatioDistribution, ScreenBreakdown, ScreenConfig, ScreenedStock,
};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ScreenCsvRow<'a> {
    ticker: &'a str,
    period: &'a str,
    pe_ratio: f64,
    price: f64,
    eps_ttm: f64,
    previous_period: Option<&'a str>,
    eps_growth_pct: Option<f64>,
    peg_ratio: Option<f64>,
    peg_note: String,
    favorable: bool,
}

/// Write one row per screened stock, joined with its PEG outcome.
pub fn write_screen_csv(path: &Path, output: &AnalysisOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::export(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    for (stock, (_, outcome)) in output.screening.stocks.iter().zip(&output.pegs.results) {
        let (previous_period, eps_growth_pct, peg_ratio, peg_note) = match outcome {
            Ok(r) => (
                Some(r.previous_period.as_str()),
                Some(r.growth_pct),
                r.adjusted.value(),
                r.adjusted.value().map(|_| String::new()).unwrap_or_else(|| r.adjusted.to_string()),
            ),
            Err(d) => (None, None, None, d.to_string()),
        };

        writer
            .serialize(ScreenCsvRow {
                ticker: &stock.identifier,
                period: &output.screening.period,
                pe_ratio: stock.ratio,
                price: stock.price,
                eps_ttm: stock.trailing_metric,
                previous_period,
                eps_growth_pct,
                peg_ratio,
                peg_note,
                favorable: output.pegs.favorable.contains(&stock.identifier),
            })
            .map_err(|e| AppError::export(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::export(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct PegEntry<'a> {
    ticker: &'a str,
    outcome: &'a PegOutcome,
}

/// Portable JSON representation of one run.
#[derive(Debug, Serialize)]
struct AnalysisFile<'a> {
    tool: &'static str,
    generated_at: DateTime<Utc>,
    input: String,
    period: &'a str,
    band: RatioBand,
    peg_threshold: f64,
    rows_loaded: usize,
    rows_skipped: usize,
    breakdown: ScreenBreakdown,
    distribution: Option<RatioDistribution>,
    stocks: &'a [ScreenedStock],
    peg: Vec<PegEntry<'a>>,
    favorable: &'a [String],
}

/// Write the full analysis as pretty-printed JSON.
pub fn write_analysis_json(path: &Path, output: &AnalysisOutput, config: &ScreenConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::export(format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let doc = AnalysisFile {
        tool: "pe",
        generated_at: Utc::now(),
        input: config.input.display().to_string(),
        period: &output.screening.period,
        band: config.band,
        peg_threshold: output.pegs.threshold,
        rows_loaded: output.rows_loaded,
        rows_skipped: output.rows_skipped,
        breakdown: output.screening.breakdown,
        distribution: output.screening.distribution,
        stocks: &output.screening.stocks,
        peg: output
            .pegs
            .results
            .iter()
            .map(|(ticker, outcome)| PegEntry { ticker, outcome })
            .collect(),
        favorable: &output.pegs.favorable,
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::export(format!("Failed to write export JSON: {e}")))?;
    Ok(())
}
