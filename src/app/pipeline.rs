//! Shared "screen pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV load -> P/E screen -> PEG per screened stock -> favorable list
//!
//! Front-ends (the CLI, tests) then focus on presentation.

use tracing::{debug, info};

use crate::domain::{PegBatch, Record, ScreenConfig, Screening};
use crate::error::AppError;
use crate::growth::{RecordIndex, evaluate_screen, evaluate_screen_indexed};
use crate::io::ingest::{LoadedData, load_records};
use crate::screen::screen;

/// Datasets at least this large get a `(ticker, period)` index for the PEG batch.
pub const INDEX_MIN_RECORDS: usize = 5_000;

/// Screen + PEG outputs for one period.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub screening: Screening,
    pub pegs: PegBatch,
    pub rows_loaded: usize,
    pub rows_skipped: usize,
}

impl AnalysisOutput {
    pub fn favorable(&self) -> &[String] {
        &self.pegs.favorable
    }
}

/// All computed outputs of a single `pe run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub loaded: LoadedData,
    pub analysis: AnalysisOutput,
}

/// Load the input file and run the full analysis.
pub fn run_analysis(config: &ScreenConfig) -> Result<RunOutput, AppError> {
    let loaded = load_records(&config.input, &config.columns)?;
    let analysis = analyze_loaded(&loaded, config);
    Ok(RunOutput { loaded, analysis })
}

/// Run the screen and PEG batch over already-loaded data.
pub fn analyze_loaded(loaded: &LoadedData, config: &ScreenConfig) -> AnalysisOutput {
    let mut analysis = analyze_period(&loaded.records, &config.period, config);
    analysis.rows_loaded = loaded.records.len();
    analysis.rows_skipped = loaded.skipped();
    analysis
}

/// Screen one period and compute PEG for every stock that passes.
pub fn analyze_period(records: &[Record], period: &str, config: &ScreenConfig) -> AnalysisOutput {
    let screening = screen(records, period, &config.band);
    let pegs = if records.len() >= INDEX_MIN_RECORDS {
        let index = RecordIndex::build(records);
        debug!(records = records.len(), tickers = index.len(), "built record index");
        evaluate_screen_indexed(&index, &screening, config.peg_threshold)
    } else {
        evaluate_screen(records, &screening, config.peg_threshold)
    };

    info!(
        period,
        screened = screening.stocks.len(),
        favorable = pegs.favorable.len(),
        "analysis complete"
    );

    AnalysisOutput {
        screening,
        pegs,
        rows_loaded: records.len(),
        rows_skipped: 0,
    }
}
