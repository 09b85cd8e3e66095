//! Command-line parsing for the P/E + PEG screener.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the screening code. Input and period options can also come from
//! the environment (`PE_INPUT`, `PE_PERIOD`), including a `.env` file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pe", version, about = "Quarterly P/E and PEG stock screener")]
pub struct Cli {
    /// Log pipeline stages to stderr (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Screen a period for 0 < P/E < 20, compute PEG for each hit, print the report.
    Run(RunArgs),
    /// Compute the PEG breakdown for a single ticker.
    Peg(PegArgs),
}

/// Where to read data from and which columns hold the screened fields.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Fundamentals CSV (header row required).
    #[arg(short, long, env = "PE_INPUT", default_value = "healthcare.csv")]
    pub input: PathBuf,

    /// Period key to analyze, e.g. 2016Q1.
    #[arg(short, long, env = "PE_PERIOD", default_value = "2016Q1")]
    pub period: String,

    /// Column holding the ticker.
    #[arg(long, default_value = "tic")]
    pub id_column: String,

    /// Column holding the fiscal period key.
    #[arg(long, default_value = "datafqtr")]
    pub period_column: String,

    /// Column holding the quarter-end price.
    #[arg(long, default_value = "prccq")]
    pub price_column: String,

    /// Column holding trailing twelve-month EPS.
    #[arg(long, default_value = "epsf12")]
    pub metric_column: String,
}

/// Options for the full screen.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// PEG strictly below this value counts as favorable.
    #[arg(long, default_value_t = 1.0)]
    pub peg_threshold: f64,

    /// Exclusive lower P/E bound.
    #[arg(long, default_value_t = 0.0)]
    pub ratio_min: f64,

    /// Exclusive upper P/E bound.
    #[arg(long, default_value_t = 20.0)]
    pub ratio_max: f64,

    /// Do not draw the P/E bucket chart.
    #[arg(long)]
    pub no_bars: bool,

    /// Export screened stocks (with PEG) to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the full analysis to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for a single-ticker PEG query.
#[derive(Debug, Args, Clone)]
pub struct PegArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Ticker to analyze.
    #[arg(short, long)]
    pub ticker: String,
}
