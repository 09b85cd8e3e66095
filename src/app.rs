//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initializes logging
//! - runs the screen pipeline
//! - prints reports
//! - writes optional exports

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::{Command, InputArgs, PegArgs, RunArgs};
use crate::domain::{ColumnMap, Period, RatioBand, ScreenConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `pe` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is normal; the file only supplies defaults.
    dotenvy::dotenv().ok();

    // `pe` and `pe -i data.csv` behave like `pe run ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Peg(args) => handle_peg(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so the report on stdout stays clean.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = screen_config_from_args(&args)?;
    let run = pipeline::run_analysis(&config)?;
    let analysis = &run.analysis;

    println!(
        "{}",
        crate::report::format_load_summary(&run.loaded, &config.input.display().to_string())
    );

    println!("{}", "=".repeat(50));
    println!("ANALYZING QUARTER: {}", config.period);
    println!("{}", "=".repeat(50));
    println!("{}", crate::report::format_screen_breakdown(&analysis.screening));

    if config.bars {
        if let Some(d) = &analysis.screening.distribution {
            println!("{}", crate::report::render_distribution_bars(d, 40));
        }
    }

    println!("{}", crate::report::format_screen_table(&analysis.screening));
    if !analysis.screening.stocks.is_empty() {
        println!("{}", crate::report::format_peg_batch(&analysis.pegs));
    }

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::export::write_screen_csv(path, analysis)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_analysis_json(path, analysis, &config)?;
    }

    Ok(())
}

fn handle_peg(args: PegArgs) -> Result<(), AppError> {
    let columns = column_map_from_args(&args.input);
    let loaded = crate::io::ingest::load_records(&args.input.input, &columns)?;
    let (ticker, period) = peg_query_from_args(&args);
    warn_on_unparseable_period(period);

    let outcome = crate::growth::peg(&loaded.records, ticker, period);
    print!("{}", crate::report::format_peg_result(&outcome));
    Ok(())
}

/// Resolve and validate run options into a `ScreenConfig`.
pub fn screen_config_from_args(args: &RunArgs) -> Result<ScreenConfig, AppError> {
    let band = RatioBand {
        lower: args.ratio_min,
        upper: args.ratio_max,
    };
    if !(band.lower.is_finite() && band.upper.is_finite()) || band.lower >= band.upper {
        return Err(AppError::config(format!(
            "Invalid P/E band: --ratio-min ({}) must be below --ratio-max ({}).",
            band.lower, band.upper
        )));
    }
    if !args.peg_threshold.is_finite() {
        return Err(AppError::config("--peg-threshold must be a finite number."));
    }
    let period = args.input.period.trim();
    warn_on_unparseable_period(period);

    Ok(ScreenConfig {
        input: args.input.input.clone(),
        period: period.to_string(),
        peg_threshold: args.peg_threshold,
        band,
        columns: column_map_from_args(&args.input),
        bars: !args.no_bars,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    })
}

/// Ticker and period for `pe peg`, trimmed the same way the loader trims cells.
fn peg_query_from_args(args: &PegArgs) -> (&str, &str) {
    (args.ticker.trim(), args.input.period.trim())
}

fn column_map_from_args(args: &InputArgs) -> ColumnMap {
    ColumnMap {
        identifier: args.id_column.clone(),
        period: args.period_column.clone(),
        price: args.price_column.clone(),
        trailing_metric: args.metric_column.clone(),
    }
}

fn warn_on_unparseable_period(period: &str) {
    if let Err(e) = Period::parse(period) {
        warn!("{e}; prior-year matching will report every ticker as unavailable");
    }
}

/// Rewrite argv so `pe` defaults to `pe run`.
///
/// Rules:
/// - `pe`                      -> `pe run`
/// - `pe -i data.csv ...`      -> `pe run -i data.csv ...`
/// - `pe --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "peg");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    argv
}
