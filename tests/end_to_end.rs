use std::io::Write;
use std::path::PathBuf;

use approx::assert_relative_eq;
use pe_screen::app::pipeline::run_analysis;
use pe_screen::domain::{AdjustedRatio, ColumnMap, PegUnavailable, ScreenConfig, UndefinedReason};
use pe_screen::error::AppError;
use pe_screen::growth::peg;
use pe_screen::io::{load_records, write_analysis_json, write_screen_csv};
use tempfile::NamedTempFile;

const HEADER: &str = "gvkey,datadate,tic,datafqtr,prccq,epsf12\n";

fn csv_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(HEADER.as_bytes()).unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

fn config_for(path: PathBuf) -> ScreenConfig {
    ScreenConfig {
        input: path,
        ..ScreenConfig::default()
    }
}

#[test]
fn favorable_when_earnings_doubled() {
    let file = csv_file(&[
        "1,20160331,ABC,2016Q1,10.0,2.0",
        "1,20150331,ABC,2015Q1,8.0,1.0",
    ]);
    let run = run_analysis(&config_for(file.path().to_path_buf())).unwrap();

    let stocks = &run.analysis.screening.stocks;
    assert_eq!(stocks.len(), 1);
    assert_relative_eq!(stocks[0].ratio, 5.0);

    let (ticker, outcome) = &run.analysis.pegs.results[0];
    assert_eq!(ticker, "ABC");
    let result = outcome.as_ref().unwrap();
    assert_relative_eq!(result.growth_pct, 100.0);
    assert_relative_eq!(result.adjusted.value().unwrap(), 0.05);
    assert_eq!(run.analysis.favorable(), ["ABC"]);
}

#[test]
fn shrinking_earnings_are_undefined_and_not_favorable() {
    let file = csv_file(&[
        "1,20160331,ABC,2016Q1,10.0,2.0",
        "1,20150331,ABC,2015Q1,8.0,3.0",
    ]);
    let run = run_analysis(&config_for(file.path().to_path_buf())).unwrap();

    let result = run.analysis.pegs.results[0].1.as_ref().unwrap();
    assert_relative_eq!(result.growth_pct, -33.333_333_333, epsilon = 1e-6);
    assert_eq!(result.adjusted, AdjustedRatio::Undefined(UndefinedReason::NegativeGrowth));
    assert!(run.analysis.favorable().is_empty());
}

#[test]
fn zero_eps_is_counted_and_excluded() {
    let file = csv_file(&[
        "1,20160331,ABC,2016Q1,10.0,0",
        "2,20160331,DEF,2016Q1,10.0,1.0",
    ]);
    let run = run_analysis(&config_for(file.path().to_path_buf())).unwrap();

    let screening = &run.analysis.screening;
    assert_eq!(screening.breakdown.zero_metric, 1);
    assert!(screening.stocks.iter().all(|s| s.identifier != "ABC"));
}

#[test]
fn bad_price_row_is_dropped_and_counted() {
    let file = csv_file(&[
        "1,20160331,ABC,2016Q1,n/a,2.0",
        "2,20160331,DEF,2016Q1,10.0,1.0",
    ]);
    let loaded = load_records(file.path(), &ColumnMap::default()).unwrap();

    assert_eq!(loaded.skipped(), 1);
    assert!(
        !loaded
            .records
            .iter()
            .any(|r| r.identifier == "ABC" && r.period == "2016Q1")
    );
    assert!(loaded.records.iter().all(|r| r.price.is_none_or(f64::is_finite)));
}

/// A blank price does not drop the row at load time: it loads as `None`, the skip
/// count stays at zero, and the screen rejects it under "missing price". Only
/// unparseable or physically missing cells drop a row.
#[test]
fn blank_price_is_absent_and_rejected_by_screen() {
    let file = csv_file(&["1,20160331,ABC,2016Q1,,2.0"]);
    let run = run_analysis(&config_for(file.path().to_path_buf())).unwrap();

    assert_eq!(run.loaded.skipped(), 0);
    assert_eq!(run.loaded.records[0].price, None);
    assert_eq!(run.analysis.screening.breakdown.missing_price, 1);
    assert!(run.analysis.screening.stocks.is_empty());
}

#[test]
fn unknown_ticker_is_a_diagnostic() {
    let file = csv_file(&["1,20160331,ABC,2016Q1,10.0,2.0"]);
    let loaded = load_records(file.path(), &ColumnMap::default()).unwrap();

    assert_eq!(
        peg(&loaded.records, "ZZZ", "2016Q1"),
        Err(PegUnavailable::NotFound {
            identifier: "ZZZ".to_string(),
            period: "2016Q1".to_string(),
        })
    );
}

#[test]
fn missing_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_analysis(&config_for(dir.path().join("nope.csv"))).unwrap_err();
    assert_eq!(err.exit_code(), AppError::INPUT);
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn exports_round_out_the_run() {
    let file = csv_file(&[
        "1,20160331,ABC,2016Q1,10.0,2.0",
        "1,20150331,ABC,2015Q1,8.0,1.0",
        "2,20160331,DEF,2016Q1,12.0,1.0",
    ]);
    let config = config_for(file.path().to_path_buf());
    let run = run_analysis(&config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("screen.csv");
    let json_path = dir.path().join("screen.json");
    write_screen_csv(&csv_path, &run.analysis).unwrap();
    write_analysis_json(&json_path, &run.analysis, &config).unwrap();

    let csv_text = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv_text.lines();
    assert!(lines.next().unwrap().starts_with("ticker,period,pe_ratio"));
    assert!(lines.next().unwrap().starts_with("ABC,2016Q1,5.0"));
    let def = lines.next().unwrap();
    assert!(def.starts_with("DEF,2016Q1,12.0"));
    assert!(def.ends_with(",false"));

    let doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(doc["tool"], "pe");
    assert_eq!(doc["breakdown"]["accepted"], 2);
    assert_eq!(doc["favorable"][0], "ABC");
    assert_eq!(doc["peg"][1]["outcome"]["Err"]["reason"], "not_found");
}
