//! End-to-end pipeline test: CSV price file -> provider -> scanner ->
//! signal engine -> signal-table export and re-parse.

use chrono::NaiveDate;
use pairscan::provider::{CsvProvider, PriceProvider};
use pairscan::scanner::scan;
use pairscan::signal::{compute_signal, read_signal_table, write_signal_table, SignalParams};
use std::io::Cursor;
use std::io::Write as _;
use std::path::PathBuf;

/// Deterministic uniform noise in [-0.5, 0.5) from a seeded LCG
fn noise_source(seed: u64) -> impl FnMut() -> f64 {
    let mut state = seed;
    move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64 - 0.5
    }
}

fn random_walk(n: usize, seed: u64) -> Vec<f64> {
    let mut step = noise_source(seed);
    let mut series = vec![100.0];
    for i in 1..n {
        let next = series[i - 1] + step();
        series.push(next);
    }
    series
}

/// Price file with one tightly cointegrated pair (AAA/BBB) and one
/// independent walk (CCC).
fn write_price_fixture(n: usize) -> PathBuf {
    let start: NaiveDate = "2022-01-01".parse().unwrap();
    let aaa = random_walk(n, 7919);
    let mut step = noise_source(1237);
    let bbb: Vec<f64> = aaa.iter().map(|&x| 2.0 * x + step() * 0.2).collect();
    let ccc = random_walk(n, 104729);

    let mut content = String::from("Date,AAA,BBB,CCC\n");
    for i in 0..n {
        let date = start + chrono::Duration::days(i as i64);
        content.push_str(&format!(
            "{},{:.6},{:.6},{:.6}\n",
            date, aaa[i], bbb[i], ccc[i]
        ));
    }

    let mut path = std::env::temp_dir();
    path.push(format!("pairscan_pipeline_{}.csv", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn scan_then_signal_then_export() {
    let path = write_price_fixture(300);
    let provider = CsvProvider::new(&path);

    let symbols: Vec<String> = ["AAA", "BBB", "CCC"].iter().map(|s| s.to_string()).collect();
    let prices = provider
        .fetch(
            &symbols,
            "2022-01-01".parse().unwrap(),
            "2023-12-31".parse().unwrap(),
        )
        .unwrap();
    assert_eq!(prices.len(), 300);

    // The constructed pair must rank first and qualify at 5%.
    let ranked = scan(&prices, 0.05, 5).unwrap();
    assert!(!ranked.is_empty());
    assert_eq!(ranked[0].symbol_a, "AAA");
    assert_eq!(ranked[0].symbol_b, "BBB");
    assert!(ranked[0].p_value < 0.05);
    for w in ranked.windows(2) {
        assert!(w[0].p_value <= w[1].p_value);
    }

    // Backtest the top pair with defaults.
    let params = SignalParams::default();
    let signal = compute_signal(&prices, &ranked[0].symbol_a, &ranked[0].symbol_b, &params)
        .unwrap();
    assert_eq!(signal.dates.len(), 300);
    for i in 0..params.window - 1 {
        assert!(signal.zscore.get(i).is_none(), "warmup cell {i} must be null");
    }

    // Export and re-parse: every (date, z, label) triple survives.
    let mut buffer = Vec::new();
    write_signal_table(&signal, &mut buffer).unwrap();
    let rows = read_signal_table(Cursor::new(buffer)).unwrap();
    assert_eq!(rows.len(), 300);
    for (i, (date, zscore, label)) in rows.iter().enumerate() {
        assert_eq!(*date, signal.dates[i]);
        assert_eq!(label, signal.positions[i].label());
        match (zscore, signal.zscore.get(i)) {
            (Some(parsed), Some(original)) => assert!((parsed - original).abs() < 1e-9),
            (None, None) => {}
            other => panic!("row {i}: null mismatch {other:?}"),
        }
    }

    std::fs::remove_file(path).ok();
}

#[test]
fn scan_empty_result_is_distinguishable_from_failure() {
    let path = write_price_fixture(300);
    let provider = CsvProvider::new(&path);

    let symbols: Vec<String> = ["AAA", "CCC"].iter().map(|s| s.to_string()).collect();
    let prices = provider
        .fetch(
            &symbols,
            "2022-01-01".parse().unwrap(),
            "2023-12-31".parse().unwrap(),
        )
        .unwrap();

    // Independent walks at an extreme threshold: a valid, empty ranking.
    let ranked = scan(&prices, 1e-6, 5).unwrap();
    assert!(ranked.is_empty());

    std::fs::remove_file(path).ok();
}
