use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pairscan::config::ScanConfig;
use pairscan::provider::{CsvProvider, PriceProvider};
use pairscan::scanner;
use pairscan::signal::{self, SignalParams};
use std::fs::File;
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// PairScan - Statistical-Arbitrage Pair Scanner
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set the verbosity level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    verbose: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a ticker universe for cointegrated pairs
    Scan {
        /// Path to the CSV price file (Date column + one column per symbol)
        #[arg(long)]
        data: String,
        /// Path to a JSON scan configuration (flags below override it)
        #[arg(long)]
        config: Option<String>,
        /// Symbols to scan (comma-separated, or "default" for the built-in universe)
        #[arg(long, default_value = "default")]
        symbols: String,
        /// Significance level for the cointegration test
        #[arg(long)]
        significance: Option<f64>,
        /// Maximum number of ranked pairs to report
        #[arg(long)]
        top: Option<usize>,
        /// First date of the analysis window (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date of the analysis window (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Optional path for the ranked pairs as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Compute the z-score signal and backtest for one pair
    Signal {
        /// Path to the CSV price file
        #[arg(long)]
        data: String,
        /// The pair to analyze, e.g. "TCS.NS,INFY.NS"
        #[arg(long)]
        pair: String,
        /// Rolling window size for the spread statistics
        #[arg(long, default_value_t = 30)]
        window: usize,
        /// Z-score entry threshold
        #[arg(long, default_value_t = 2.0)]
        entry: f64,
        /// Z-score exit threshold
        #[arg(long, default_value_t = 0.5)]
        exit: f64,
        /// First date of the analysis window (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date of the analysis window (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Path for the exported signal table
        #[arg(long, default_value = "pair_trading_signals.csv")]
        output: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.verbose).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Scan {
            data,
            config,
            symbols,
            significance,
            top,
            start,
            end,
            output,
        } => run_scan(
            &data, config, &symbols, significance, top, start, end, output,
        ),
        Commands::Signal {
            data,
            pair,
            window,
            entry,
            exit,
            start,
            end,
            output,
        } => run_signal(&data, &pair, window, entry, exit, start, end, &output),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_scan(
    data: &str,
    config_path: Option<String>,
    symbols: &str,
    significance: Option<f64>,
    top: Option<usize>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    output: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => ScanConfig::from_file(path)?,
        None => ScanConfig::default(),
    };
    if symbols != "default" {
        config.tickers = symbols.split(',').map(|s| s.trim().to_string()).collect();
    }
    if let Some(significance) = significance {
        config.significance = significance;
    }
    if let Some(top) = top {
        config.top_n = top;
    }
    if let Some(start) = start {
        config.start = start;
    }
    if let Some(end) = end {
        config.end = end;
    }
    config.validate()?;

    let provider = CsvProvider::new(data);
    let prices = provider.fetch(&config.tickers, config.start, config.end)?;
    let ranked = scanner::scan(&prices, config.significance, config.top_n)?;

    println!(
        "Cointegrated Pairs (p < {}):",
        config.significance
    );
    if ranked.is_empty() {
        println!("No cointegrated pairs found. Try different tickers.");
    }
    for pair in &ranked {
        println!(
            "{} & {} - p-value: {:.4}",
            pair.symbol_a, pair.symbol_b, pair.p_value
        );
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&ranked)?;
        let mut file = File::create(&path)?;
        file.write_all(json.as_bytes())?;
        println!("Ranked pairs written to {path}");
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_signal(
    data: &str,
    pair: &str,
    window: usize,
    entry: f64,
    exit: f64,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    output: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (symbol_a, symbol_b) = pair
        .split_once(',')
        .map(|(a, b)| (a.trim().to_string(), b.trim().to_string()))
        .ok_or("pair must be two comma-separated symbols, e.g. \"TCS.NS,INFY.NS\"")?;

    let defaults = ScanConfig::default();
    let provider = CsvProvider::new(data);
    let prices = provider.fetch(
        &[symbol_a.clone(), symbol_b.clone()],
        start.unwrap_or(defaults.start),
        end.unwrap_or(defaults.end),
    )?;

    let params = SignalParams {
        window,
        entry_threshold: entry,
        exit_threshold: exit,
    };
    let result = signal::compute_signal(&prices, &symbol_a, &symbol_b, &params)?;
    let metrics = &result.metrics;

    println!("--- Metrics Summary: {symbol_a} & {symbol_b} ---");
    println!("Total Strategy Return: {:.2}%", metrics.total_return_pct);
    println!("Average Daily Return:  {:.4}%", metrics.avg_daily_return_pct);
    match metrics.sharpe_ratio {
        Some(sharpe) => println!("Sharpe Ratio:          {sharpe:.2}"),
        None => println!("Sharpe Ratio:          n/a (zero volatility)"),
    }
    println!("Long Signals:          {}", metrics.long_signals);
    println!("Short Signals:         {}", metrics.short_signals);
    println!("Exit Signals:          {}", metrics.exit_signals);

    let file = File::create(output)?;
    signal::write_signal_table(&result, file)?;
    println!("Signal table written to {output}");

    Ok(())
}
