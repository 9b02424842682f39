//! trend-scanner: rule-based RSI/MACD/volume outlooks for a list of tickers.
//!
//! Usage:
//!   cargo run -p trend-scanner -- --tickers AAPL,MSFT --period 90d
//!   cargo run -p trend-scanner -- --period 7d --chart AAPL
//!   cargo run -p trend-scanner -- --json > report.json

mod config;
mod render;

use analysis_orchestrator::{parse_tickers, SignalScanner};
use anyhow::{bail, Result};
use clap::Parser;
use config::{Cli, ScannerConfig};
use polygon_client::PolygonClient;
use std::sync::Arc;
use technical_analysis::SignalAnalyzer;

const DEFAULT_LOG_FILTER: &str =
    "trend_scanner=info,analysis_orchestrator=info,technical_analysis=info,polygon_client=warn";

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let tickers = parse_tickers(&cli.tickers);
    if tickers.is_empty() {
        bail!("no tickers given");
    }
    let config = ScannerConfig::load(&cli)?;

    tracing::info!(
        tickers = tickers.len(),
        period = %cli.period,
        interval = %cli.interval.unwrap_or_else(|| cli.period.default_interval()),
        timeout = ?config.ticker_timeout,
        "Starting scan"
    );

    let provider = Arc::new(PolygonClient::new(config.api_key.clone()));
    let analyzer = SignalAnalyzer::new(provider).with_price_targets(config.price_targets.clone());
    let scanner = SignalScanner::new(analyzer).with_ticker_timeout(config.ticker_timeout);

    let report = scanner.scan_report(&tickers, cli.period, cli.interval).await;

    let chart = match cli.chart.as_deref().map(|t| t.trim().to_uppercase()) {
        Some(ticker) if !ticker.is_empty() => match scanner.chart(&ticker, cli.period).await {
            Ok(chart) => Some(chart),
            Err(e) => {
                tracing::warn!(ticker = %ticker, error = %e, "Chart data unavailable");
                None
            }
        },
        _ => None,
    };

    if cli.json {
        let body = serde_json::json!({ "report": report, "chart": chart });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print!("{}", render::report_text(&report));
        if let Some(chart) = &chart {
            println!();
            print!("{}", render::chart_table(chart));
        }
    }

    Ok(())
}
