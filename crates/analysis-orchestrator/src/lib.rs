use analysis_core::{AnalysisConfig, AnalysisError, BarInterval, LookbackPeriod, TickerOutcome};
use std::time::Duration;
use technical_analysis::{chart_series, ChartSeries, SignalAnalyzer};

pub mod report;
pub use report::{ScanReport, SignalGroup};

pub const DEFAULT_TICKERS: &str = "AAPL,MSFT,GOOGL,TSLA,AMZN";
pub const DEFAULT_TICKER_TIMEOUT_SECS: u64 = 30;

/// Splits a comma-separated ticker list, trimming and upper-casing each entry.
/// Empty entries are dropped; duplicates are kept in place.
pub fn parse_tickers(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Runs the analyzer over a list of tickers one at a time.
///
/// A failure or timeout for one ticker becomes an error outcome for that ticker
/// and never stops the scan. Outcomes are returned in input order.
///
/// The ticker timeout bounds each provider call the analyzer makes. Only a
/// bar fetch that overruns fails the ticker; a slow option chain degrades the
/// options fields and keeps the computed outlook.
pub struct SignalScanner {
    analyzer: SignalAnalyzer,
    ticker_timeout: Duration,
}

impl SignalScanner {
    pub fn new(analyzer: SignalAnalyzer) -> Self {
        Self::with_timeout(analyzer, Duration::from_secs(DEFAULT_TICKER_TIMEOUT_SECS))
    }

    pub fn with_ticker_timeout(self, timeout: Duration) -> Self {
        Self::with_timeout(self.analyzer, timeout)
    }

    fn with_timeout(analyzer: SignalAnalyzer, ticker_timeout: Duration) -> Self {
        Self {
            analyzer: analyzer.with_fetch_timeout(ticker_timeout),
            ticker_timeout,
        }
    }

    pub fn analyzer(&self) -> &SignalAnalyzer {
        &self.analyzer
    }

    pub async fn scan(
        &self,
        tickers: &[String],
        period: LookbackPeriod,
        interval: Option<BarInterval>,
    ) -> Vec<TickerOutcome> {
        let mut outcomes = Vec::with_capacity(tickers.len());

        for ticker in tickers {
            let config = AnalysisConfig::new(ticker.clone(), period, interval);
            outcomes.push(self.analyzer.analyze_config(&config).await);
        }

        tracing::info!(
            tickers = outcomes.len(),
            errors = outcomes.iter().filter(|o| o.as_error().is_some()).count(),
            period = %period,
            "Scan complete"
        );
        outcomes
    }

    /// Scan and partition into a report.
    pub async fn scan_report(
        &self,
        tickers: &[String],
        period: LookbackPeriod,
        interval: Option<BarInterval>,
    ) -> ScanReport {
        ScanReport::from_outcomes(period, self.scan(tickers, period, interval).await)
    }

    /// Daily price/RSI/MACD history for one ticker using the standard windows.
    pub async fn chart(&self, ticker: &str, period: LookbackPeriod) -> Result<ChartSeries, AnalysisError> {
        let bars = tokio::time::timeout(
            self.ticker_timeout,
            self.analyzer.provider().get_bars(ticker, period, BarInterval::Day1),
        )
        .await
        .map_err(|_| AnalysisError::Timeout(self.ticker_timeout))??;

        if bars.is_empty() {
            return Err(AnalysisError::NoData);
        }
        Ok(chart_series(ticker, &bars, self.analyzer.indicators()))
    }
}
