use analysis_core::{BarInterval, LookbackPeriod, PriceTargetPolicy};
use analysis_orchestrator::{DEFAULT_TICKERS, DEFAULT_TICKER_TIMEOUT_SECS};
use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;

/// Multi-ticker trend scanner: RSI/MACD/volume outlooks with option ideas.
#[derive(Debug, Parser)]
#[command(name = "trend-scanner", version, about)]
pub struct Cli {
    /// Comma-separated tickers, e.g. AAPL,MSFT,GOOGL.
    #[arg(long, short, default_value = DEFAULT_TICKERS)]
    pub tickers: String,

    /// Lookback period: 7d, 15d, 30d, 50d, 90d, 180d or 1y.
    #[arg(long, short, default_value = "30d")]
    pub period: LookbackPeriod,

    /// Bar interval (1h or 1d). Derived from the period when omitted.
    #[arg(long, short)]
    pub interval: Option<BarInterval>,

    /// Per-ticker time limit in seconds. Overrides SCAN_TICKER_TIMEOUT_SECS.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Also print the daily price/RSI/MACD history for this ticker.
    #[arg(long)]
    pub chart: Option<String>,

    /// Emit the report as JSON on stdout.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, default_value_t = false)]
    pub json_logs: bool,
}

/// Resolved runtime settings: CLI flags over environment over defaults.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub api_key: String,
    pub ticker_timeout: Duration,
    pub price_targets: PriceTargetPolicy,
}

impl ScannerConfig {
    pub fn load(cli: &Cli) -> Result<Self> {
        let api_key = std::env::var("POLYGON_API_KEY")
            .context("POLYGON_API_KEY must be set (in the environment or .env)")?;

        let env_timeout = std::env::var("SCAN_TICKER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok());
        let secs = resolve_timeout(cli.timeout_secs, env_timeout);

        Ok(Self {
            api_key,
            ticker_timeout: Duration::from_secs(secs),
            price_targets: PriceTargetPolicy::from_env(),
        })
    }
}

fn resolve_timeout(cli: Option<u64>, env: Option<u64>) -> u64 {
    cli.or(env)
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_TICKER_TIMEOUT_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["trend-scanner"]);
        assert_eq!(cli.tickers, DEFAULT_TICKERS);
        assert_eq!(cli.period, LookbackPeriod::Days30);
        assert_eq!(cli.interval, None);
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "trend-scanner", "--tickers", "nvda,amd", "--period", "1y", "--interval", "1h",
            "--chart", "NVDA", "--json",
        ]);
        assert_eq!(cli.tickers, "nvda,amd");
        assert_eq!(cli.period, LookbackPeriod::Year1);
        assert_eq!(cli.interval, Some(BarInterval::Hour1));
        assert_eq!(cli.chart.as_deref(), Some("NVDA"));
        assert!(cli.json);
    }

    #[test]
    fn test_cli_rejects_unknown_period() {
        assert!(Cli::try_parse_from(["trend-scanner", "--period", "2w"]).is_err());
    }

    #[test]
    fn test_timeout_precedence() {
        assert_eq!(resolve_timeout(Some(5), Some(10)), 5);
        assert_eq!(resolve_timeout(None, Some(10)), 10);
        assert_eq!(resolve_timeout(None, None), DEFAULT_TICKER_TIMEOUT_SECS);
        assert_eq!(resolve_timeout(Some(0), None), DEFAULT_TICKER_TIMEOUT_SECS);
    }
}
