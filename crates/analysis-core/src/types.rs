use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// OHLCV bar data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// True when every price and volume field holds a usable number.
    pub fn is_complete(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// How far back to sample price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookbackPeriod {
    #[serde(rename = "7d")]
    Days7,
    #[serde(rename = "15d")]
    Days15,
    #[serde(rename = "30d")]
    Days30,
    #[serde(rename = "50d")]
    Days50,
    #[serde(rename = "90d")]
    Days90,
    #[serde(rename = "180d")]
    Days180,
    #[serde(rename = "1y")]
    Year1,
}

impl LookbackPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookbackPeriod::Days7 => "7d",
            LookbackPeriod::Days15 => "15d",
            LookbackPeriod::Days30 => "30d",
            LookbackPeriod::Days50 => "50d",
            LookbackPeriod::Days90 => "90d",
            LookbackPeriod::Days180 => "180d",
            LookbackPeriod::Year1 => "1y",
        }
    }

    /// Calendar days covered by the period.
    pub fn days(&self) -> i64 {
        match self {
            LookbackPeriod::Days7 => 7,
            LookbackPeriod::Days15 => 15,
            LookbackPeriod::Days30 => 30,
            LookbackPeriod::Days50 => 50,
            LookbackPeriod::Days90 => 90,
            LookbackPeriod::Days180 => 180,
            LookbackPeriod::Year1 => 365,
        }
    }

    /// Short lookbacks sample hourly bars, longer ones daily bars.
    pub fn default_interval(&self) -> BarInterval {
        match self {
            LookbackPeriod::Days7 | LookbackPeriod::Days15 | LookbackPeriod::Days30 => {
                BarInterval::Hour1
            }
            _ => BarInterval::Day1,
        }
    }

    pub fn all() -> [LookbackPeriod; 7] {
        [
            LookbackPeriod::Days7,
            LookbackPeriod::Days15,
            LookbackPeriod::Days30,
            LookbackPeriod::Days50,
            LookbackPeriod::Days90,
            LookbackPeriod::Days180,
            LookbackPeriod::Year1,
        ]
    }
}

impl Default for LookbackPeriod {
    fn default() -> Self {
        LookbackPeriod::Days30
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookbackPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LookbackPeriod::all()
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown lookback period '{}', expected one of 7d, 15d, 30d, 50d, 90d, 180d, 1y", s)
            })
    }
}

/// Sampling interval of a bar series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarInterval {
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "1d")]
    Day1,
}

impl BarInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarInterval::Hour1 => "1h",
            BarInterval::Day1 => "1d",
        }
    }

    /// Indicator windows tuned for this interval.
    pub fn windows(&self) -> IndicatorWindows {
        match self {
            BarInterval::Hour1 => IndicatorWindows::fast(),
            BarInterval::Day1 => IndicatorWindows::standard(),
        }
    }

    pub fn profile(&self) -> IndicatorProfile {
        match self {
            BarInterval::Hour1 => IndicatorProfile::Fast,
            BarInterval::Day1 => IndicatorProfile::Standard,
        }
    }
}

impl fmt::Display for BarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1h" => Ok(BarInterval::Hour1),
            "1d" => Ok(BarInterval::Day1),
            other => Err(format!("unknown bar interval '{}', expected 1h or 1d", other)),
        }
    }
}

/// Inputs for one ticker analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub ticker: String,
    pub period: LookbackPeriod,
    pub interval: BarInterval,
}

impl AnalysisConfig {
    /// Builds a config, deriving the interval from the period when absent.
    pub fn new(ticker: impl Into<String>, period: LookbackPeriod, interval: Option<BarInterval>) -> Self {
        Self {
            ticker: ticker.into(),
            period,
            interval: interval.unwrap_or_else(|| period.default_interval()),
        }
    }
}

/// Rolling/EMA window lengths used to build an [`IndicatorSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorWindows {
    pub rsi: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub volume_sma: usize,
}

impl IndicatorWindows {
    /// Hourly profile: RSI 7, MACD 6/13/5.
    pub fn fast() -> Self {
        Self { rsi: 7, macd_fast: 6, macd_slow: 13, macd_signal: 5, volume_sma: 5 }
    }

    /// Daily profile: RSI 14, MACD 12/26/9.
    pub fn standard() -> Self {
        Self { rsi: 14, macd_fast: 12, macd_slow: 26, macd_signal: 9, volume_sma: 5 }
    }

    /// Number of leading bars with at least one undefined indicator.
    pub fn warm_up(&self) -> usize {
        let rsi = self.rsi;
        let macd = (self.macd_slow + self.macd_signal).saturating_sub(2);
        let volume = self.volume_sma.saturating_sub(1);
        rsi.max(macd).max(volume)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorProfile {
    #[serde(rename = "Fast MACD/RSI")]
    Fast,
    #[serde(rename = "Standard MACD/RSI")]
    Standard,
}

impl IndicatorProfile {
    pub fn label(&self) -> &'static str {
        match self {
            IndicatorProfile::Fast => "Fast MACD/RSI",
            IndicatorProfile::Standard => "Standard MACD/RSI",
        }
    }
}

impl fmt::Display for IndicatorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-bar indicator values aligned index-for-index with the bar series.
/// `None` marks a warm-up bar where the indicator is not yet defined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub volume_sma: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// Length of the shortest component series.
    pub fn len(&self) -> usize {
        self.rsi
            .len()
            .min(self.macd.len())
            .min(self.macd_signal.len())
            .min(self.volume_sma.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All four values at `index`, if every one is defined.
    pub fn row(&self, index: usize) -> Option<IndicatorRow> {
        Some(IndicatorRow {
            rsi: (*self.rsi.get(index)?)?,
            macd: (*self.macd.get(index)?)?,
            macd_signal: (*self.macd_signal.get(index)?)?,
            volume_sma: (*self.volume_sma.get(index)?)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub volume_sma: f64,
}

/// A single listed option contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub strike: f64,
    pub expiration: NaiveDate,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Listed options for an underlying.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionChain {
    pub expirations: Vec<NaiveDate>,
    pub calls: Vec<OptionContract>,
    pub puts: Vec<OptionContract>,
}

impl OptionChain {
    /// Earliest expiration on or after `as_of`.
    pub fn nearest_expiration(&self, as_of: NaiveDate) -> Option<NaiveDate> {
        self.expirations.iter().copied().filter(|d| *d >= as_of).min()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceTrend {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeTrend {
    Strong,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacdCrossover {
    Bullish,
    Bearish,
    Neutral,
}

/// Discrete recommendation for the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outlook {
    #[serde(rename = "UP (Strong Buy)")]
    StrongBuy,
    #[serde(rename = "DOWN (Sell)")]
    Sell,
    #[serde(rename = "UP (RSI Oversold)")]
    Oversold,
    #[serde(rename = "DOWN (RSI Overbought)")]
    Overbought,
    #[serde(rename = "NEUTRAL / Wait")]
    Neutral,
}

impl Outlook {
    pub fn label(&self) -> &'static str {
        match self {
            Outlook::StrongBuy => "UP (Strong Buy)",
            Outlook::Sell => "DOWN (Sell)",
            Outlook::Oversold => "UP (RSI Oversold)",
            Outlook::Overbought => "DOWN (RSI Overbought)",
            Outlook::Neutral => "NEUTRAL / Wait",
        }
    }

    /// Outlooks labelled "UP ...".
    pub fn is_up(&self) -> bool {
        matches!(self, Outlook::StrongBuy | Outlook::Oversold)
    }

    /// Outlooks labelled "DOWN ...".
    pub fn is_down(&self) -> bool {
        matches!(self, Outlook::Sell | Outlook::Overbought)
    }
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Options strategy hint attached to a signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsSuggestion {
    pub strategy: String,
    pub example: String,
}

impl OptionsSuggestion {
    pub const PLACEHOLDER: &'static str = "-";
    pub const UNAVAILABLE: &'static str = "Options data unavailable";

    /// No suggestion applies (neutral outlook).
    pub fn none() -> Self {
        Self {
            strategy: Self::PLACEHOLDER.to_string(),
            example: Self::PLACEHOLDER.to_string(),
        }
    }

    /// The chain lookup failed.
    pub fn unavailable() -> Self {
        Self {
            strategy: Self::PLACEHOLDER.to_string(),
            example: Self::UNAVAILABLE.to_string(),
        }
    }
}

/// Successful analysis of one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub ticker: String,
    pub price_trend: PriceTrend,
    pub volume_trend: VolumeTrend,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_crossover: MacdCrossover,
    pub close: f64,
    pub outlook: Outlook,
    pub options_strategy: String,
    pub example_option: String,
    pub indicator_profile: IndicatorProfile,
    /// Rendered target, e.g. `$115.50 (in ~7 days)`, or `-`.
    pub price_target: String,
    #[serde(default)]
    pub target_price: Option<Decimal>,
    pub as_of: DateTime<Utc>,
}

/// Failed analysis of one ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub ticker: String,
    pub error: String,
}

/// Tagged outcome of analyzing one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TickerOutcome {
    Signal(SignalResult),
    Error(ErrorResult),
}

impl TickerOutcome {
    pub fn error(ticker: impl Into<String>, error: impl fmt::Display) -> Self {
        TickerOutcome::Error(ErrorResult {
            ticker: ticker.into(),
            error: error.to_string(),
        })
    }

    pub fn ticker(&self) -> &str {
        match self {
            TickerOutcome::Signal(s) => &s.ticker,
            TickerOutcome::Error(e) => &e.ticker,
        }
    }

    pub fn as_signal(&self) -> Option<&SignalResult> {
        match self {
            TickerOutcome::Signal(s) => Some(s),
            TickerOutcome::Error(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorResult> {
        match self {
            TickerOutcome::Signal(_) => None,
            TickerOutcome::Error(e) => Some(e),
        }
    }
}
