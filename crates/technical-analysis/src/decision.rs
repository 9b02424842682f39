//! Classification of the most recent bar and the outlook rule table.
//!
//! The outlook is decided by an ordered list of rules evaluated top-down; the
//! first rule whose predicate holds wins, and [`Outlook::Neutral`] is the
//! fallback when none match.

use analysis_core::{
    AnalysisError, Bar, IndicatorRow, IndicatorSeries, MacdCrossover, Outlook, PriceTrend,
    VolumeTrend,
};

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Trend, volume and oscillator states of the latest bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalFacts {
    pub price_trend: PriceTrend,
    pub volume_trend: VolumeTrend,
    pub macd_crossover: MacdCrossover,
    pub rsi: f64,
}

/// One entry of the outlook decision table.
pub struct OutlookRule {
    pub name: &'static str,
    pub outlook: Outlook,
    pub applies: fn(&SignalFacts) -> bool,
}

fn strong_buy(f: &SignalFacts) -> bool {
    f.price_trend == PriceTrend::Up
        && f.volume_trend == VolumeTrend::Strong
        && f.macd_crossover == MacdCrossover::Bullish
        && f.rsi < RSI_OVERBOUGHT
}

fn sell(f: &SignalFacts) -> bool {
    f.price_trend == PriceTrend::Down
        && f.macd_crossover == MacdCrossover::Bearish
        && f.rsi > RSI_OVERSOLD
}

fn oversold(f: &SignalFacts) -> bool {
    f.rsi < RSI_OVERSOLD
}

fn overbought(f: &SignalFacts) -> bool {
    f.rsi > RSI_OVERBOUGHT
}

/// Outlook rules in priority order.
pub const OUTLOOK_RULES: [OutlookRule; 4] = [
    OutlookRule { name: "strong_buy", outlook: Outlook::StrongBuy, applies: strong_buy },
    OutlookRule { name: "sell", outlook: Outlook::Sell, applies: sell },
    OutlookRule { name: "rsi_oversold", outlook: Outlook::Oversold, applies: oversold },
    OutlookRule { name: "rsi_overbought", outlook: Outlook::Overbought, applies: overbought },
];

/// First matching rule of `rules`, or neutral.
pub fn derive_outlook_with(rules: &[OutlookRule], facts: &SignalFacts) -> Outlook {
    rules
        .iter()
        .find(|rule| (rule.applies)(facts))
        .map(|rule| rule.outlook)
        .unwrap_or(Outlook::Neutral)
}

pub fn derive_outlook(facts: &SignalFacts) -> Outlook {
    derive_outlook_with(&OUTLOOK_RULES, facts)
}

/// Strict MACD/signal crossing detector.
///
/// Fires only on the bar where the MACD line moves from one side of the signal
/// line to the other; sustained separation is `Neutral`.
pub fn detect_crossover(prev_macd: f64, prev_signal: f64, macd: f64, signal: f64) -> MacdCrossover {
    if macd > signal && prev_macd <= prev_signal {
        MacdCrossover::Bullish
    } else if macd < signal && prev_macd >= prev_signal {
        MacdCrossover::Bearish
    } else {
        MacdCrossover::Neutral
    }
}

fn finite(name: &str, value: f64) -> Result<f64, AnalysisError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisError::InvalidComparison(format!("{} is not a number ({})", name, value)))
    }
}

/// A bar paired with its fully defined indicator values.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedBar {
    pub bar: Bar,
    pub indicators: IndicatorRow,
}

/// Drops every bar with an undefined indicator value.
pub fn complete_rows(bars: &[Bar], series: &IndicatorSeries) -> Vec<AnalyzedBar> {
    bars.iter()
        .enumerate()
        .filter_map(|(i, bar)| {
            series.row(i).map(|indicators| AnalyzedBar { bar: bar.clone(), indicators })
        })
        .collect()
}

/// Derives trend, volume and crossover states from the last two rows.
pub fn classify(prev: &AnalyzedBar, latest: &AnalyzedBar) -> Result<SignalFacts, AnalysisError> {
    let latest_close = finite("close", latest.bar.close)?;
    let prev_close = finite("previous close", prev.bar.close)?;
    let latest_volume = finite("volume", latest.bar.volume)?;
    let volume_sma = finite("volume SMA", latest.indicators.volume_sma)?;
    let latest_macd = finite("MACD", latest.indicators.macd)?;
    let latest_signal = finite("MACD signal", latest.indicators.macd_signal)?;
    let prev_macd = finite("previous MACD", prev.indicators.macd)?;
    let prev_signal = finite("previous MACD signal", prev.indicators.macd_signal)?;
    let rsi = finite("RSI", latest.indicators.rsi)?;

    let price_trend = if latest_close > prev_close { PriceTrend::Up } else { PriceTrend::Down };
    let volume_trend = if latest_volume > volume_sma { VolumeTrend::Strong } else { VolumeTrend::Weak };

    Ok(SignalFacts {
        price_trend,
        volume_trend,
        macd_crossover: detect_crossover(prev_macd, prev_signal, latest_macd, latest_signal),
        rsi,
    })
}

/// Result of running the decision policy over a bar series.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub latest: AnalyzedBar,
    pub facts: SignalFacts,
    pub outlook: Outlook,
}

/// Trims warm-up rows, classifies the latest bar and derives the outlook.
pub fn decide(bars: &[Bar], series: &IndicatorSeries) -> Result<Decision, AnalysisError> {
    let mut rows = complete_rows(bars, series);
    if rows.len() < 2 {
        return Err(AnalysisError::InsufficientData);
    }

    let latest = rows.pop().ok_or(AnalysisError::InsufficientData)?;
    let prev = rows.pop().ok_or(AnalysisError::InsufficientData)?;

    let facts = classify(&prev, &latest)?;
    let outlook = derive_outlook(&facts);

    Ok(Decision { latest, facts, outlook })
}
