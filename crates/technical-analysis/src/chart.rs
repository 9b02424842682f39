use analysis_core::{Bar, IndicatorEngine, IndicatorWindows};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::{RSI_OVERBOUGHT, RSI_OVERSOLD};

/// One plotted point of the price/RSI/MACD history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
}

/// Historical indicator series for a single ticker, ready to plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub ticker: String,
    pub rows: Vec<ChartRow>,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
}

/// Builds chart rows with the standard (daily) windows regardless of the scan
/// interval. Rows missing RSI or MACD values are dropped; volume is not used.
pub fn chart_series(ticker: &str, bars: &[Bar], engine: &dyn IndicatorEngine) -> ChartSeries {
    let complete: Vec<Bar> = bars.iter().filter(|b| b.is_complete()).cloned().collect();
    let series = engine.compute(&complete, &IndicatorWindows::standard());

    let rows = complete
        .iter()
        .enumerate()
        .filter_map(|(i, bar)| {
            Some(ChartRow {
                timestamp: bar.timestamp,
                close: bar.close,
                rsi: (*series.rsi.get(i)?)?,
                macd: (*series.macd.get(i)?)?,
                macd_signal: (*series.macd_signal.get(i)?)?,
            })
        })
        .collect();

    ChartSeries {
        ticker: ticker.to_string(),
        rows,
        rsi_overbought: RSI_OVERBOUGHT,
        rsi_oversold: RSI_OVERSOLD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StandardIndicators;
    use chrono::Duration;

    fn bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let close = 50.0 + (i as f64 * 0.3).cos() * 2.0;
                Bar {
                    timestamp: Utc::now() - Duration::days((n - i) as i64),
                    open: close,
                    high: close + 0.5,
                    low: close - 0.5,
                    close,
                    volume: 10_000.0,
                }
            })
            .collect()
    }

    #[test]
    fn test_chart_uses_standard_windows() {
        let chart = chart_series("AAPL", &bars(50), &StandardIndicators);
        // MACD signal (12/26/9) is first defined at index 33
        assert_eq!(chart.rows.len(), 50 - 33);
        assert_eq!(chart.rsi_overbought, 70.0);
        assert_eq!(chart.rsi_oversold, 30.0);
        assert!(chart.rows.iter().all(|r| (0.0..=100.0).contains(&r.rsi)));
    }

    #[test]
    fn test_chart_short_history_is_empty() {
        let chart = chart_series("AAPL", &bars(20), &StandardIndicators);
        assert!(chart.rows.is_empty());
    }
}
