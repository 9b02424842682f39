use analysis_core::{ErrorResult, SignalResult};
use analysis_orchestrator::ScanReport;
use technical_analysis::ChartSeries;

/// Plain text table with columns padded to their widest cell.
struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: Vec<&'static str>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let line = |cells: Vec<&str>| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = line(self.headers.clone());
        out.push('\n');
        out.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row.iter().map(String::as_str).collect()));
            out.push('\n');
        }
        out
    }
}

pub fn signal_table(signals: &[SignalResult]) -> String {
    let mut table = Table::new(vec![
        "Ticker",
        "Outlook",
        "Options Strategy",
        "Example Option",
        "Indicator Profile",
        "Price Target",
        "RSI",
        "MACD",
        "MACD_Signal",
        "Close",
    ]);
    for s in signals {
        table.push(vec![
            s.ticker.clone(),
            s.outlook.to_string(),
            s.options_strategy.clone(),
            s.example_option.clone(),
            s.indicator_profile.to_string(),
            s.price_target.clone(),
            format!("{:.2}", s.rsi),
            format!("{:.4}", s.macd),
            format!("{:.4}", s.macd_signal),
            format!("{:.2}", s.close),
        ]);
    }
    table.render()
}

pub fn outlook_table(signals: &[SignalResult]) -> String {
    let mut table = Table::new(vec!["Ticker", "Outlook"]);
    for s in signals {
        table.push(vec![s.ticker.clone(), s.outlook.to_string()]);
    }
    table.render()
}

pub fn error_table(errors: &[ErrorResult]) -> String {
    let mut table = Table::new(vec!["Ticker", "Error"]);
    for e in errors {
        table.push(vec![e.ticker.clone(), e.error.clone()]);
    }
    table.render()
}

pub fn chart_table(chart: &ChartSeries) -> String {
    let mut table = Table::new(vec!["Date", "Close", "RSI", "MACD", "MACD_Signal"]);
    for row in &chart.rows {
        table.push(vec![
            row.timestamp.format("%Y-%m-%d").to_string(),
            format!("{:.2}", row.close),
            format!("{:.2}", row.rsi),
            format!("{:.4}", row.macd),
            format!("{:.4}", row.macd_signal),
        ]);
    }
    format!(
        "{} close / RSI / MACD (RSI guides at {:.0} and {:.0})\n{}",
        chart.ticker,
        chart.rsi_oversold,
        chart.rsi_overbought,
        table.render()
    )
}

/// Full text report: all signals, then the buy, sell and error groups.
/// Empty groups are reported as a single line instead of an empty table.
pub fn report_text(report: &ScanReport) -> String {
    let mut out = format!(
        "Signals for period {} ({} tickers)\n\n",
        report.period,
        report.total()
    );

    if report.signals.is_empty() {
        out.push_str("No signals computed.\n");
    } else {
        out.push_str(&signal_table(&report.signals));
    }

    for (title, group) in [("Buy signals", &report.buy), ("Sell signals", &report.sell)] {
        out.push_str(&format!("\n{}\n", title));
        if group.is_empty() {
            out.push_str("None.\n");
        } else {
            out.push_str(&outlook_table(group));
        }
    }

    if !report.errors.is_empty() {
        out.push_str("\nErrors\n");
        out.push_str(&error_table(&report.errors));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{
        IndicatorProfile, LookbackPeriod, MacdCrossover, Outlook, PriceTrend, TickerOutcome,
        VolumeTrend,
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use technical_analysis::ChartRow;

    fn signal(ticker: &str, outlook: Outlook) -> SignalResult {
        SignalResult {
            ticker: ticker.to_string(),
            price_trend: PriceTrend::Up,
            volume_trend: VolumeTrend::Strong,
            rsi: 48.123,
            macd: 0.123456,
            macd_signal: -0.05,
            macd_crossover: MacdCrossover::Bullish,
            close: 110.0,
            outlook,
            options_strategy: "Buy Call or Bull Call Spread".to_string(),
            example_option: "Buy $115.0 Call expiring 2024-02-16".to_string(),
            indicator_profile: IndicatorProfile::Standard,
            price_target: "$115.50 (in ~7 days)".to_string(),
            target_price: Some(dec!(115.50)),
            as_of: Utc.with_ymd_and_hms(2024, 2, 9, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_signal_table_formats_numbers() {
        let text = signal_table(&[signal("AAPL", Outlook::StrongBuy)]);
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Ticker"));
        assert!(header.ends_with("Close"));
        let row = lines.nth(1).unwrap();
        assert!(row.contains("UP (Strong Buy)"));
        assert!(row.contains("48.12"));
        assert!(row.contains("0.1235"));
        assert!(row.contains("-0.0500"));
        assert!(row.contains("110.00"));
        assert!(row.contains("$115.50 (in ~7 days)"));
    }

    #[test]
    fn test_columns_are_aligned() {
        let text = outlook_table(&[
            signal("A", Outlook::Oversold),
            signal("GOOGL", Outlook::StrongBuy),
        ]);
        let offsets: Vec<usize> = text
            .lines()
            .filter(|l| !l.starts_with('-'))
            .map(|l| l.find("UP").or_else(|| l.find("Outlook")).unwrap())
            .collect();
        assert!(offsets.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_report_text_groups() {
        let report = ScanReport::from_outcomes(
            LookbackPeriod::Days30,
            vec![
                TickerOutcome::Signal(signal("AAPL", Outlook::StrongBuy)),
                TickerOutcome::error("ZZZZ", "No data found."),
            ],
        );
        let text = report_text(&report);
        assert!(text.starts_with("Signals for period 30d (2 tickers)"));
        assert!(text.contains("Buy signals"));
        assert!(text.contains("Sell signals\nNone."));
        assert!(text.lines().any(|l| l.starts_with("ZZZZ") && l.ends_with("No data found.")));
    }

    #[test]
    fn test_report_text_without_errors_omits_error_table() {
        let report = ScanReport::from_outcomes(
            LookbackPeriod::Days7,
            vec![TickerOutcome::Signal(signal("MSFT", Outlook::Neutral))],
        );
        assert!(!report_text(&report).contains("Errors"));
    }

    #[test]
    fn test_chart_table() {
        let chart = ChartSeries {
            ticker: "AAPL".to_string(),
            rows: vec![ChartRow {
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
                close: 180.5,
                rsi: 55.556,
                macd: 1.0,
                macd_signal: 0.5,
            }],
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
        };
        let text = chart_table(&chart);
        assert!(text.starts_with("AAPL close / RSI / MACD (RSI guides at 30 and 70)"));
        assert!(text.contains("2024-03-01  180.50  55.56  1.0000  0.5000"));
    }
}
