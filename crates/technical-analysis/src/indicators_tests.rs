#[cfg(test)]
mod tests {
    use super::super::indicators::*;
    use analysis_core::{Bar, IndicatorEngine, IndicatorWindows};
    use chrono::Utc;

    // Helper function to create sample price data
    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    fn long_prices(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1).collect()
    }

    // Helper function to create sample bars
    fn sample_bars(n: usize) -> Vec<Bar> {
        long_prices(n)
            .into_iter()
            .enumerate()
            .map(|(i, close)| Bar {
                timestamp: Utc::now() - chrono::Duration::days((n - i) as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000_000.0 + i as f64 * 1000.0,
            })
            .collect()
    }

    fn defined(series: &[Option<f64>]) -> Vec<f64> {
        series.iter().flatten().copied().collect()
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), data.len());
        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert!((result[2].unwrap() - 2.0).abs() < 0.001); // (1+2+3)/3 = 2
        assert!((result[3].unwrap() - 3.0).abs() < 0.001); // (2+3+4)/3 = 3
        assert!((result[4].unwrap() - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        let result = sma(&data, 5);

        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_sma_real_prices() {
        let prices = sample_prices();
        let result = sma(&prices, 5);

        // First SMA(5) should be average of first 5 prices
        let expected_first = (44.34 + 44.09 + 44.15 + 43.61 + 44.33) / 5.0;
        assert!((result[4].unwrap() - expected_first).abs() < 0.01);
        assert_eq!(defined(&result).len(), prices.len() - 4);
    }

    #[test]
    fn test_ema_basic() {
        let data = vec![22.0, 24.0, 23.0, 25.0, 26.0];
        let result = ema(&data, 3);

        assert_eq!(result.len(), data.len());
        // EMA should start with SMA
        let first_sma = (22.0 + 24.0 + 23.0) / 3.0;
        assert!((result[2].unwrap() - first_sma).abs() < 0.01);
        // 2/(3+1) = 0.5 weighting
        let next = (25.0 - first_sma) * 0.5 + first_sma;
        assert!((result[3].unwrap() - next).abs() < 1e-9);
    }

    #[test]
    fn test_ema_empty_data() {
        let data: Vec<f64> = vec![];
        let result = ema(&data, 5);

        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_ema_increases_with_uptrend() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let values = defined(&ema(&data, 3));

        for i in 1..values.len() {
            assert!(values[i] > values[i - 1]);
        }
    }

    #[test]
    fn test_rsi_basic() {
        let prices = sample_prices();
        let result = rsi(&prices, 14);

        assert_eq!(result.len(), prices.len());
        assert!(result[..14].iter().all(|v| v.is_none()));
        for value in defined(&result) {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_rsi_wilder_seed() {
        // Alternating +1/-1 changes: equal average gain and loss
        let data: Vec<f64> = (0..15).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        let result = rsi(&data, 14);
        assert!((result[14].unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let data = vec![1.0, 2.0, 3.0];
        let result = rsi(&data, 14);

        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_rsi_overbought_oversold() {
        let uptrend: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let result = rsi(&uptrend, 14);
        assert!(result.last().unwrap().unwrap() > 70.0);

        let downtrend: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let result = rsi(&downtrend, 14);
        assert!(result.last().unwrap().unwrap() < 30.0);
    }

    #[test]
    fn test_rsi_flat_prices() {
        let data = vec![50.0; 20];
        let result = rsi(&data, 14);
        assert_eq!(result.last().copied().flatten(), Some(50.0));
    }

    #[test]
    fn test_macd_alignment() {
        let prices = long_prices(60);
        let result = macd(&prices, 12, 26, 9);

        assert_eq!(result.macd_line.len(), prices.len());
        assert_eq!(result.signal_line.len(), prices.len());
        assert!(result.macd_line[24].is_none());
        assert!(result.macd_line[25].is_some());
        assert!(result.signal_line[32].is_none());
        assert!(result.signal_line[33].is_some());
    }

    #[test]
    fn test_macd_histogram() {
        let prices = long_prices(60);
        let result = macd(&prices, 12, 26, 9);

        // Histogram should be macd_line - signal_line
        for i in 0..prices.len() {
            match (result.macd_line[i], result.signal_line[i], result.histogram[i]) {
                (Some(m), Some(s), Some(h)) => assert!((h - (m - s)).abs() < 1e-9),
                (_, None, None) => {}
                other => panic!("misaligned histogram at {}: {:?}", i, other),
            }
        }
    }

    #[test]
    fn test_macd_invalid_periods() {
        let prices = long_prices(60);
        let result = macd(&prices, 26, 12, 9);
        assert!(result.macd_line.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_standard_engine_warm_up_matches_windows() {
        let bars = sample_bars(60);
        for windows in [IndicatorWindows::standard(), IndicatorWindows::fast()] {
            let series = StandardIndicators.compute(&bars, &windows);
            assert_eq!(series.len(), bars.len());

            let first_complete = (0..bars.len()).find(|&i| series.row(i).is_some());
            assert_eq!(first_complete, Some(windows.warm_up()));
        }
    }

    #[test]
    fn test_standard_engine_volume_sma() {
        let bars = sample_bars(10);
        let series = StandardIndicators.compute(&bars, &IndicatorWindows::fast());
        assert!(series.volume_sma[3].is_none());
        let expected = bars[..5].iter().map(|b| b.volume).sum::<f64>() / 5.0;
        assert!((series.volume_sma[4].unwrap() - expected).abs() < 1e-6);
    }
}
