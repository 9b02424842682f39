use analysis_core::{Bar, IndicatorEngine, IndicatorSeries, IndicatorWindows};

// Every function here returns a vector the same length as its input, with
// `None` for warm-up positions where the indicator is not yet defined.

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result[i] = Some(sum / period as f64);
    }
    result
}

/// Exponential Moving Average, seeded with the SMA of the first `period` values.
pub fn ema(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut prev = data[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = Some(prev);

    for i in period..data.len() {
        prev = (data[i] - prev) * multiplier + prev;
        result[i] = Some(prev);
    }

    result
}

/// EMA over the defined tail of an aligned series.
fn ema_of_defined(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; series.len()];
    let Some(start) = series.iter().position(|v| v.is_some()) else {
        return result;
    };

    let tail: Vec<f64> = series[start..].iter().map_while(|v| *v).collect();
    for (i, value) in ema(&tail, period).into_iter().enumerate() {
        result[start + i] = value;
    }
    result
}

/// Relative Strength Index with Wilder smoothing.
pub fn rsi(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period + 1 {
        return result;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = data[i] - data[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss += change.abs();
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    result[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    for i in period + 1..data.len() {
        let change = data[i] - data[i - 1];
        let (gain, loss) = if change > 0.0 { (change, 0.0) } else { (0.0, change.abs()) };

        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        result[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    result
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// MACD (Moving Average Convergence Divergence)
pub struct MacdResult {
    pub macd_line: Vec<Option<f64>>,
    pub signal_line: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

pub fn macd(data: &[f64], fast_period: usize, slow_period: usize, signal_period: usize) -> MacdResult {
    let empty = vec![None; data.len()];
    if fast_period == 0 || slow_period == 0 || signal_period == 0 || slow_period < fast_period {
        return MacdResult {
            macd_line: empty.clone(),
            signal_line: empty.clone(),
            histogram: empty,
        };
    }

    let ema_fast = ema(data, fast_period);
    let ema_slow = ema(data, slow_period);

    let macd_line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(fast, slow)| Some((*fast)? - (*slow)?))
        .collect();

    let signal_line = ema_of_defined(&macd_line, signal_period);

    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Default [`IndicatorEngine`]: Wilder RSI, EMA MACD and a volume SMA.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardIndicators;

impl IndicatorEngine for StandardIndicators {
    fn compute(&self, bars: &[Bar], windows: &IndicatorWindows) -> IndicatorSeries {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

        let macd_result = macd(&closes, windows.macd_fast, windows.macd_slow, windows.macd_signal);

        IndicatorSeries {
            rsi: rsi(&closes, windows.rsi),
            macd: macd_result.macd_line,
            macd_signal: macd_result.signal_line,
            volume_sma: sma(&volumes, windows.volume_sma),
        }
    }
}
