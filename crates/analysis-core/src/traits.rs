use async_trait::async_trait;
use crate::{AnalysisError, Bar, BarInterval, IndicatorSeries, IndicatorWindows, LookbackPeriod, OptionChain};

/// Source of price bars and option chains.
///
/// `get_bars` returns an empty vector when the ticker has no data; errors are
/// reserved for transport or API failures. `get_option_chain` fails with
/// [`AnalysisError::OptionsUnavailable`] when no chain exists.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn get_bars(
        &self,
        ticker: &str,
        period: LookbackPeriod,
        interval: BarInterval,
    ) -> Result<Vec<Bar>, AnalysisError>;

    async fn get_option_chain(&self, ticker: &str) -> Result<OptionChain, AnalysisError>;
}

/// Pure indicator computation over a bar series.
pub trait IndicatorEngine: Send + Sync {
    /// Returns a series aligned index-for-index with `bars`.
    fn compute(&self, bars: &[Bar], windows: &IndicatorWindows) -> IndicatorSeries;
}
