use analysis_core::{
    AnalysisConfig, AnalysisError, Bar, BarInterval, IndicatorEngine, LookbackPeriod,
    MarketDataProvider, OptionsSuggestion, PriceTargetPolicy, SignalResult, TickerOutcome,
};
use std::sync::Arc;
use std::time::Duration;

use crate::decision::{decide, Decision};
use crate::indicators::StandardIndicators;
use crate::options::suggest_options;
use crate::target::price_target;

/// Computes a rule-based outlook for one ticker at a time.
///
/// Holds no mutable state; every call fetches its own bars and option chain
/// through the provider and returns a fresh [`TickerOutcome`].
///
/// With a fetch timeout set, each provider call gets its own deadline. A bar
/// fetch that overruns fails the ticker; a chain fetch that overruns only
/// degrades the options fields.
pub struct SignalAnalyzer {
    provider: Arc<dyn MarketDataProvider>,
    indicators: Arc<dyn IndicatorEngine>,
    price_targets: PriceTargetPolicy,
    fetch_timeout: Option<Duration>,
}

impl SignalAnalyzer {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            indicators: Arc::new(StandardIndicators),
            price_targets: PriceTargetPolicy::default(),
            fetch_timeout: None,
        }
    }

    /// Replace the indicator implementation.
    pub fn with_indicators(mut self, indicators: Arc<dyn IndicatorEngine>) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn with_price_targets(mut self, policy: PriceTargetPolicy) -> Self {
        self.price_targets = policy;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout
    }

    pub fn provider(&self) -> &Arc<dyn MarketDataProvider> {
        &self.provider
    }

    pub fn indicators(&self) -> &dyn IndicatorEngine {
        self.indicators.as_ref()
    }

    /// Analyze `ticker` over `period`. The interval defaults from the period.
    pub async fn analyze(
        &self,
        ticker: &str,
        period: LookbackPeriod,
        interval: Option<BarInterval>,
    ) -> TickerOutcome {
        self.analyze_config(&AnalysisConfig::new(ticker, period, interval)).await
    }

    pub async fn analyze_config(&self, config: &AnalysisConfig) -> TickerOutcome {
        match self.try_analyze(config).await {
            Ok(result) => {
                tracing::info!(
                    ticker = %result.ticker,
                    outlook = %result.outlook,
                    rsi = result.rsi,
                    "Signal computed"
                );
                TickerOutcome::Signal(result)
            }
            Err(e) => {
                tracing::warn!(ticker = %config.ticker, error = %e, "Analysis failed");
                TickerOutcome::error(config.ticker.clone(), e)
            }
        }
    }

    async fn try_analyze(&self, config: &AnalysisConfig) -> Result<SignalResult, AnalysisError> {
        let raw = self
            .bounded(self.provider.get_bars(&config.ticker, config.period, config.interval))
            .await?;
        if raw.is_empty() {
            return Err(AnalysisError::NoData);
        }

        let fetched = raw.len();
        let bars: Vec<Bar> = raw.into_iter().filter(Bar::is_complete).collect();
        tracing::debug!(
            ticker = %config.ticker,
            period = %config.period,
            interval = %config.interval,
            fetched,
            kept = bars.len(),
            "Bars loaded"
        );

        let windows = config.interval.windows();
        let series = self.indicators.compute(&bars, &windows);
        let decision = decide(&bars, &series)?;

        let options = self.options_for(&config.ticker, &decision).await;
        let target = price_target(decision.latest.bar.close, decision.outlook, &self.price_targets)?;

        let Decision { latest, facts, outlook } = decision;
        Ok(SignalResult {
            ticker: config.ticker.clone(),
            price_trend: facts.price_trend,
            volume_trend: facts.volume_trend,
            rsi: facts.rsi,
            macd: latest.indicators.macd,
            macd_signal: latest.indicators.macd_signal,
            macd_crossover: facts.macd_crossover,
            close: latest.bar.close,
            outlook,
            options_strategy: options.strategy,
            example_option: options.example,
            indicator_profile: config.interval.profile(),
            price_target: target.label,
            target_price: target.value,
            as_of: latest.bar.timestamp,
        })
    }

    /// Best-effort options enrichment. Never fails the analysis.
    async fn options_for(&self, ticker: &str, decision: &Decision) -> OptionsSuggestion {
        if !decision.outlook.is_up() && !decision.outlook.is_down() {
            return OptionsSuggestion::none();
        }

        let as_of = decision.latest.bar.timestamp.date_naive();
        let suggestion = self
            .bounded(self.provider.get_option_chain(ticker))
            .await
            .and_then(|chain| suggest_options(decision.outlook, decision.latest.bar.close, &chain, as_of));

        suggestion.unwrap_or_else(|e| {
            if e.is_recoverable() {
                tracing::debug!(ticker, error = %e, "No option contract to suggest");
            } else {
                tracing::warn!(ticker, error = %e, "Options enrichment skipped");
            }
            OptionsSuggestion::unavailable()
        })
    }

    /// Applies the fetch timeout, if any, to one provider call.
    async fn bounded<T, F>(&self, fetch: F) -> Result<T, AnalysisError>
    where
        F: std::future::Future<Output = Result<T, AnalysisError>>,
    {
        match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| AnalysisError::Timeout(limit))?,
            None => fetch.await,
        }
    }
}
