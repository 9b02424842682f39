use analysis_core::{ErrorResult, LookbackPeriod, Outlook, SignalResult, TickerOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Presentation bucket for a computed outlook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalGroup {
    Buy,
    Sell,
    Neutral,
}

impl SignalGroup {
    /// "Buy"/"Oversold" outlooks are buys, "Sell"/"Overbought" are sells.
    pub fn of(outlook: Outlook) -> Self {
        match outlook {
            Outlook::StrongBuy | Outlook::Oversold => SignalGroup::Buy,
            Outlook::Sell | Outlook::Overbought => SignalGroup::Sell,
            Outlook::Neutral => SignalGroup::Neutral,
        }
    }
}

/// Scan results partitioned for display. Every list keeps input ticker order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub period: LookbackPeriod,
    pub generated_at: DateTime<Utc>,
    pub signals: Vec<SignalResult>,
    pub buy: Vec<SignalResult>,
    pub sell: Vec<SignalResult>,
    pub neutral: Vec<SignalResult>,
    pub errors: Vec<ErrorResult>,
}

impl ScanReport {
    pub fn from_outcomes(period: LookbackPeriod, outcomes: Vec<TickerOutcome>) -> Self {
        let mut report = ScanReport {
            period,
            generated_at: Utc::now(),
            signals: Vec::new(),
            buy: Vec::new(),
            sell: Vec::new(),
            neutral: Vec::new(),
            errors: Vec::new(),
        };

        for outcome in outcomes {
            match outcome {
                TickerOutcome::Signal(signal) => {
                    match SignalGroup::of(signal.outlook) {
                        SignalGroup::Buy => report.buy.push(signal.clone()),
                        SignalGroup::Sell => report.sell.push(signal.clone()),
                        SignalGroup::Neutral => report.neutral.push(signal.clone()),
                    }
                    report.signals.push(signal);
                }
                TickerOutcome::Error(error) => report.errors.push(error),
            }
        }

        report
    }

    pub fn total(&self) -> usize {
        self.signals.len() + self.errors.len()
    }
}
