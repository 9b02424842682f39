use analysis_core::{AnalysisError, OptionChain, OptionContract, OptionsSuggestion, Outlook};
use chrono::NaiveDate;

pub const BULLISH_STRATEGY: &str = "Buy Call or Bull Call Spread";
pub const BEARISH_STRATEGY: &str = "Buy Put or Bear Put Spread";

/// Contracts expiring on `expiry`, sorted by strike. Provider ordering is not trusted.
fn strikes_for(contracts: &[OptionContract], expiry: NaiveDate) -> Vec<f64> {
    let mut strikes: Vec<f64> = contracts
        .iter()
        .filter(|c| c.expiration == expiry && c.strike.is_finite())
        .map(|c| c.strike)
        .collect();
    strikes.sort_by(|a, b| a.total_cmp(b));
    strikes
}

/// Picks an example contract from the nearest expiration for a directional outlook.
///
/// UP outlooks take the lowest call strike at or above `close`; DOWN outlooks
/// take the highest put strike at or below `close`. Neutral outlooks get the
/// placeholder suggestion. Lookup failures return `OptionsUnavailable`.
/// Strikes keep at least one decimal place, as in `Buy $110.0 Call`.
pub fn suggest_options(
    outlook: Outlook,
    close: f64,
    chain: &OptionChain,
    as_of: NaiveDate,
) -> Result<OptionsSuggestion, AnalysisError> {
    if !outlook.is_up() && !outlook.is_down() {
        return Ok(OptionsSuggestion::none());
    }

    let expiry = chain.nearest_expiration(as_of).ok_or_else(|| {
        AnalysisError::OptionsUnavailable(format!("no expiration on or after {}", as_of))
    })?;
    let expiry_str = expiry.format("%Y-%m-%d");

    if outlook.is_up() {
        let strike = strikes_for(&chain.calls, expiry)
            .into_iter()
            .find(|s| *s >= close)
            .ok_or_else(|| {
                AnalysisError::OptionsUnavailable(format!("no call strike at or above {:.2}", close))
            })?;
        Ok(OptionsSuggestion {
            strategy: BULLISH_STRATEGY.to_string(),
            example: format!("Buy ${:?} Call expiring {}", strike, expiry_str),
        })
    } else {
        let strike = strikes_for(&chain.puts, expiry)
            .into_iter()
            .rev()
            .find(|s| *s <= close)
            .ok_or_else(|| {
                AnalysisError::OptionsUnavailable(format!("no put strike at or below {:.2}", close))
            })?;
        Ok(OptionsSuggestion {
            strategy: BEARISH_STRATEGY.to_string(),
            example: format!("Buy ${:?} Put expiring {}", strike, expiry_str),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn contracts(strikes: &[f64], expiry: &str) -> Vec<OptionContract> {
        strikes
            .iter()
            .map(|&strike| OptionContract { strike, expiration: date(expiry), symbol: None })
            .collect()
    }

    fn chain() -> OptionChain {
        let mut calls = contracts(&[115.0, 105.0, 110.0, 100.0], "2024-03-08");
        calls.extend(contracts(&[108.0], "2024-03-15"));
        let mut puts = contracts(&[95.0, 107.5, 100.0, 112.5], "2024-03-08");
        puts.extend(contracts(&[109.0], "2024-03-15"));
        OptionChain {
            expirations: vec![date("2024-03-15"), date("2024-03-08"), date("2024-03-01")],
            calls,
            puts,
        }
    }

    #[test]
    fn test_nearest_call_at_or_above_close() {
        let s = suggest_options(Outlook::StrongBuy, 108.2, &chain(), date("2024-03-04")).unwrap();
        assert_eq!(s.strategy, BULLISH_STRATEGY);
        assert_eq!(s.example, "Buy $110.0 Call expiring 2024-03-08");
    }

    #[test]
    fn test_call_strike_equal_to_close() {
        let s = suggest_options(Outlook::Oversold, 105.0, &chain(), date("2024-03-04")).unwrap();
        assert_eq!(s.example, "Buy $105.0 Call expiring 2024-03-08");
    }

    #[test]
    fn test_nearest_put_at_or_below_close() {
        let s = suggest_options(Outlook::Sell, 108.2, &chain(), date("2024-03-04")).unwrap();
        assert_eq!(s.strategy, BEARISH_STRATEGY);
        assert_eq!(s.example, "Buy $107.5 Put expiring 2024-03-08");
    }

    #[test]
    fn test_neutral_gets_placeholders() {
        let s = suggest_options(Outlook::Neutral, 108.2, &chain(), date("2024-03-04")).unwrap();
        assert_eq!(s, OptionsSuggestion::none());
    }

    #[test]
    fn test_no_matching_strike() {
        let err = suggest_options(Outlook::StrongBuy, 500.0, &chain(), date("2024-03-04")).unwrap_err();
        assert!(err.is_recoverable());
        let err = suggest_options(Outlook::Overbought, 1.0, &chain(), date("2024-03-04")).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_no_upcoming_expiration() {
        let err = suggest_options(Outlook::StrongBuy, 100.0, &chain(), date("2025-01-01")).unwrap_err();
        assert!(matches!(err, AnalysisError::OptionsUnavailable(_)));
    }
}
