use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Fixed-percentage price target heuristic.
///
/// This is a placeholder rule of thumb, not a model: an UP outlook projects the
/// close up by `upside`, a DOWN outlook down by `downside`, both labelled with a
/// static horizon. It carries no statistical guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTargetPolicy {
    pub upside: Decimal,
    pub downside: Decimal,
    pub horizon_label: String,
}

impl Default for PriceTargetPolicy {
    fn default() -> Self {
        Self {
            upside: dec!(0.05),
            downside: dec!(0.05),
            horizon_label: "~7 days".to_string(),
        }
    }
}

impl PriceTargetPolicy {
    /// Reads `PRICE_TARGET_UPSIDE`, `PRICE_TARGET_DOWNSIDE` and
    /// `PRICE_TARGET_HORIZON`, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let pct = |key: &str, fallback: Decimal| {
            std::env::var(key)
                .ok()
                .and_then(|v| Decimal::from_str(v.trim()).ok())
                .filter(|d| !d.is_sign_negative())
                .unwrap_or(fallback)
        };

        Self {
            upside: pct("PRICE_TARGET_UPSIDE", defaults.upside),
            downside: pct("PRICE_TARGET_DOWNSIDE", defaults.downside),
            horizon_label: std::env::var("PRICE_TARGET_HORIZON")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.horizon_label),
        }
    }

    pub fn up_multiplier(&self) -> Decimal {
        Decimal::ONE + self.upside
    }

    pub fn down_multiplier(&self) -> Decimal {
        Decimal::ONE - self.downside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_multipliers() {
        let policy = PriceTargetPolicy::default();
        assert_eq!(policy.up_multiplier(), dec!(1.05));
        assert_eq!(policy.down_multiplier(), dec!(0.95));
        assert_eq!(policy.horizon_label, "~7 days");
    }
}
