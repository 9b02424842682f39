use analysis_core::{AnalysisError, Outlook, PriceTargetPolicy};
use rust_decimal::prelude::*;

/// Placeholder rendered when no target applies.
pub const NO_TARGET: &str = "-";

/// A projected price and its rendered label.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTarget {
    pub value: Option<Decimal>,
    pub label: String,
}

/// Projects a naive price target from the close.
///
/// This is a fixed-percentage rule of thumb from [`PriceTargetPolicy`], not a
/// forecast. UP outlooks scale the close up, DOWN outlooks scale it down and
/// neutral outlooks get no target. Values are rounded half away from zero to
/// cents.
pub fn price_target(
    close: f64,
    outlook: Outlook,
    policy: &PriceTargetPolicy,
) -> Result<PriceTarget, AnalysisError> {
    let multiplier = if outlook.is_up() {
        policy.up_multiplier()
    } else if outlook.is_down() {
        policy.down_multiplier()
    } else {
        return Ok(PriceTarget { value: None, label: NO_TARGET.to_string() });
    };

    let close = Decimal::from_f64(close)
        .ok_or_else(|| AnalysisError::InvalidComparison(format!("close {} is not a price", close)))?;
    let value = close
        .checked_mul(multiplier)
        .ok_or_else(|| AnalysisError::InvalidComparison(format!("target for close {} overflows", close)))?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Ok(PriceTarget {
        value: Some(value),
        label: format!("${:.2} (in {})", value, policy.horizon_label),
    })
}
