use std::time::Duration;
use thiserror::Error;

/// Failure taxonomy for a single ticker analysis.
///
/// The first three variants are fatal to the ticker being analyzed and surface
/// as an error row. `OptionsUnavailable` is always absorbed by the analyzer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("No data found.")]
    NoData,

    #[error("Not enough data after indicators.")]
    InsufficientData,

    #[error("Invalid comparison: {0}")]
    InvalidComparison(String),

    #[error("Options data unavailable: {0}")]
    OptionsUnavailable(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl AnalysisError {
    /// Whether this error only degrades optional enrichment.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AnalysisError::OptionsUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(AnalysisError::NoData.to_string(), "No data found.");
        assert_eq!(
            AnalysisError::InsufficientData.to_string(),
            "Not enough data after indicators."
        );
        assert_eq!(
            AnalysisError::InvalidComparison("rsi is NaN".into()).to_string(),
            "Invalid comparison: rsi is NaN"
        );
        assert_eq!(AnalysisError::Timeout(Duration::from_secs(30)).to_string(), "Timed out after 30s");
    }

    #[test]
    fn test_only_options_errors_are_recoverable() {
        assert!(AnalysisError::OptionsUnavailable("no chain".into()).is_recoverable());
        assert!(!AnalysisError::NoData.is_recoverable());
        assert!(!AnalysisError::ApiError("HTTP 500".into()).is_recoverable());
    }
}
