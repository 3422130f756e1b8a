//! Ranking error taxonomy

use crate::core::fund::Metric;
use thiserror::Error;

/// Failures the ranking engine distinguishes. An unmatched fund is not an
/// error; it is silently excluded by the matcher.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    /// A provider fetch failed. Recovered per category; siblings continue.
    #[error("provider `{provider}` unavailable: {message}")]
    ProviderUnavailable { provider: String, message: String },

    /// Ranking was attempted with no rankable funds.
    #[error("insufficient data: {context}")]
    InsufficientData { context: String },

    /// A fund reached scoring without a rank entry for a weighted metric.
    /// Indicates a defect upstream; the score is never defaulted.
    #[error("fund `{fund}` has no rank for metric `{metric}`")]
    MissingMetric { fund: String, metric: Metric },
}

impl RankError {
    pub fn provider_unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        RankError::ProviderUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn insufficient_data(context: impl Into<String>) -> Self {
        RankError::InsufficientData {
            context: context.into(),
        }
    }

    pub fn missing_metric(fund: impl Into<String>, metric: Metric) -> Self {
        RankError::MissingMetric {
            fund: fund.into(),
            metric,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_subject() {
        let err = RankError::provider_unavailable("moneycontrol", "connection refused");
        assert_eq!(
            err.to_string(),
            "provider `moneycontrol` unavailable: connection refused"
        );

        let err = RankError::missing_metric("Axis Bluechip Fund", Metric::ExpenseRatio);
        assert_eq!(
            err.to_string(),
            "fund `Axis Bluechip Fund` has no rank for metric `expense-ratio`"
        );
    }
}
