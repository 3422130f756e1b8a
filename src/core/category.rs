//! Category specifications and per-category results

use crate::core::error::RankError;
use crate::core::fund::{MergedFund, WeightSpec};
use crate::core::ranker::TieMode;
use serde::{Deserialize, Serialize};

/// Broad fund bucket a category belongs to. The family fixes the tie mode
/// and the rolling-consistency bar so individual categories cannot pair
/// them inconsistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FundFamily {
    Equity,
    EquitySaver,
    Debt,
    Arbitrage,
}

impl FundFamily {
    pub fn tie_mode(&self) -> TieMode {
        match self {
            FundFamily::Equity | FundFamily::EquitySaver => TieMode::Shared,
            FundFamily::Debt | FundFamily::Arbitrage => TieMode::Positional,
        }
    }

    /// Annualized return (percent) a rolling observation must beat to count
    /// toward the consistency metric.
    pub fn rolling_threshold(&self) -> f64 {
        match self {
            FundFamily::Equity => 15.0,
            FundFamily::EquitySaver => 12.0,
            FundFamily::Debt => 8.0,
            FundFamily::Arbitrage => 6.0,
        }
    }
}

/// One category to fetch and rank.
#[derive(Debug, Clone)]
pub struct CategorySpec {
    /// Display name, also the key in the result map.
    pub name: String,
    /// Provider query when it differs from the display name.
    pub query: Option<String>,
    pub family: FundFamily,
    pub weights: WeightSpec,
}

impl CategorySpec {
    /// The identifier sent to providers.
    pub fn fetch_query(&self) -> &str {
        self.query.as_deref().unwrap_or(&self.name)
    }
}

/// Outcome for one category: a ranked fund list, or the error that stopped
/// it. Failures here never affect sibling categories.
#[derive(Debug, Clone)]
pub struct CategoryResult {
    pub category: String,
    pub funds: Vec<MergedFund>,
    pub error: Option<RankError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_fixes_tie_mode() {
        assert_eq!(FundFamily::Equity.tie_mode(), TieMode::Shared);
        assert_eq!(FundFamily::EquitySaver.tie_mode(), TieMode::Shared);
        assert_eq!(FundFamily::Debt.tie_mode(), TieMode::Positional);
        assert_eq!(FundFamily::Arbitrage.tie_mode(), TieMode::Positional);
    }

    #[test]
    fn test_rolling_threshold_tracks_return_scale() {
        assert_eq!(FundFamily::Equity.rolling_threshold(), 15.0);
        assert_eq!(FundFamily::EquitySaver.rolling_threshold(), 12.0);
        assert_eq!(FundFamily::Debt.rolling_threshold(), 8.0);
        assert_eq!(FundFamily::Arbitrage.rolling_threshold(), 6.0);
    }

    #[test]
    fn test_fetch_query_prefers_the_override() {
        let spec = CategorySpec {
            name: "Large Cap".to_string(),
            query: Some("large-cap-fund".to_string()),
            family: FundFamily::Equity,
            weights: WeightSpec::new(),
        };
        assert_eq!(spec.fetch_query(), "large-cap-fund");

        let spec = CategorySpec {
            query: None,
            ..spec
        };
        assert_eq!(spec.fetch_query(), "Large Cap");
    }

    #[test]
    fn test_family_labels_deserialize_from_kebab_case() {
        let family: FundFamily = serde_yaml::from_str("equity-saver").unwrap();
        assert_eq!(family, FundFamily::EquitySaver);
        let family: FundFamily = serde_yaml::from_str("arbitrage").unwrap();
        assert_eq!(family, FundFamily::Arbitrage);
    }
}
