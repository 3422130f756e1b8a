//! Pure per-category ranking pipeline

use crate::core::category::CategorySpec;
use crate::core::error::RankError;
use crate::core::fund::{MergedFund, Metric, RawFund};
use crate::core::matcher::{MatchKeyStrategy, merge_sources};
use crate::core::ranker::{RankTable, rank_by_metric};
use crate::core::scorer::apply_weights;
use std::collections::BTreeMap;
use tracing::debug;

/// Ranks one category from two providers' raw records.
///
/// Match, then retain only funds carrying every weighted metric, build one
/// rank table per weighted metric (canonical direction, the family's tie
/// mode) and score. No I/O; given the same inputs the output is identical,
/// whatever order the records arrived in.
pub fn rank_category(
    primary: Vec<RawFund>,
    secondary: Vec<RawFund>,
    strategy: &dyn MatchKeyStrategy,
    spec: &CategorySpec,
) -> Result<Vec<MergedFund>, RankError> {
    let merged = merge_sources(
        primary,
        secondary,
        strategy,
        spec.family.rolling_threshold(),
    );

    // A fund missing any weighted metric cannot be scored; drop it before
    // ranking so every table covers the same fund set.
    let rankable: Vec<MergedFund> = merged
        .into_iter()
        .filter(|fund| {
            match spec
                .weights
                .keys()
                .find(|metric| !fund.metrics.contains_key(metric))
            {
                Some(metric) => {
                    debug!(
                        "Excluding `{}` from `{}`: no {} reported",
                        fund.name, spec.name, metric
                    );
                    false
                }
                None => true,
            }
        })
        .collect();

    if rankable.is_empty() {
        return Err(RankError::insufficient_data(format!(
            "no fund in `{}` matched across providers with all weighted metrics",
            spec.name
        )));
    }

    let mut tables: BTreeMap<Metric, RankTable> = BTreeMap::new();
    for metric in spec.weights.keys() {
        let table = rank_by_metric(
            &rankable,
            *metric,
            metric.direction(),
            spec.family.tie_mode(),
        )?;
        tables.insert(*metric, table);
    }

    apply_weights(rankable, &tables, &spec.weights)
}
