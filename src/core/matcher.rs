//! Cross-provider fund matching and record merging

use crate::core::fund::{MergedFund, Metric, RawFund};
use std::collections::HashMap;
use tracing::debug;

/// Derives the key used to pair records describing the same fund across
/// providers. Implementations must be deterministic.
pub trait MatchKeyStrategy: Send + Sync {
    /// The match key for a fund name, or `None` when the name yields no
    /// usable key.
    fn match_key(&self, name: &str) -> Option<String>;
}

/// Matches on the leading name token: everything before the first space,
/// or the whole name when there is none. Comparison is case-sensitive.
///
/// Known limitation: two fund houses sharing a leading word collide, and
/// punctuation or casing differences between providers break the pairing.
/// Swap the strategy rather than patching around it here.
pub struct FirstTokenKey;

impl MatchKeyStrategy for FirstTokenKey {
    fn match_key(&self, name: &str) -> Option<String> {
        let token = match name.find(' ') {
            Some(pos) => &name[..pos],
            None => name,
        };
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }
}

/// Merges two provider result sets into one list of matched funds.
///
/// The secondary list is indexed by match key (first occurrence wins);
/// primary funds are walked in order and paired against that index. A
/// primary fund with no counterpart is dropped, not errored. Metric
/// conflicts resolve in favor of the primary record; the secondary only
/// fills gaps. Rolling-return observations from both records are combined
/// into `AvgRollingReturn` (arithmetic mean) and `RollingConsistency` (the
/// share of observations above `rolling_threshold` percent, one decimal).
pub fn merge_sources(
    primary: Vec<RawFund>,
    secondary: Vec<RawFund>,
    strategy: &dyn MatchKeyStrategy,
    rolling_threshold: f64,
) -> Vec<MergedFund> {
    let mut by_key: HashMap<String, RawFund> = HashMap::new();
    for fund in secondary {
        if let Some(key) = strategy.match_key(&fund.name) {
            by_key.entry(key).or_insert(fund);
        }
    }

    let mut merged = Vec::new();
    for fund in primary {
        let Some(key) = strategy.match_key(&fund.name) else {
            debug!("Dropping fund with unusable name: {:?}", fund.name);
            continue;
        };
        let Some(counterpart) = by_key.get(&key) else {
            debug!("No counterpart for `{}` (key `{}`)", fund.name, key);
            continue;
        };

        let RawFund {
            name,
            mut metrics,
            rolling,
        } = fund;

        for (metric, value) in &counterpart.metrics {
            metrics.entry(*metric).or_insert(*value);
        }

        let observations: Vec<f64> = rolling
            .iter()
            .chain(counterpart.rolling.iter())
            .map(|obs| obs.value)
            .collect();
        if !observations.is_empty() {
            let mean = observations.iter().sum::<f64>() / observations.len() as f64;
            metrics.entry(Metric::AvgRollingReturn).or_insert(mean);

            let above = observations
                .iter()
                .filter(|value| **value > rolling_threshold)
                .count();
            let share = (above as f64 / observations.len() as f64) * 100.0;
            metrics
                .entry(Metric::RollingConsistency)
                .or_insert((share * 10.0).round() / 10.0);
        }

        merged.push(MergedFund {
            name,
            match_key: key,
            metrics,
            weighted_score: None,
            rank: None,
        });
    }

    merged
}
