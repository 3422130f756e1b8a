//! Per-metric rank tables

use crate::core::error::RankError;
use crate::core::fund::{Direction, MergedFund, Metric};
use std::collections::HashMap;

/// Fund name to rank for a single metric. Rank 1 is best.
pub type RankTable = HashMap<String, u32>;

/// How equal metric values are ranked.
///
/// `Shared` gives equal values the same rank and skips positions after a
/// tie, as in competition ranking (1, 2, 2, 4). `Positional` ignores ties
/// entirely; the rank is the sorted position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieMode {
    Shared,
    Positional,
}

/// Builds the rank table for one metric.
///
/// The sort is stable, so funds with equal values keep their input order.
/// Funds that do not carry the metric get no entry. An empty input list is
/// an error; a single fund is ranked 1.
pub fn rank_by_metric(
    funds: &[MergedFund],
    metric: Metric,
    direction: Direction,
    mode: TieMode,
) -> Result<RankTable, RankError> {
    if funds.is_empty() {
        return Err(RankError::insufficient_data(format!(
            "no funds to rank by `{metric}`"
        )));
    }

    let mut entries: Vec<(&str, f64)> = funds
        .iter()
        .filter_map(|fund| {
            fund.metrics
                .get(&metric)
                .map(|value| (fund.name.as_str(), *value))
        })
        .collect();

    match direction {
        Direction::Ascending => entries.sort_by(|a, b| a.1.total_cmp(&b.1)),
        Direction::Descending => entries.sort_by(|a, b| b.1.total_cmp(&a.1)),
    }

    let mut table = RankTable::new();
    let mut previous: Option<(f64, u32)> = None;

    for (position, (name, value)) in entries.iter().enumerate() {
        let positional = position as u32 + 1;
        let rank = match (mode, previous) {
            (TieMode::Shared, Some((prev_value, prev_rank))) if prev_value == *value => prev_rank,
            _ => positional,
        };
        previous = Some((*value, rank));
        table.insert((*name).to_string(), rank);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn fund(name: &str, metric: Metric, value: f64) -> MergedFund {
        let mut metrics = BTreeMap::new();
        metrics.insert(metric, value);
        MergedFund {
            name: name.to_string(),
            match_key: name.split(' ').next().unwrap_or(name).to_string(),
            metrics,
            weighted_score: None,
            rank: None,
        }
    }

    #[test]
    fn test_ascending_rank_rewards_small_values() {
        let funds = vec![
            fund("A", Metric::ExpenseRatio, 1.2),
            fund("B", Metric::ExpenseRatio, 0.4),
            fund("C", Metric::ExpenseRatio, 0.9),
        ];

        let table = rank_by_metric(
            &funds,
            Metric::ExpenseRatio,
            Direction::Ascending,
            TieMode::Shared,
        )
        .unwrap();

        assert_eq!(table["B"], 1);
        assert_eq!(table["C"], 2);
        assert_eq!(table["A"], 3);
    }

    #[test]
    fn test_descending_rank_rewards_large_values() {
        let funds = vec![
            fund("A", Metric::Return3y, 11.0),
            fund("B", Metric::Return3y, 18.5),
            fund("C", Metric::Return3y, 14.2),
        ];

        let table = rank_by_metric(
            &funds,
            Metric::Return3y,
            Direction::Descending,
            TieMode::Positional,
        )
        .unwrap();

        assert_eq!(table["B"], 1);
        assert_eq!(table["C"], 2);
        assert_eq!(table["A"], 3);
    }

    #[test]
    fn test_shared_mode_gives_ties_one_rank_and_skips_positions() {
        // Competition ranking: 1, 2, 2, 4
        let funds = vec![
            fund("A", Metric::ExpenseRatio, 0.5),
            fund("B", Metric::ExpenseRatio, 1.0),
            fund("C", Metric::ExpenseRatio, 1.0),
            fund("D", Metric::ExpenseRatio, 1.5),
        ];

        let table = rank_by_metric(
            &funds,
            Metric::ExpenseRatio,
            Direction::Ascending,
            TieMode::Shared,
        )
        .unwrap();

        assert_eq!(table["A"], 1);
        assert_eq!(table["B"], 2);
        assert_eq!(table["C"], 2);
        assert_eq!(table["D"], 4);
    }

    #[test]
    fn test_positional_mode_assigns_every_position() {
        let funds = vec![
            fund("A", Metric::Return1y, 7.0),
            fund("B", Metric::Return1y, 7.0),
            fund("C", Metric::Return1y, 7.0),
        ];

        let table = rank_by_metric(
            &funds,
            Metric::Return1y,
            Direction::Descending,
            TieMode::Positional,
        )
        .unwrap();

        // Equal values resolve by input order because the sort is stable.
        assert_eq!(table["A"], 1);
        assert_eq!(table["B"], 2);
        assert_eq!(table["C"], 3);
    }

    #[test]
    fn test_funds_without_the_metric_are_skipped() {
        let mut absent = fund("B", Metric::Return1y, 5.0);
        absent.metrics.clear();
        let funds = vec![fund("A", Metric::Return1y, 5.0), absent];

        let table = rank_by_metric(
            &funds,
            Metric::Return1y,
            Direction::Descending,
            TieMode::Shared,
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table["A"], 1);
        assert!(!table.contains_key("B"));
    }

    #[test]
    fn test_single_fund_is_ranked_first() {
        let funds = vec![fund("A", Metric::Aum, 25000.0)];

        let table =
            rank_by_metric(&funds, Metric::Aum, Direction::Descending, TieMode::Shared).unwrap();

        assert_eq!(table["A"], 1);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let result = rank_by_metric(
            &[],
            Metric::ExpenseRatio,
            Direction::Ascending,
            TieMode::Shared,
        );

        assert!(matches!(
            result,
            Err(RankError::InsufficientData { .. })
        ));
    }
}
