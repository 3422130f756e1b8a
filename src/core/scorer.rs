//! Composite scoring over per-metric rank tables

use crate::core::error::RankError;
use crate::core::fund::{MergedFund, Metric, WeightSpec};
use crate::core::ranker::RankTable;
use std::collections::BTreeMap;

/// Combines per-metric ranks into one weighted score and a final ranking.
///
/// The score is the weight-multiplied sum of a fund's ranks, rounded to two
/// decimal places; lower is better. Funds are then stable-sorted by score,
/// so ties keep their pre-sort order, and the final rank is the position in
/// that order. Every weighted metric must have a rank entry for every fund;
/// a hole fails the whole call instead of being scored as zero.
pub fn apply_weights(
    mut funds: Vec<MergedFund>,
    tables: &BTreeMap<Metric, RankTable>,
    weights: &WeightSpec,
) -> Result<Vec<MergedFund>, RankError> {
    for fund in &mut funds {
        let mut score = 0.0;
        for (metric, weight) in weights {
            let rank = tables
                .get(metric)
                .and_then(|table| table.get(&fund.name))
                .ok_or_else(|| RankError::missing_metric(&fund.name, *metric))?;
            score += weight * f64::from(*rank);
        }
        fund.weighted_score = Some((score * 100.0).round() / 100.0);
    }

    funds.sort_by(|a, b| {
        let a_score = a.weighted_score.unwrap_or(f64::INFINITY);
        let b_score = b.weighted_score.unwrap_or(f64::INFINITY);
        a_score.total_cmp(&b_score)
    });

    for (position, fund) in funds.iter_mut().enumerate() {
        fund.rank = Some(position as u32 + 1);
    }

    Ok(funds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fund::Direction;
    use crate::core::ranker::{TieMode, rank_by_metric};

    fn fund(name: &str, metrics: &[(Metric, f64)]) -> MergedFund {
        MergedFund {
            name: name.to_string(),
            match_key: name.to_string(),
            metrics: metrics.iter().copied().collect(),
            weighted_score: None,
            rank: None,
        }
    }

    fn rank_tables(
        funds: &[MergedFund],
        weights: &WeightSpec,
        mode: TieMode,
    ) -> BTreeMap<Metric, RankTable> {
        weights
            .keys()
            .map(|metric| {
                let table = rank_by_metric(funds, *metric, metric.direction(), mode).unwrap();
                (*metric, table)
            })
            .collect()
    }

    #[test]
    fn test_weighted_scores_and_final_ranking() {
        // Three funds, two metrics, equal weights. Expense ratios rank
        // {C: 1, A: 2, B: 2} and rolling averages {B: 1, A: 2, C: 3}, so
        // the scores come out A=2.0, B=1.5, C=2.0 and B wins overall.
        let funds = vec![
            fund(
                "A",
                &[(Metric::ExpenseRatio, 1.0), (Metric::AvgRollingReturn, 10.0)],
            ),
            fund(
                "B",
                &[(Metric::ExpenseRatio, 1.0), (Metric::AvgRollingReturn, 12.0)],
            ),
            fund(
                "C",
                &[(Metric::ExpenseRatio, 0.5), (Metric::AvgRollingReturn, 8.0)],
            ),
        ];
        let weights: WeightSpec = [
            (Metric::ExpenseRatio, 0.5),
            (Metric::AvgRollingReturn, 0.5),
        ]
        .into_iter()
        .collect();
        let tables = rank_tables(&funds, &weights, TieMode::Shared);

        let ranked = apply_weights(funds, &tables, &weights).unwrap();

        assert_eq!(ranked[0].name, "B");
        assert_eq!(ranked[0].weighted_score, Some(1.5));
        assert_eq!(ranked[0].rank, Some(1));

        // A and C tie at 2.0; A entered first and stays first.
        assert_eq!(ranked[1].name, "A");
        assert_eq!(ranked[1].weighted_score, Some(2.0));
        assert_eq!(ranked[1].rank, Some(2));

        assert_eq!(ranked[2].name, "C");
        assert_eq!(ranked[2].weighted_score, Some(2.0));
        assert_eq!(ranked[2].rank, Some(3));
    }

    #[test]
    fn test_scores_round_to_two_decimals() {
        let funds = vec![
            fund("A", &[(Metric::Return3y, 15.0)]),
            fund("B", &[(Metric::Return3y, 12.0)]),
            fund("C", &[(Metric::Return3y, 10.0)]),
        ];
        let weights: WeightSpec = [(Metric::Return3y, 0.333)].into_iter().collect();
        let tables = rank_tables(&funds, &weights, TieMode::Positional);

        let ranked = apply_weights(funds, &tables, &weights).unwrap();

        // 0.333 * rank, rounded: 0.33, 0.67, 1.0.
        assert_eq!(ranked[0].weighted_score, Some(0.33));
        assert_eq!(ranked[1].weighted_score, Some(0.67));
        assert_eq!(ranked[2].weighted_score, Some(1.0));
    }

    #[test]
    fn test_scoring_is_deterministic_across_runs() {
        let funds = vec![
            fund(
                "Axis Bluechip Fund",
                &[(Metric::ExpenseRatio, 0.62), (Metric::Return5y, 13.1)],
            ),
            fund(
                "HDFC Top 100 Fund",
                &[(Metric::ExpenseRatio, 1.05), (Metric::Return5y, 14.9)],
            ),
            fund(
                "ICICI Bluechip Fund",
                &[(Metric::ExpenseRatio, 0.89), (Metric::Return5y, 14.9)],
            ),
        ];
        let weights: WeightSpec = [(Metric::ExpenseRatio, 0.4), (Metric::Return5y, 0.6)]
            .into_iter()
            .collect();
        let tables = rank_tables(&funds, &weights, TieMode::Shared);

        let first = apply_weights(funds.clone(), &tables, &weights).unwrap();
        let second = apply_weights(funds, &tables, &weights).unwrap();

        let flatten = |ranked: &[MergedFund]| {
            ranked
                .iter()
                .map(|f| (f.name.clone(), f.weighted_score, f.rank))
                .collect::<Vec<_>>()
        };
        assert_eq!(flatten(&first), flatten(&second));
    }

    #[test]
    fn test_missing_rank_entry_fails_instead_of_defaulting() {
        let funds = vec![
            fund("A", &[(Metric::ExpenseRatio, 0.5)]),
            fund("B", &[]),
        ];
        let weights: WeightSpec = [(Metric::ExpenseRatio, 1.0)].into_iter().collect();
        // B carries no expense ratio, so the table has no entry for it.
        let tables = rank_tables(&funds, &weights, TieMode::Shared);

        let err = apply_weights(funds, &tables, &weights).unwrap_err();

        assert_eq!(err, RankError::missing_metric("B", Metric::ExpenseRatio));
    }
}
