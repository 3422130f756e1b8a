//! Fund records and data provider abstractions

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Sort order used when ranking a metric. `Ascending` puts the smallest
/// value at rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Normalized metric labels shared by all providers. Provider-native field
/// names are mapped onto these during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Metric {
    Aum,
    ExpenseRatio,
    Return1y,
    Return3y,
    Return5y,
    SortinoRatio,
    ExitLoad,
    TrackingError,
    AvgRollingReturn,
    RollingConsistency,
}

impl Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Metric::Aum => "aum",
                Metric::ExpenseRatio => "expense-ratio",
                Metric::Return1y => "return-1y",
                Metric::Return3y => "return-3y",
                Metric::Return5y => "return-5y",
                Metric::SortinoRatio => "sortino",
                Metric::ExitLoad => "exit-load",
                Metric::TrackingError => "tracking-error",
                Metric::AvgRollingReturn => "avg-rolling-return",
                Metric::RollingConsistency => "rolling-consistency",
            }
        )
    }
}

impl Metric {
    /// The order in which a metric is ranked. Cost-like metrics rank low
    /// values first; everything else rewards high values.
    pub fn direction(&self) -> Direction {
        match self {
            Metric::ExpenseRatio | Metric::ExitLoad | Metric::TrackingError => Direction::Ascending,
            _ => Direction::Descending,
        }
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aum" => Ok(Metric::Aum),
            "expense-ratio" => Ok(Metric::ExpenseRatio),
            "return-1y" => Ok(Metric::Return1y),
            "return-3y" => Ok(Metric::Return3y),
            "return-5y" => Ok(Metric::Return5y),
            "sortino" => Ok(Metric::SortinoRatio),
            "exit-load" => Ok(Metric::ExitLoad),
            "tracking-error" => Ok(Metric::TrackingError),
            "avg-rolling-return" => Ok(Metric::AvgRollingReturn),
            "rolling-consistency" => Ok(Metric::RollingConsistency),
            _ => Err(anyhow::anyhow!("Unknown metric: {}", s)),
        }
    }
}

/// One dated rolling-return observation, in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingObservation {
    pub date: NaiveDate,
    pub value: f64,
}

/// A fund record as normalized from a single provider. Metrics a provider
/// did not report are absent from the map, never zeroed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFund {
    pub name: String,
    #[serde(default)]
    pub metrics: BTreeMap<Metric, f64>,
    #[serde(default)]
    pub rolling: Vec<RollingObservation>,
}

/// A fund matched across providers, carrying the union of their metrics.
/// `weighted_score` and `rank` stay `None` until scoring.
#[derive(Debug, Clone)]
pub struct MergedFund {
    pub name: String,
    pub match_key: String,
    pub metrics: BTreeMap<Metric, f64>,
    pub weighted_score: Option<f64>,
    pub rank: Option<u32>,
}

/// Relative importance of each metric in the composite score. Weights are
/// not normalized; only their relative magnitudes matter.
pub type WeightSpec = BTreeMap<Metric, f64>;

#[async_trait]
pub trait FundDataProvider: Send + Sync {
    /// Short identifier used in logs and error reports.
    fn name(&self) -> &str;

    /// Fetches and normalizes all fund records for a category query.
    async fn fetch_funds(&self, category: &str) -> Result<Vec<RawFund>>;
}
