//! Concurrent ranking across categories

use crate::core::category::{CategoryResult, CategorySpec};
use crate::core::error::RankError;
use crate::core::fund::FundDataProvider;
use crate::core::matcher::FirstTokenKey;
use crate::core::pipeline::rank_category;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Fetches and ranks every category, concurrently and independently.
///
/// Within a category the two provider fetches run in parallel; across
/// categories the whole fetch-and-rank unit runs in parallel. A category
/// whose fetch or ranking fails yields a result carrying the error while
/// its siblings proceed untouched, so the map always has one entry per
/// requested category. `on_category_done` fires once per finished category.
pub async fn rank_all(
    categories: &[CategorySpec],
    primary: &(dyn FundDataProvider + Send + Sync),
    secondary: &(dyn FundDataProvider + Send + Sync),
    on_category_done: &(dyn Fn()),
) -> HashMap<String, CategoryResult> {
    let category_futures = categories.iter().map(|spec| async move {
        let query = spec.fetch_query();
        debug!("Fetching `{}` from both providers", spec.name);

        let (primary_records, secondary_records) = tokio::join!(
            primary.fetch_funds(query),
            secondary.fetch_funds(query)
        );

        let result = match (primary_records, secondary_records) {
            (Ok(primary_records), Ok(secondary_records)) => {
                match rank_category(primary_records, secondary_records, &FirstTokenKey, spec) {
                    Ok(funds) => CategoryResult {
                        category: spec.name.clone(),
                        funds,
                        error: None,
                    },
                    Err(e) => {
                        warn!("Ranking `{}` failed: {}", spec.name, e);
                        CategoryResult {
                            category: spec.name.clone(),
                            funds: Vec::new(),
                            error: Some(e),
                        }
                    }
                }
            }
            (Err(e), _) => {
                warn!("Primary fetch for `{}` failed: {e:#}", spec.name);
                CategoryResult {
                    category: spec.name.clone(),
                    funds: Vec::new(),
                    error: Some(RankError::provider_unavailable(
                        primary.name(),
                        format!("{e:#}"),
                    )),
                }
            }
            (_, Err(e)) => {
                warn!("Secondary fetch for `{}` failed: {e:#}", spec.name);
                CategoryResult {
                    category: spec.name.clone(),
                    funds: Vec::new(),
                    error: Some(RankError::provider_unavailable(
                        secondary.name(),
                        format!("{e:#}"),
                    )),
                }
            }
        };

        on_category_done();
        (spec.name.clone(), result)
    });

    join_all(category_futures).await.into_iter().collect()
}
