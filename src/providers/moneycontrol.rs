use crate::core::cache::{KeyValueCollection, Store};
use crate::core::fund::{FundDataProvider, Metric, RawFund};
use crate::providers::util::{category_slug, seconds_until, with_retry};
use crate::store::KeyValueStore;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct MoneycontrolProvider {
    base_url: String,
    cache: Arc<dyn KeyValueCollection>,
}

impl MoneycontrolProvider {
    pub fn new(base_url: &str, store: &KeyValueStore) -> Self {
        MoneycontrolProvider {
            base_url: base_url.to_string(),
            cache: store.collection("moneycontrol", true),
        }
    }

    #[cfg(test)]
    pub(crate) fn new_with_collection(base_url: &str, cache: Arc<dyn KeyValueCollection>) -> Self {
        Self {
            base_url: base_url.to_string(),
            cache,
        }
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

#[derive(Debug, Deserialize)]
struct ScreenerResponse {
    #[serde(default)]
    schemes: Vec<SchemeRecord>,
}

#[derive(Debug, Deserialize)]
struct SchemeRecord {
    scheme_name: Option<String>,
    aum_crore: Option<f64>,
    expense_ratio: Option<f64>,
    return_1y: Option<f64>,
    return_3y: Option<f64>,
    return_5y: Option<f64>,
    sortino_ratio: Option<f64>,
    exit_load: Option<f64>,
    tracking_error: Option<f64>,
}

impl SchemeRecord {
    /// Schemes without a usable name cannot be matched downstream and
    /// are dropped. Absent metric fields simply stay out of the map.
    fn into_raw_fund(self) -> Option<RawFund> {
        let name = self.scheme_name.as_deref().map(str::trim).unwrap_or("");
        if name.is_empty() {
            return None;
        }

        let mut metrics = BTreeMap::new();
        for (value, metric) in [
            (self.aum_crore, Metric::Aum),
            (self.expense_ratio, Metric::ExpenseRatio),
            (self.return_1y, Metric::Return1y),
            (self.return_3y, Metric::Return3y),
            (self.return_5y, Metric::Return5y),
            (self.sortino_ratio, Metric::SortinoRatio),
            (self.exit_load, Metric::ExitLoad),
            (self.tracking_error, Metric::TrackingError),
        ] {
            if let Some(value) = value {
                metrics.insert(metric, value);
            }
        }

        Some(RawFund {
            name: name.to_string(),
            metrics,
            rolling: Vec::new(),
        })
    }
}

#[async_trait]
impl FundDataProvider for MoneycontrolProvider {
    fn name(&self) -> &str {
        "moneycontrol"
    }

    async fn fetch_funds(&self, category: &str) -> Result<Vec<RawFund>> {
        let slug = category_slug(category);
        if let Some(cached) = self.cache.get(slug.as_bytes()).await {
            return Ok(serde_json::from_slice(&cached)?);
        }

        let url = format!("{}/screener/{}", self.base_url, slug);
        debug!("Requesting screener data from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("fundrank/1.0")
            .timeout(Duration::from_secs(30))
            .build()?;
        let response = with_retry(|| async { client.get(&url).send().await }, 3, 500)
            .await
            .with_context(|| format!("Failed to send request for category: {category}"))?;

        let response_text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for category: {category}"))?;

        // Check for empty or non-JSON responses before parsing
        if response_text.trim().is_empty() {
            return Err(anyhow!(
                "Received empty response for category: {}",
                category
            ));
        }

        let screener: ScreenerResponse =
            serde_json::from_str(&response_text).with_context(|| {
                format!(
                    "Failed to parse screener response for category: {category}. Response: '{response_text}'",
                )
            })?;

        let funds: Vec<RawFund> = screener
            .schemes
            .into_iter()
            .filter_map(SchemeRecord::into_raw_fund)
            .collect();

        debug!(
            "Fetched {} schemes for category {} from moneycontrol",
            funds.len(),
            category
        );

        // Cache until the screener refresh at 5PM UTC
        let ttl_seconds = match seconds_until(17, 0) {
            Ok(ttl) => ttl,
            Err(e) => {
                warn!(
                    "Failed calculating 5PM UTC refresh TTL: {}. Using fallback 1 day",
                    e
                );
                24 * 60 * 60 // Fallback to 1 day
            }
        };
        self.cache
            .put(
                slug.as_bytes(),
                &serde_json::to_vec(&funds).unwrap(),
                Some(Duration::from_secs(ttl_seconds)),
            )
            .await;

        Ok(funds)
    }
}
