use crate::core::cache::{KeyValueCollection, Store};
use crate::core::fund::{FundDataProvider, RawFund, RollingObservation};
use crate::providers::util::{category_slug, seconds_until, with_retry};
use crate::store::KeyValueStore;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

pub struct AdvisorkhojProvider {
    base_url: String,
    cache: Arc<dyn KeyValueCollection>,
}

impl AdvisorkhojProvider {
    pub fn new(base_url: &str, store: &KeyValueStore) -> Self {
        AdvisorkhojProvider {
            base_url: base_url.to_string(),
            cache: store.collection("advisorkhoj", true),
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
struct RollingRecord {
    scheme_name: Option<String>,
    #[serde(default)]
    observations: Vec<(String, f64)>,
}

impl RollingRecord {
    /// Unnamed schemes are dropped; observations with unparseable dates
    /// are skipped rather than failing the whole record.
    fn into_raw_fund(self) -> Option<RawFund> {
        let name = self.scheme_name.as_deref().map(str::trim).unwrap_or("");
        if name.is_empty() {
            return None;
        }

        let rolling: Vec<RollingObservation> = self
            .observations
            .iter()
            .filter_map(|(date_str, value)| {
                NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                    .ok()
                    .map(|date| RollingObservation {
                        date,
                        value: *value,
                    })
            })
            .collect();

        Some(RawFund {
            name: name.to_string(),
            metrics: BTreeMap::new(),
            rolling,
        })
    }
}

#[async_trait]
impl FundDataProvider for AdvisorkhojProvider {
    fn name(&self) -> &str {
        "advisorkhoj"
    }

    async fn fetch_funds(&self, category: &str) -> Result<Vec<RawFund>> {
        let slug = category_slug(category);
        if let Some(cached) = self.cache.get(slug.as_bytes()).await {
            return Ok(serde_json::from_slice(&cached)?);
        }

        let url = format!("{}/rolling-returns/{}", self.base_url, slug);
        debug!("Requesting rolling returns from {}", url);

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

        if response_text.trim().is_empty() {
            return Err(anyhow!(
                "Received empty response for category: {}",
                category
            ));
        }

        let records: Vec<RollingRecord> = match serde_json::from_str(&response_text) {
            Ok(data) => data,
            Err(e) => {
                error!(
                    error = ?e,
                    response = %response_text,
                    "Failed to parse rolling returns response"
                );
                return Err(e).context("Failed to parse rolling returns response");
            }
        };

        let funds: Vec<RawFund> = records
            .into_iter()
            .filter_map(RollingRecord::into_raw_fund)
            .collect();

        debug!(
            "Fetched rolling returns for {} schemes in category {} from advisorkhoj",
            funds.len(),
            category
        );

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
