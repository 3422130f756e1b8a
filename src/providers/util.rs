use anyhow::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(anyhow::Error::from) {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Seconds from now until the next occurrence of `hour:minute` UTC.
/// Rolls over to tomorrow if the time has already passed today.
pub fn seconds_until(hour: u32, minute: u32) -> Result<u64> {
    let now = chrono::Utc::now();
    let today_target = now
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid time of day: {:02}:{:02}", hour, minute))?
        .and_utc();

    let target = if today_target > now {
        today_target
    } else {
        today_target + chrono::Duration::days(1)
    };
    Ok((target - now).num_seconds().max(0) as u64)
}

/// Normalizes a category query into a URL path segment. Lowercases
/// ASCII letters and collapses runs of other characters into single
/// hyphens, e.g. "Banking and PSU Fund" becomes "banking-and-psu-fund".
pub fn category_slug(query: &str) -> String {
    let mut slug = String::with_capacity(query.len());
    let mut pending_separator = false;
    for c in query.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}
