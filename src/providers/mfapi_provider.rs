use crate::core::cache::Cache;
use crate::core::nav::NavProvider;
use crate::providers::util::get_with_retry;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Daily NAVs of one scheme, oldest first.
#[derive(Debug, Clone)]
pub struct NavHistory {
    pub scheme_name: Option<String>,
    pub prices: Vec<(NaiveDate, f64)>,
}

/// NAV lookups against an mfapi.in compatible service.
pub struct MfApiProvider {
    base_url: String,
    client: reqwest::Client,
    cache: Arc<Cache<String, NavHistory>>,
    /// One fetch lock per scheme, so concurrent lookups share a single request.
    fetch_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MfApiProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, NavHistory>>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("hisaab/0.1")
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            cache,
            fetch_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Full NAV history of `scheme_code`, fetched once per process.
    pub async fn history(&self, scheme_code: &str) -> Result<NavHistory> {
        let key = scheme_code.to_string();
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let scheme_lock = {
            let mut locks = self.fetch_locks.lock().await;
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        let _guard = scheme_lock.lock().await;
        // Another caller may have filled the cache while we waited.
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let url = format!("{}/mf/{}", self.base_url, scheme_code);
        debug!("Requesting NAV history from {}", url);

        let response = get_with_retry(&self.client, &url, 3, Duration::from_millis(500))
            .await
            .with_context(|| format!("Failed to send request for scheme: {scheme_code}"))?;

        let response_text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for scheme: {scheme_code}"))?;

        if response_text.trim().is_empty() {
            return Err(anyhow!(
                "Received empty response for scheme: {}",
                scheme_code
            ));
        }

        let parsed: MfApiResponse = serde_json::from_str(&response_text).with_context(|| {
            format!(
                "Failed to parse NAV response for scheme: {scheme_code}. Response: '{response_text}'",
            )
        })?;

        let history = parsed.into_history();
        if history.prices.is_empty() {
            return Err(anyhow!("No NAV data for scheme: {}", scheme_code));
        }
        debug!(
            "Fetched {} NAVs for scheme {} ({:?})",
            history.prices.len(),
            scheme_code,
            history.scheme_name
        );

        self.cache.put(key, history.clone()).await;
        Ok(history)
    }
}

#[derive(Debug, Deserialize)]
struct MfApiMeta {
    scheme_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MfApiNav {
    date: String,
    nav: String,
}

#[derive(Debug, Deserialize)]
struct MfApiResponse {
    meta: Option<MfApiMeta>,
    #[serde(default)]
    data: Vec<MfApiNav>,
}

impl MfApiResponse {
    fn into_history(self) -> NavHistory {
        let mut prices: Vec<(NaiveDate, f64)> = self
            .data
            .into_iter()
            .filter_map(|entry| {
                let date = NaiveDate::parse_from_str(&entry.date, "%d-%m-%Y").ok()?;
                let nav = entry.nav.trim().parse::<f64>().ok()?;
                (nav > 0.0).then_some((date, nav))
            })
            .collect();

        // The service lists newest first; keep one price per day.
        prices.sort_by_key(|(date, _)| *date);
        prices.dedup_by_key(|(date, _)| *date);

        NavHistory {
            scheme_name: self.meta.and_then(|m| m.scheme_name),
            prices,
        }
    }
}

#[async_trait]
impl NavProvider for MfApiProvider {
    async fn latest_price(&self, scheme_code: &str) -> Result<f64> {
        let history = self.history(scheme_code).await?;
        history
            .prices
            .last()
            .map(|(_, nav)| *nav)
            .ok_or_else(|| anyhow!("No NAV data for scheme: {}", scheme_code))
    }

    /// NAV on `date`, or on the closest earlier publishing day.
    async fn price_on_date(&self, scheme_code: &str, date: NaiveDate) -> Result<f64> {
        let history = self.history(scheme_code).await?;
        history
            .prices
            .iter()
            .rev()
            .find(|(published, _)| *published <= date)
            .map(|(_, nav)| *nav)
            .ok_or_else(|| anyhow!("No NAV for scheme {} on or before {}", scheme_code, date))
    }
}
