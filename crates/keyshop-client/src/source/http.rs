//! reqwest-backed [`ProductSource`].
//!
//! With `max_retries = 0` (the default) every failure is returned as-is.
//! Otherwise retryable failures (transport errors, 5xx, 429) are retried
//! with exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use keyshop_core::{CatalogPage, Category, FilterCriteria, FilteredProducts, SearchHit};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::ProductSource;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct HttpProductSource {
    client: Client,
    base_url: Url,
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl HttpProductSource {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let mut base_url = Url::parse(&config.source.base_url)?;
        // Relative joins below keep any path prefix only with a trailing slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(HttpProductSource {
            client,
            base_url,
            max_retries: config.source.max_retries,
            initial_backoff: Duration::from_millis(config.source.initial_backoff_ms),
            max_backoff: Duration::from_secs(config.source.max_backoff_secs),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    /// GET `path` (relative to the base URL) and decode the JSON body,
    /// retrying retryable failures up to `max_retries` times.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let url = self.base_url.join(path)?;
        let mut backoff = self.create_backoff();
        let mut attempt = 0u32;

        loop {
            match self.get_once(&url, query).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = backoff.next_backoff().unwrap_or(self.max_backoff);
                    warn!(
                        path,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Product source request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &Url,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        debug!(url = %url, ?query, "GET");
        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ProductSource for HttpProductSource {
    async fn fetch_page(&self, page: u32, limit: u32) -> ClientResult<CatalogPage> {
        self.get_json(
            "api/products",
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn filter(&self, criteria: &FilterCriteria) -> ClientResult<FilteredProducts> {
        self.get_json("api/products/filter", &criteria.to_query_pairs())
            .await
    }

    async fn search(&self, query: &str) -> ClientResult<Vec<SearchHit>> {
        // A `null` body counts as no hits.
        let hits: Option<Vec<SearchHit>> = self
            .get_json("api/products/search", &[("q", query.to_string())])
            .await?;
        Ok(hits.unwrap_or_default())
    }

    async fn categories(&self) -> ClientResult<Vec<Category>> {
        let categories: Option<Vec<Category>> = self.get_json("api/categories", &[]).await?;
        Ok(categories.unwrap_or_default())
    }
}
