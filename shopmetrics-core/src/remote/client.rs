//! HTTP client for the hosted workshop backend's export API
//!
//! The backend exposes read-only paged exports of each table:
//! `GET /export/{table}?limit=&page=&updated_since=` returning a JSON array
//! of records. `shopmetrics-sync` walks the pages and upserts every record
//! into the local store.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;
use crate::error::{Error, Result};

/// HTTP client for the workshop backend export API
pub struct BackendClient {
    config: BackendConfig,
    http_client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a new backend client from configuration
    ///
    /// Returns an error if the configuration is invalid or missing required fields.
    pub fn new(config: BackendConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| Error::Config("backend.base_url is required".to_string()))?
            .trim_end_matches('/')
            .to_string();

        // Build default headers
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Add authorization header
        if let Some(api_key) = &config.api_key {
            let auth_value = format!("Bearer {}", api_key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
            );
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            base_url,
        })
    }

    /// Records per page this client requests.
    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Build the export URL for one page of one table.
    fn export_url(&self, table: &str, updated_since: Option<&str>, page: usize) -> String {
        let mut url = format!(
            "{}/export/{}?limit={}&page={}",
            self.base_url, table, self.config.page_size, page
        );
        if let Some(since) = updated_since {
            url.push_str("&updated_since=");
            url.push_str(&urlencoding::encode(since));
        }
        url
    }

    /// Fetch one page of records from a table's export endpoint.
    ///
    /// `page` is zero-based. A page shorter than the configured page size
    /// is the last one.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        table: &str,
        updated_since: Option<&str>,
        page: usize,
    ) -> Result<Vec<T>> {
        let url = self.export_url(table, updated_since, page);
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1s, 2s, ...
                let backoff = Duration::from_millis(500 * (1 << (attempt - 1)));
                tracing::debug!(table, page, attempt, backoff_ms = backoff.as_millis() as u64,
                    "Retrying export fetch");
                tokio::time::sleep(backoff).await;
            }

            match self.http_client.get(&url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let records = response
                            .json::<Vec<T>>()
                            .await
                            .map_err(|e| Error::Backend(format!("invalid response body: {}", e)))?;
                        return Ok(records);
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        // Auth failures won't fix themselves; don't retry
                        return Err(Error::Backend(format!(
                            "authentication failed for {}: {}",
                            table, status
                        )));
                    }

                    let body = response.text().await.unwrap_or_default();
                    last_error = Some(Error::Backend(format!(
                        "export of {} failed: {} {}",
                        table, status, body
                    )));

                    // Client errors other than auth are not transient
                    if status.is_client_error() {
                        break;
                    }
                }
                Err(e) => {
                    last_error = Some(Error::Backend(format!(
                        "export of {} failed: {}",
                        table, e
                    )));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| Error::Backend(format!("export of {} failed", table))))
    }

    /// Check the backend is reachable and the key is accepted.
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        match self.http_client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => Err(Error::Backend(format!("health check failed: {}", e))),
        }
    }
}
