use std::time::Duration;

use async_trait::async_trait;
use seadex_rss_core::constants::CATALOG_COLLECTION;
use seadex_rss_core::{Entry, TrackedId};
use serde::Deserialize;
use serde_json::Value;

use crate::{CatalogSource, UpstreamError, build_http_client, truncate};

/// Client for the SeaDex entries collection.
#[derive(Debug, Clone)]
pub struct SeadexClient {
    client: reqwest::Client,
    base_url: String,
}

/// PocketBase list response; only `items` matters here.
#[derive(Deserialize)]
struct RecordList {
    #[serde(default)]
    items: Vec<Value>,
}

impl SeadexClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn records_url(&self) -> String {
        format!("{}/collections/{CATALOG_COLLECTION}/records", self.base_url)
    }

    /// First entry whose `alID` equals `id`, with release records expanded.
    ///
    /// # Errors
    /// `Timeout`/`Unreachable` on transport failure, `Malformed` when a
    /// success response is not a record list.
    pub async fn get_entry(&self, id: TrackedId) -> Result<Option<Entry>, UpstreamError> {
        let response = self
            .client
            .get(self.records_url())
            .query(&[("filter", format!("alID={id}")), ("expand", "trs".to_owned())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                tracked_id = %id,
                status = status.as_u16(),
                body = truncate(&body, 200),
                "SeaDex returned non-success status"
            );
            return Ok(None);
        }

        let list: RecordList = serde_json::from_str(&body).map_err(|e| UpstreamError::Malformed {
            context: format!("SeaDex record list (body: {})", truncate(&body, 200)),
            source: e,
        })?;

        let entry = list.items.into_iter().next().map(Entry::new);
        if entry.is_none() {
            tracing::info!(tracked_id = %id, "no SeaDex entry for id");
        }
        Ok(entry)
    }
}

#[async_trait]
impl CatalogSource for SeadexClient {
    async fn fetch_entry(&self, id: TrackedId) -> Result<Option<Entry>, UpstreamError> {
        self.get_entry(id).await
    }
}
