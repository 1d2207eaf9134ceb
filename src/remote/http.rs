//! Reqwest-backed JSON implementation of [`RemoteApi`].
//!
//! Retry on 5xx and Retry-After-aware backoff on 429 live here, at the
//! transport layer. The pagination loop above never retries.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use super::RemoteApi;
use crate::error::{AcquireError, Result};
use crate::types::{Cursor, EntityMetadata, FilterBounds, Page};

const MAX_RETRIES: u32 = 2;

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

/// JSON client for a paged tabular endpoint.
///
/// Expects `{base}/{entity}/count`, `{base}/{entity}/page`, and
/// `{base}/{entity}/metadata` resources.
#[derive(Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base: Url,
    entity: String,
}

impl HttpRemote {
    pub fn new(base: Url, entity: impl Into<String>, timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            base,
            entity: entity.into(),
        })
    }

    fn endpoint(&self, resource: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AcquireError::InvalidResponse("base URL cannot be a base".into()))?
            .pop_if_empty()
            .push(&self.entity)
            .push(resource);
        Ok(url)
    }

    /// GET a JSON resource with retry on 5xx/connect errors and backoff
    /// on 429 honoring Retry-After.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut retries = 0u32;

        loop {
            let resp = self.client.get(url.clone()).query(query).send().await;

            match resp {
                Ok(r) => {
                    let status = r.status();

                    if status.is_server_error() && retries < MAX_RETRIES {
                        retries += 1;
                        let delay = Duration::from_millis(500 * 2u64.pow(retries - 1));
                        tracing::debug!(%url, %status, retries, "retrying after server error");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    if status.as_u16() == 429 && retries < MAX_RETRIES {
                        retries += 1;
                        let retry_after = r
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(2);
                        tracing::debug!(%url, retry_after, "rate limited, backing off");
                        tokio::time::sleep(Duration::from_secs(retry_after.min(10))).await;
                        continue;
                    }

                    let r = r.error_for_status()?;
                    return Ok(r.json::<T>().await?);
                }
                Err(e) => {
                    if retries < MAX_RETRIES {
                        retries += 1;
                        let delay = Duration::from_millis(500 * 2u64.pow(retries - 1));
                        tracing::debug!(%url, error = %e, retries, "retrying after transport error");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

#[async_trait]
impl RemoteApi for HttpRemote {
    async fn count(&self, params: &Map<String, Value>) -> Result<u64> {
        let query: Vec<(&str, String)> = params
            .iter()
            .map(|(k, v)| {
                let rendered = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.as_str(), rendered)
            })
            .collect();

        let url = self.endpoint("count")?;
        let resp: CountResponse = self.get_json(url, &query).await?;
        Ok(resp.count)
    }

    async fn fetch_page(&self, cursor: &Cursor, bounds: &FilterBounds) -> Result<Page> {
        let mut query: Vec<(&str, String)> = vec![("page", cursor.page.to_string())];
        if let Some(from) = &cursor.from_key {
            query.push(("keyvalue_from", from.clone()));
        }
        if let Some(to) = cursor.to_key.as_ref().or(bounds.to.as_ref()) {
            query.push(("keyvalue_to", to.clone()));
        }

        let url = self.endpoint("page")?;
        self.get_json(url, &query).await
    }

    async fn metadata(&self) -> Result<EntityMetadata> {
        let url = self.endpoint("metadata")?;
        self.get_json(url, &[]).await
    }
}
