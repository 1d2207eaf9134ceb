//! The remote data API, seen from the pipeline's side.
//!
//! Three operations: an a-priori count, a cursor-paged fetch, and a one-shot
//! metadata query. Concrete transports implement [`RemoteApi`];
//! [`http::HttpRemote`] is the reqwest-backed JSON implementation.

pub mod http;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::{Cursor, EntityMetadata, FilterBounds, Page};

/// The paged remote source consumed by an acquisition session.
///
/// Retry policy, if any, belongs to the transport behind this trait; the
/// pagination loop above it never retries.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Total records matching the given count parameters.
    async fn count(&self, params: &Map<String, Value>) -> Result<u64>;

    /// Fetch one page at `cursor` within `bounds`.
    async fn fetch_page(&self, cursor: &Cursor, bounds: &FilterBounds) -> Result<Page>;

    /// Header, date fields, relative presets, and calendar parameters.
    async fn metadata(&self) -> Result<EntityMetadata>;
}
