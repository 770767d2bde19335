use crate::error::{Result, TrackerError};
use crate::query::Query;
use crate::transport::Transport;
use crate::types::{AssetType, RawAsset};
use crate::xml;
use std::sync::Arc;
use tracing::debug;

/// Thin typed wrapper over the tracker's REST endpoint: builds URLs, runs
/// them through the injected transport and parses the XML that comes back.
///
/// Immutable after construction; constructed once and shared (`Arc`) between
/// the resolver and the repository.
pub struct AssetClient {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl AssetClient {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a query. "No response" is a first-class `None`.
    pub fn execute(&self, query: &Query) -> Result<Option<String>> {
        let url = query.url(&self.base_url);
        debug!(url, "tracker query");
        self.transport.fetch(&url)
    }

    /// Run a query that must come back with a document; parse the first
    /// matching element. `Ok(None)` is a well-formed empty result, kept
    /// distinct from `MalformedResponse` and `TransportUnavailable`.
    pub fn query_first(&self, query: &Query) -> Result<Option<RawAsset>> {
        match self.execute(query)? {
            None => Err(TrackerError::TransportUnavailable),
            Some(doc) => xml::parse_first_asset(&doc),
        }
    }

    /// Run a query and parse all matching elements in document order.
    pub fn query_all(&self, query: &Query) -> Result<Vec<RawAsset>> {
        match self.execute(query)? {
            None => Err(TrackerError::TransportUnavailable),
            Some(doc) => xml::parse_asset_list(&doc),
        }
    }

    /// GET `/Data/{Type}/{id}` for a single asset by internal id.
    pub fn get_asset(&self, ty: AssetType, id: &str) -> Result<Option<RawAsset>> {
        let url = format!("{}/Data/{}/{}", self.base_url, ty.type_name(), id);
        debug!(url, "tracker get");
        match self.transport.fetch(&url)? {
            None => Err(TrackerError::TransportUnavailable),
            Some(doc) => xml::parse_first_asset(&doc),
        }
    }

    /// POST a document to `/Data/{Type}` (create) or `/Data/{Type}/{id}`
    /// (update/relation diff).
    pub fn post_asset(&self, ty: AssetType, id: Option<&str>, body: &str) -> Result<String> {
        let url = match id {
            Some(id) => format!("{}/Data/{}/{}", self.base_url, ty.type_name(), id),
            None => format!("{}/Data/{}", self.base_url, ty.type_name()),
        };
        debug!(url, "tracker post");
        self.transport.post(&url, body)
    }

    /// POST a lifecycle operation: `/Data/{Type}/{id}?op={Operation}`.
    pub fn post_operation(&self, ty: AssetType, id: &str, op: &str) -> Result<String> {
        let url = format!("{}/Data/{}/{}?op={}", self.base_url, ty.type_name(), id, op);
        debug!(url, "tracker operation");
        self.transport.post(&url, "")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
