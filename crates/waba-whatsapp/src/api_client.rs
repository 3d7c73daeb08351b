//! Graph API access for the WhatsApp provisioning components.
//!
//! Wraps [`RemoteApiClient`] with node URL building and per-request bearer
//! tokens. A token is fetched for every call and never stored here.

use crate::types::GraphConfig;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use waba_core::{ApiError, ApiResult, Audience, RemoteApiClient, RemoteRequest, TokenSource};

/// Low-level client for the Meta Graph API.
#[derive(Clone)]
pub struct GraphClient {
    http: RemoteApiClient,
    config: GraphConfig,
    tokens: Arc<dyn TokenSource>,
}

impl fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GraphClient {
    pub fn new(config: &GraphConfig, tokens: Arc<dyn TokenSource>) -> ApiResult<Self> {
        let http = RemoteApiClient::new(Duration::from_secs(config.timeout_sec as u64))?;
        Ok(Self {
            http,
            config: config.clone(),
            tokens,
        })
    }

    /// Build `{base}/{version}/{node_id}/{edge}`.
    ///
    /// Node ids are Graph object ids, so anything beyond ASCII letters,
    /// digits, `_` and `-` is refused rather than escaped into another path.
    pub fn node_url(&self, node_id: &str, edge: &str) -> ApiResult<String> {
        let node = node_id.trim();
        if node.is_empty() {
            return Err(ApiError::invalid_parameter("Graph node id must not be empty"));
        }
        if !node
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ApiError::invalid_parameter(format!(
                "invalid Graph node id {:?}",
                node_id
            )));
        }

        let mut url = self.base_url()?;
        url.path_segments_mut()
            .map_err(|_| ApiError::invalid_parameter("Graph base URL cannot carry a path"))?
            .pop_if_empty()
            .extend([self.config.api_version.as_str(), node, edge]);
        Ok(url.into())
    }

    /// Whether `link` points at the configured Graph host.
    pub fn same_origin(&self, link: &str) -> bool {
        match (self.base_url(), Url::parse(link)) {
            (Ok(base), Ok(link)) => base.origin() == link.origin(),
            _ => false,
        }
    }

    fn base_url(&self) -> ApiResult<Url> {
        Url::parse(&self.config.base_url)
            .map_err(|e| ApiError::invalid_parameter(format!("invalid Graph base URL: {}", e)))
    }

    /// GET with query parameters.
    pub async fn get(
        &self,
        audience: Audience,
        url: &str,
        params: &[(&str, &str)],
    ) -> ApiResult<serde_json::Value> {
        let request = params
            .iter()
            .fold(RemoteRequest::get(url), |req, (k, v)| req.query(k, v));
        self.send(audience, request).await
    }

    /// POST a JSON body. Writes are judged by status alone.
    pub async fn post_status(
        &self,
        audience: Audience,
        url: &str,
        body: serde_json::Value,
    ) -> ApiResult<()> {
        self.send(audience, RemoteRequest::post(url).json(body).status_only())
            .await?;
        Ok(())
    }

    async fn send(
        &self,
        audience: Audience,
        request: RemoteRequest,
    ) -> ApiResult<serde_json::Value> {
        let token = self.tokens.bearer_token(audience).await?;
        self.http.execute(request.bearer(&token)).await
    }
}
