//! HTTP client for the Omeka REST API.
//!
//! [`ApiClient`] owns the shared `reqwest` client and knows how to turn a
//! resource name or a server-supplied browse URL into a request, how to append
//! `page`/`key` parameters, and how to normalize Omeka's empty-body responses.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use url::Url;

use super::error::ApiError;
use super::paginator::Paginator;
use super::resources::{ResourceDescriptor, ResourceInfo};
use crate::config::ArchiveConfig;
use crate::throttle::Throttle;
use crate::user_agent;

/// Client for one Omeka installation.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    site_root: Url,
    api_url: Url,
    key: Option<String>,
    throttle: Throttle,
    cancel: CancellationToken,
}

impl ApiClient {
    /// Creates a client for the installation described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] if the HTTP client cannot be built, or
    /// [`ApiError::InvalidUrl`] if the API root has no parent.
    pub fn new(config: &ArchiveConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.read_timeout())
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|source| ApiError::Client { source })?;
        let api_url = config.api_url().clone();
        let site_root = api_url
            .join("../")
            .map_err(|_| ApiError::invalid_url(api_url.as_str()))?;

        Ok(Self {
            client,
            site_root,
            api_url,
            key: config.key().map(str::to_string),
            throttle: Throttle::new(config.throttle()),
            cancel: CancellationToken::new(),
        })
    }

    /// Abandons in-flight requests with [`ApiError::Interrupted`] once `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The underlying reqwest client, shared with asset downloads.
    #[must_use]
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// The throttle applied between page requests.
    #[must_use]
    pub fn throttle(&self) -> Throttle {
        self.throttle
    }

    /// The API root (`<base>/api/`).
    #[must_use]
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Resolves an endpoint to a URL.
    ///
    /// Fully-qualified http(s) URLs are used verbatim; anything else is a
    /// resource name resolved against the API root.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the name cannot be joined.
    pub fn endpoint(&self, endpoint: &str) -> Result<Url, ApiError> {
        if let Ok(url) = Url::parse(endpoint)
            && matches!(url.scheme(), "http" | "https")
        {
            return Ok(url);
        }
        self.api_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|_| ApiError::invalid_url(endpoint))
    }

    /// Resolves the browse URL of a resource listed in the descriptor.
    ///
    /// A server-supplied `url` is resolved against the site root (absolute
    /// paths keep the installation path the server put in them); without one
    /// the resource name is resolved against the API root.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the URL cannot be resolved.
    pub fn browse_url(&self, name: &str, info: &ResourceInfo) -> Result<Url, ApiError> {
        match info.url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => self
                .site_root
                .join(url)
                .map_err(|_| ApiError::invalid_url(url)),
            None => self.endpoint(name),
        }
    }

    /// Verifies the API is reachable and enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Disabled`] on HTTP 403, [`ApiError::Missing`] on
    /// any other non-200 status, or a network error if the host is unreachable.
    #[instrument(skip(self), fields(api = %self.api_url))]
    pub async fn check_api(&self) -> Result<(), ApiError> {
        let url = self.endpoint("resources")?;
        debug!(url = %url, "checking Omeka API");
        let response = self
            .until_cancelled(url.as_str(), self.client.get(url.clone()).send())
            .await?
            .map_err(|e| ApiError::network(url.as_str(), e))?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::FORBIDDEN => Err(ApiError::Disabled {
                url: self.api_url.to_string(),
            }),
            status => Err(ApiError::Missing {
                url: self.api_url.to_string(),
                status: status.as_u16(),
            }),
        }
    }

    /// Fetches a single JSON document.
    ///
    /// Returns `Ok(None)` when the server answers with an empty body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failure, a non-2xx status with a
    /// body, or a body that is not JSON.
    pub async fn get_json(&self, endpoint: &str) -> Result<Option<Value>, ApiError> {
        let url = self.endpoint(endpoint)?;
        let (status, body, shown_url) = self.get_text(url, &[]).await?;
        if body.trim().is_empty() {
            debug!(url = %shown_url, "empty body");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ApiError::status(shown_url, status.as_u16()));
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| ApiError::parse(shown_url, e))
    }

    /// Fetches and decodes the `resources` descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the document is not an object.
    pub async fn resources(&self) -> Result<ResourceDescriptor, ApiError> {
        let url = self.endpoint("resources")?;
        let value = self.get_json(url.as_str()).await?.unwrap_or(Value::Null);
        ResourceDescriptor::from_value(url.as_str(), value)
    }

    /// Starts a lazy paginated traversal of `endpoint`.
    ///
    /// `filter` parameters precede `page` and `key` in every request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the endpoint cannot be resolved.
    pub fn paginate(&self, endpoint: &str, filter: &[(&str, &str)]) -> Result<Paginator<'_>, ApiError> {
        let url = self.endpoint(endpoint)?;
        let filter = filter
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Ok(Paginator::new(self, url, filter))
    }

    /// Fetches one page of `url`.
    ///
    /// An empty or whitespace-only body is an empty page whatever the status:
    /// Omeka answers that way when a sub-resource has no results (a
    /// collection without items, an item without files).
    pub(crate) async fn fetch_page(
        &self,
        url: &Url,
        filter: &[(String, String)],
        page: u32,
    ) -> Result<Vec<Value>, ApiError> {
        let mut params: Vec<(&str, String)> = filter
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        params.push(("page", page.to_string()));

        let (status, body, shown_url) = self.get_text(url.clone(), &params).await?;
        info!(url = %shown_url, page, status = status.as_u16(), "fetched page");

        if body.trim().is_empty() {
            debug!(url = %shown_url, "empty body treated as empty page");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(ApiError::status(shown_url, status.as_u16()));
        }

        match serde_json::from_str::<Value>(&body).map_err(|e| ApiError::parse(&shown_url, e))? {
            Value::Array(items) => Ok(items),
            other => Err(ApiError::unexpected_shape(shown_url, "a JSON array", &other)),
        }
    }

    /// Issues a GET with `params` plus the API key, returning status and body.
    ///
    /// The third element is the request URL without the key, for logs and errors.
    async fn get_text(
        &self,
        mut url: Url,
        params: &[(&str, String)],
    ) -> Result<(StatusCode, String, String), ApiError> {
        if !params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        let shown_url = url.to_string();
        if let Some(key) = &self.key {
            url.query_pairs_mut().append_pair("key", key);
        }

        let response = self
            .until_cancelled(&shown_url, self.client.get(url).send())
            .await?
            .map_err(|e| ApiError::network(&shown_url, e))?;
        let status = response.status();
        let body = self
            .until_cancelled(&shown_url, response.text())
            .await?
            .map_err(|e| ApiError::network(&shown_url, e))?;
        Ok((status, body, shown_url))
    }

    async fn until_cancelled<T>(
        &self,
        url: &str,
        request: impl Future<Output = T>,
    ) -> Result<T, ApiError> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ApiError::Interrupted { url: url.to_string() }),
            output = request => Ok(output),
        }
    }
}
