//! OData source client.

use async_trait::async_trait;
use nlq_core::{SourceClient, SourceError, SourceRequest};
use reqwest::header::{HeaderValue, ACCEPT, HOST};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Response format parameter added to every request.
const FORMAT_PARAM: (&str, &str) = ("$format", "json");

/// Longest error body carried into an error message.
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for OData collections.
#[derive(Debug, Clone)]
pub struct ODataClient {
    config: ClientConfig,
    root: Url,
    host: Option<HeaderValue>,
    http: Client,
}

impl ODataClient {
    /// Create a client from a configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(ClientError::InvalidConfig("base URL is empty".to_string()));
        }
        let root = config.service_url()?;

        let host = config
            .host_header
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| ClientError::InvalidConfig(format!("invalid Host header: {}", e)))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            config,
            root,
            host,
            http,
        })
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL of a collection.
    ///
    /// `source` and `collection` each become exactly one percent-encoded path
    /// segment under the service root, so `/`, `?` and `#` cannot leave it.
    pub fn collection_url(
        &self,
        source: &str,
        collection: &str,
    ) -> std::result::Result<Url, SourceError> {
        for segment in [source, collection] {
            if matches!(segment.trim(), "" | "." | "..") {
                return Err(SourceError::InvalidPath(segment.to_string()));
            }
        }

        let mut url = self.root.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(source).push(collection);
        }
        Ok(url)
    }
}

#[async_trait]
impl SourceClient for ODataClient {
    async fn fetch(&self, request: &SourceRequest) -> std::result::Result<Value, SourceError> {
        let url = self.collection_url(&request.source, &request.collection)?;

        let mut query: Vec<(&str, &str)> = request
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        query.push(FORMAT_PARAM);

        debug!(url = %url, params = ?request.params, "Fetching collection");

        let mut builder = self
            .http
            .get(url.as_str())
            .query(&query)
            .header(ACCEPT, "application/json");

        if let Some(host) = &self.host {
            builder = builder.header(HOST, host.clone());
        }
        if let Some(username) = &self.config.username {
            builder = builder.basic_auth(username, self.config.password.as_ref());
        }

        let response = builder.send().await.map_err(send_error)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %url, "Source rejected credentials");
            return Err(SourceError::Unauthorized);
        }

        let body = response.text().await.map_err(send_error)?;

        if !status.is_success() {
            debug!(url = %url, status = status.as_u16(), "Source returned an error status");
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: truncate(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| SourceError::MalformedPayload(e.to_string()))
    }
}

fn send_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::Transport(err.to_string())
    }
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((index, _)) => format!("{}...", &body[..index]),
        None => body.to_string(),
    }
}
