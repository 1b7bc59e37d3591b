//! Client registry and the shared request/response plumbing.
//!
//! # Design
//! `Client` holds the API key, the base URL and an injected transport, all
//! set once at construction. It carries no mutable state, so clones share
//! the transport and may be used from several threads at once.
//!
//! Endpoint accessors (`geocoding()`, `nominatim()`, `static_map()`) borrow
//! the client and split each operation into `build_*` (pure), the transport
//! round trip, and `parse_*` (pure).

use std::io::Read;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::geocoding::GeocodingApi;
use crate::http::{HttpRequest, HttpResponse, Transport, USER_AGENT};
use crate::nominatim::NominatimApi;
use crate::query::{EncodeQuery, QueryParams};
use crate::static_map::StaticMapApi;

/// Upper bound on how much of an error body is kept in `ApiError::HttpStatus`.
const ERROR_BODY_LIMIT: u64 = 64 * 1024;

/// Entry point to the MapQuest Open Data services.
#[derive(Clone)]
pub struct Client {
    key: String,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Client for the public host using the default `ureq` transport.
    #[cfg(feature = "ureq")]
    pub fn new(key: &str) -> Self {
        Self::with_transport(key, crate::http::UreqTransport::new())
    }

    pub fn with_transport(key: &str, transport: impl Transport + 'static) -> Self {
        Self::from_config(ClientConfig::new(key), Arc::new(transport))
    }

    pub fn from_config(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// Point the client at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn geocoding(&self) -> GeocodingApi<'_> {
        GeocodingApi::new(self)
    }

    pub fn nominatim(&self) -> NominatimApi<'_> {
        NominatimApi::new(self)
    }

    pub fn static_map(&self) -> StaticMapApi<'_> {
        StaticMapApi::new(self)
    }

    /// Encode `request`, then force the key and any fixed parameters.
    pub(crate) fn build_request(
        &self,
        path: &str,
        request: &dyn EncodeQuery,
        fixed: &[(&str, &str)],
    ) -> Result<HttpRequest, ApiError> {
        let mut params = QueryParams::new();
        request.encode_query(&mut params)?;
        params.set("key", self.key.as_str());
        for (name, value) in fixed {
            params.set(name, *value);
        }
        Ok(HttpRequest {
            url: params.to_url(&self.base_url, path)?,
            headers: vec![("User-Agent".to_string(), USER_AGENT.to_string())],
        })
    }

    pub(crate) fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(url = %redact_key(&request.url), "dispatching MapQuest request");
        let response = self.transport.execute(request).map_err(ApiError::Transport)?;
        trace!(status = response.status, "received MapQuest response");
        Ok(response)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Pass 2xx responses through; turn anything else into `HttpStatus`.
pub(crate) fn check_status(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        return Ok(response);
    }
    let status = response.status;
    let mut body = String::new();
    // A truncated or unreadable error body still reports the status.
    let _ = response.body.take(ERROR_BODY_LIMIT).read_to_string(&mut body);
    warn!(status, "MapQuest returned an error status");
    Err(ApiError::HttpStatus { status, body })
}

/// Check the status and decode the JSON body.
pub(crate) fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    let response = check_status(response)?;
    serde_json::from_reader(response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn redact_key(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| {
                    let v = if k == "key" { "***".to_string() } else { v.into_owned() };
                    (k.into_owned(), v)
                })
                .collect();
            parsed.query_pairs_mut().clear().extend_pairs(pairs);
            parsed.into()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}
