//! HTTP transport used for every management and content-link request.
//!
//! The core only talks to [`ApiTransport`]. [`ManagementClient`] is the
//! production implementation on top of reqwest's blocking client; tests swap
//! in scripted transports.

use crate::auth::TokenProvider;
use crate::config::ApiConfig;
use crate::error::{ProbeError, Result};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Target of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Path relative to the management base URL; sent with the bearer token.
    Management(String),
    /// Absolute URL (content links, trigger callbacks); carries its own
    /// signature and is sent without the bearer token.
    External(String),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Management(path) => write!(f, "management:{}", path),
            Self::External(url) => f.write_str(url),
        }
    }
}

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
}

/// Request body with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Body text.
    pub content: String,
    /// Value of the `Content-Type` header.
    pub content_type: String,
}

impl Payload {
    /// A JSON body.
    pub fn json(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: "application/json".to_string(),
        }
    }
}

/// A single outbound request.
#[derive(Debug, Clone, Copy)]
pub struct ApiRequest<'a> {
    /// HTTP method.
    pub method: Method,
    /// Target.
    pub endpoint: &'a Endpoint,
    /// Optional body.
    pub payload: Option<&'a Payload>,
}

/// A successful response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code (always 2xx).
    pub status: u16,
    /// Response headers, names lowercased.
    pub headers: BTreeMap<String, String>,
    /// Response body.
    pub body: String,
}

impl ApiResponse {
    /// Looks up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Authenticated HTTP access to the management endpoint.
///
/// `send` must turn every non-2xx response into [`ProbeError::Transport`]
/// carrying the response body.
pub trait ApiTransport {
    /// Sends a request.
    fn send(&self, request: ApiRequest<'_>) -> Result<ApiResponse>;

    /// GETs an endpoint and returns the body text.
    fn get(&self, endpoint: &Endpoint) -> Result<String> {
        self.send(ApiRequest {
            method: Method::Get,
            endpoint,
            payload: None,
        })
        .map(|response| response.body)
    }

    /// POSTs to an endpoint.
    fn post(&self, endpoint: &Endpoint, payload: Option<&Payload>) -> Result<ApiResponse> {
        self.send(ApiRequest {
            method: Method::Post,
            endpoint,
            payload,
        })
    }
}

impl<T: ApiTransport + ?Sized> ApiTransport for Box<T> {
    fn send(&self, request: ApiRequest<'_>) -> Result<ApiResponse> {
        (**self).send(request)
    }
}

impl<T: ApiTransport + ?Sized> ApiTransport for Rc<T> {
    fn send(&self, request: ApiRequest<'_>) -> Result<ApiResponse> {
        (**self).send(request)
    }
}

/// Production transport over reqwest's blocking client.
pub struct ManagementClient {
    base_url: Url,
    client: Client,
    tokens: Box<dyn TokenProvider>,
}

impl ManagementClient {
    /// Creates a client for the configured management base URL.
    pub fn new(api: &ApiConfig, tokens: Box<dyn TokenProvider>) -> Result<Self> {
        let client = build_http_client(api)?;
        Self::with_client(api, client, tokens)
    }

    /// Creates a client reusing an existing reqwest client.
    pub fn with_client(api: &ApiConfig, client: Client, tokens: Box<dyn TokenProvider>) -> Result<Self> {
        let mut base = api.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| ProbeError::ConfigError(format!("invalid api.base_url '{}': {}", base, e)))?;

        Ok(Self {
            base_url,
            client,
            tokens,
        })
    }

    /// Resolves an endpoint to an absolute URL.
    pub fn resolve(&self, endpoint: &Endpoint) -> Result<Url> {
        let parsed = match endpoint {
            Endpoint::Management(path) => self.base_url.join(path.trim_start_matches('/')),
            Endpoint::External(url) => Url::parse(url),
        };
        parsed.map_err(|e| ProbeError::Network {
            url: endpoint.to_string(),
            reason: format!("invalid url: {}", e),
        })
    }
}

impl ApiTransport for ManagementClient {
    fn send(&self, request: ApiRequest<'_>) -> Result<ApiResponse> {
        let url = self.resolve(request.endpoint)?;
        let url_text = url.to_string();

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        if let Endpoint::Management(_) = request.endpoint {
            builder = builder.header(AUTHORIZATION, self.tokens.authorization_header()?);
        }
        if let Some(payload) = request.payload {
            builder = builder
                .header(CONTENT_TYPE, payload.content_type.as_str())
                .body(payload.content.clone());
        }

        debug!(method = ?request.method, endpoint = %request.endpoint, "sending request");
        let response = builder.send().map_err(|e| ProbeError::Network {
            url: url_text.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.text().map_err(|e| ProbeError::Network {
            url: url_text.clone(),
            reason: format!("failed to read body: {}", e),
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), endpoint = %request.endpoint, "request failed");
            return Err(ProbeError::Transport {
                url: url_text,
                status: status.as_u16(),
                body,
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

/// Builds the shared reqwest client.
pub fn build_http_client(api: &ApiConfig) -> Result<Client> {
    Client::builder()
        .timeout(api.timeout())
        .user_agent(api.user_agent.clone())
        .build()
        .map_err(|e| ProbeError::ConfigError(format!("failed to build http client: {}", e)))
}
